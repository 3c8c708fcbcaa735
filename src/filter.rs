use crate::models::PostingRecord;

/// A free-text query. Matching is case-insensitive substring containment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    text: String,
    folded: String,
}

impl Query {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            folded: text.to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn matches(&self, record: &PostingRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&self.folded);
        hit(&record.title)
            || record.company.as_deref().is_some_and(hit)
            || record.location.as_deref().is_some_and(hit)
    }
}

/// Order-preserving; the input is left untouched.
pub fn filter(records: &[PostingRecord], query: &Query) -> Vec<PostingRecord> {
    records
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect()
}
