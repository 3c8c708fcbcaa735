use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::cursor::{Cursor, Step};
use crate::filter::{self, Query};
use crate::models::{DetailView, PostingRecord, RawPosting};
use crate::normalize;
use crate::source::LoadError;

/// Owns the canonical postings, the active query, and the cursor over the
/// filtered results. Every transition replaces the filtered sequence and the
/// cursor together.
#[derive(Debug, Default)]
pub struct CatalogStore {
    raws: Vec<RawPosting>,
    postings: Vec<PostingRecord>,
    by_id: HashMap<String, usize>,
    query: Query,
    cursor: Cursor,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, raws: Vec<RawPosting>) {
        let mut postings: Vec<PostingRecord> = raws
            .iter()
            .enumerate()
            .map(|(ordinal, raw)| normalize::normalize(raw, ordinal))
            .collect();
        assign_surrogates(&raws, &mut postings);

        let mut by_id = HashMap::with_capacity(postings.len());
        for (index, posting) in postings.iter().enumerate() {
            if by_id.contains_key(&posting.id) {
                warn!(id = %posting.id, index, "Duplicate posting id, keeping the first");
                continue;
            }
            by_id.insert(posting.id.clone(), index);
        }

        debug!(postings = postings.len(), "Catalog loaded");
        self.query = Query::default();
        self.cursor = Cursor::new(postings.clone());
        self.raws = raws;
        self.postings = postings;
        self.by_id = by_id;
    }

    /// A provider failure means zero postings, not a crash.
    pub fn load_or_empty(&mut self, loaded: Result<Vec<RawPosting>, LoadError>) {
        match loaded {
            Ok(raws) => self.load(raws),
            Err(e) => {
                warn!(error = %e, "Could not load postings, continuing with none");
                self.load(Vec::new());
            }
        }
    }

    /// Always re-filters from the full canonical set.
    pub fn set_query(&mut self, query: &str) {
        let query = Query::new(query);
        let results = filter::filter(&self.postings, &query);
        debug!(query = query.as_str(), results = results.len(), "Query changed");
        self.query = query;
        self.cursor.replace(results);
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn postings(&self) -> &[PostingRecord] {
        &self.postings
    }

    pub fn results(&self) -> &[PostingRecord] {
        self.cursor.items()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn current(&self) -> Option<&PostingRecord> {
        self.cursor.current()
    }

    pub fn next(&mut self) -> Step<'_> {
        self.cursor.next()
    }

    pub fn previous(&mut self) -> Step<'_> {
        self.cursor.previous()
    }

    /// Derived fresh on every call; nothing is cached.
    pub fn select_detail(&self, id: &str) -> Option<DetailView> {
        let index = *self.by_id.get(id)?;
        let raw = self.raws.get(index)?;
        let posting = self.postings.get(index)?;
        let mut view = normalize::to_detail_view(raw);
        view.id = posting.id.clone();
        Some(view)
    }

    pub fn current_detail(&self) -> Option<DetailView> {
        self.select_detail(&self.current()?.id)
    }
}

/// Surrogates must not collide with any id the source itself carries, nor
/// with each other.
fn assign_surrogates(raws: &[RawPosting], postings: &mut [PostingRecord]) {
    let source_ids: Vec<Option<String>> = raws.iter().map(normalize::source_id).collect();
    let mut taken: HashSet<String> = source_ids.iter().flatten().cloned().collect();

    for (ordinal, (posting, source_id)) in postings.iter_mut().zip(&source_ids).enumerate() {
        if source_id.is_some() {
            continue;
        }
        let mut candidate = normalize::surrogate_id(ordinal);
        let mut attempt = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}-{}", normalize::surrogate_id(ordinal), attempt);
            attempt += 1;
        }
        if candidate != posting.id {
            debug!(ordinal, id = %candidate, "Surrogate id taken by the source, using a suffix");
        }
        taken.insert(candidate.clone());
        posting.id = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn two_postings() -> Vec<RawPosting> {
        vec![
            RawPosting(json!({"title": "경비원", "location": "Seoul"})),
            RawPosting(json!({"title": "Kitchen Staff", "location": "Mia-dong"})),
        ]
    }

    fn titles(records: &[PostingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_load_shows_everything() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        assert_eq!(store.postings().len(), 2);
        assert_eq!(titles(store.results()), vec!["경비원", "Kitchen Staff"]);
        assert_eq!(store.cursor().position(), Some(0));
        assert_eq!(store.query(), "");
    }

    #[test]
    fn test_set_query_filters_and_resets() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        store.next();
        assert_eq!(store.cursor().position(), Some(1));

        store.set_query("경비");
        assert_eq!(titles(store.results()), vec!["경비원"]);
        assert_eq!(store.cursor().position(), Some(0));

        store.set_query("");
        assert_eq!(titles(store.results()), vec!["경비원", "Kitchen Staff"]);
    }

    #[test]
    fn test_query_refilters_from_canonical_set() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        store.set_query("경비");
        store.set_query("kitchen");
        assert_eq!(titles(store.results()), vec!["Kitchen Staff"]);
    }

    #[test]
    fn test_every_query_change_resets_cursor() {
        let mut store = CatalogStore::new();
        store.load(
            (0..5)
                .map(|i| RawPosting(json!({"title": format!("경비 {i}")})))
                .collect(),
        );
        for q in ["", "경비", "경", "비"] {
            store.next();
            store.next();
            store.set_query(q);
            assert_eq!(store.cursor().position(), Some(0), "query {q}");
        }
    }

    #[test]
    fn test_next_at_end_is_exhausted() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        assert!(matches!(store.next(), Step::Moved(_)));
        assert_eq!(store.next(), Step::Exhausted);
        assert_eq!(store.cursor().position(), Some(1));
        assert_eq!(store.current().map(|r| r.title.as_str()), Some("Kitchen Staff"));
    }

    #[test]
    fn test_no_match_leaves_empty_cursor() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        store.set_query("zzz");
        assert!(store.results().is_empty());
        assert_eq!(store.current(), None);
        assert_eq!(store.next(), Step::Exhausted);
        assert_eq!(store.current_detail(), None);
    }

    #[test]
    fn test_surrogate_ids_select_their_own_detail() {
        let mut store = CatalogStore::new();
        store.load(vec![
            RawPosting(json!({"title": "첫째", "detail": "하나"})),
            RawPosting(json!({"title": "둘째", "detail": "둘"})),
        ]);
        let ids: Vec<String> = store.postings().iter().map(|r| r.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);

        let first = store.select_detail(&ids[0]).unwrap();
        let second = store.select_detail(&ids[1]).unwrap();
        assert_eq!(first.id, ids[0]);
        assert_eq!(first.title, "첫째");
        assert_eq!(first.job_description, vec!["하나"]);
        assert_eq!(second.id, ids[1]);
        assert_eq!(second.title, "둘째");
    }

    #[test]
    fn test_surrogate_never_shadows_a_source_id() {
        let mut store = CatalogStore::new();
        store.load(vec![
            RawPosting(json!({"id": "posting-1", "title": "has id"})),
            RawPosting(json!({"title": "no id"})),
            RawPosting(json!({"id": "posting-2-1", "title": "tricky"})),
            RawPosting(json!({"title": "also no id"})),
        ]);
        let ids: Vec<String> = store.postings().iter().map(|r| r.id.clone()).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(ids[0], "posting-1");
        assert_eq!(ids[1], "posting-1-1");
        assert_eq!(ids[3], "posting-3");

        for (id, title) in ids.iter().zip(["has id", "no id", "tricky", "also no id"]) {
            assert_eq!(store.select_detail(id).unwrap().title, title);
        }
    }

    #[test]
    fn test_surrogate_suffix_skips_taken_candidates() {
        let mut store = CatalogStore::new();
        store.load(vec![
            RawPosting(json!({"title": "no id"})),
            RawPosting(json!({"id": "posting-0", "title": "a"})),
            RawPosting(json!({"id": "posting-0-1", "title": "b"})),
        ]);
        assert_eq!(store.postings()[0].id, "posting-0-2");
        assert_eq!(store.select_detail("posting-0-2").unwrap().title, "no id");
        assert_eq!(store.select_detail("posting-0").unwrap().title, "a");
    }

    #[test]
    fn test_select_detail_unknown_id() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        assert_eq!(store.select_detail("nope"), None);
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first() {
        let mut store = CatalogStore::new();
        store.load(vec![
            RawPosting(json!({"id": "same", "title": "first"})),
            RawPosting(json!({"id": "same", "title": "second"})),
        ]);
        assert_eq!(store.postings().len(), 2);
        assert_eq!(store.select_detail("same").unwrap().title, "first");
    }

    #[test]
    fn test_load_failure_degrades_to_empty() {
        let mut store = CatalogStore::new();
        store.load(two_postings());
        store.load_or_empty(Err(LoadError::UnexpectedShape("null")));
        assert!(store.postings().is_empty());
        assert!(store.results().is_empty());
        assert_eq!(store.current(), None);
    }

    #[test]
    fn test_reload_clears_query() {
        let mut store = CatalogStore::new();
        store.set_query("kitchen");
        store.load(two_postings());
        assert_eq!(store.query(), "");
        assert_eq!(titles(store.results()), vec!["경비원", "Kitchen Staff"]);
    }

    #[test]
    fn test_current_detail_follows_cursor() {
        let mut store = CatalogStore::new();
        store.load(vec![
            RawPosting(json!({"채용공고ID": "K1", "채용제목": "경비원"})),
            RawPosting(json!({"채용공고ID": "K2", "채용제목": "조리원"})),
        ]);
        assert_eq!(store.current_detail().unwrap().id, "K1");
        store.next();
        assert_eq!(store.current_detail().unwrap().title, "조리원");
    }
}
