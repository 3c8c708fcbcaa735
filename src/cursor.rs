use crate::models::PostingRecord;

/// Outcome of stepping the cursor. Boundaries are signals, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Moved(&'a PostingRecord),
    Exhausted,
    AtStart,
}

impl Step<'_> {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Step::Moved(_) => None,
            Step::Exhausted => Some("No more postings."),
            Step::AtStart => Some("This is the first posting."),
        }
    }
}

/// Position within an ordered sequence of postings. Stepping never wraps
/// and never leaves `0..len`.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    items: Vec<PostingRecord>,
    position: usize,
}

impl Cursor {
    pub fn new(items: Vec<PostingRecord>) -> Self {
        Self { items, position: 0 }
    }

    pub fn items(&self) -> &[PostingRecord] {
        &self.items
    }

    /// `None` when the backing sequence is empty.
    pub fn position(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.position)
    }

    pub fn current(&self) -> Option<&PostingRecord> {
        self.items.get(self.position)
    }

    pub fn next(&mut self) -> Step<'_> {
        if self.position + 1 >= self.items.len() {
            return Step::Exhausted;
        }
        self.position += 1;
        Step::Moved(&self.items[self.position])
    }

    pub fn previous(&mut self) -> Step<'_> {
        if self.position == 0 || self.items.is_empty() {
            return Step::AtStart;
        }
        self.position -= 1;
        Step::Moved(&self.items[self.position])
    }

    /// Swaps in a new backing sequence and rewinds to the start.
    pub fn replace(&mut self, items: Vec<PostingRecord>) {
        self.items = items;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(n: usize) -> Vec<PostingRecord> {
        (0..n)
            .map(|i| PostingRecord {
                id: format!("p{i}"),
                title: format!("Posting {i}"),
                company: None,
                location: None,
                link: None,
                summary: None,
            })
            .collect()
    }

    fn moved_id(step: Step<'_>) -> Option<String> {
        match step {
            Step::Moved(r) => Some(r.id.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_next_and_previous() {
        let mut cursor = Cursor::new(records(3));
        assert_eq!(cursor.current().map(|r| r.id.as_str()), Some("p0"));
        assert_eq!(moved_id(cursor.next()), Some("p1".to_string()));
        assert_eq!(moved_id(cursor.next()), Some("p2".to_string()));
        assert_eq!(moved_id(cursor.previous()), Some("p1".to_string()));
        assert_eq!(cursor.position(), Some(1));
    }

    #[test]
    fn test_next_at_last_is_exhausted() {
        let mut cursor = Cursor::new(records(2));
        cursor.next();
        assert_eq!(cursor.position(), Some(1));
        assert_eq!(cursor.next(), Step::Exhausted);
        assert_eq!(cursor.position(), Some(1));
        assert_eq!(cursor.current().map(|r| r.id.as_str()), Some("p1"));
    }

    #[test]
    fn test_previous_at_start() {
        let mut cursor = Cursor::new(records(2));
        assert_eq!(cursor.previous(), Step::AtStart);
        assert_eq!(cursor.position(), Some(0));
    }

    #[test]
    fn test_empty_sequence() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.next(), Step::Exhausted);
        assert_eq!(cursor.previous(), Step::AtStart);
        assert_eq!(cursor.position(), None);
    }

    #[test]
    fn test_position_stays_in_range() {
        let mut cursor = Cursor::new(records(4));
        let moves = [1, 1, 1, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
        for m in moves {
            if m == 1 {
                cursor.next();
            } else {
                cursor.previous();
            }
            let pos = cursor.position().unwrap();
            assert!(pos < 4);
        }
        assert_eq!(cursor.position(), Some(3));
    }

    #[test]
    fn test_reset() {
        let mut cursor = Cursor::new(records(3));
        cursor.next();
        cursor.next();
        cursor.reset();
        assert_eq!(cursor.position(), Some(0));
    }

    #[test]
    fn test_replace_rewinds() {
        let mut cursor = Cursor::new(records(3));
        cursor.next();
        cursor.next();
        cursor.replace(records(1));
        assert_eq!(cursor.position(), Some(0));
        assert_eq!(cursor.next(), Step::Exhausted);
    }

    #[test]
    fn test_notices() {
        assert_eq!(Step::Exhausted.notice(), Some("No more postings."));
        assert_eq!(Step::AtStart.notice(), Some("This is the first posting."));
    }
}
