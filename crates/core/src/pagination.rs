//! Page accumulation for query and scan.
//!
//! The accumulators are pure state machines: the shell asks them for the
//! next start key and page-size hint, fetches a page, and feeds it back
//! until they reach a terminal status.

use std::collections::BTreeMap;

use crate::error::ErrorKind;
use crate::store::Page;
use crate::value::{Item, KeyValue};

/// Opaque position marker returned by a limited query or scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor(Item);

impl Cursor {
    pub fn new(item: Item) -> Self {
        Self(item)
    }

    /// Builds a cursor from caller-held key values.
    pub fn from_key_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, KeyValue)>,
        K: Into<String>,
    {
        Self(
            values
                .into_iter()
                .map(|(name, value)| (name.into(), value.to_attribute()))
                .collect(),
        )
    }

    /// Cursor pointing at `item`, built from the given key attributes.
    pub fn from_item(item: &Item, key_attributes: &[String]) -> Self {
        Self(
            key_attributes
                .iter()
                .filter_map(|name| item.get(name).map(|value| (name.clone(), value.clone())))
                .collect(),
        )
    }

    pub fn as_item(&self) -> &Item {
        &self.0
    }

    pub fn into_item(self) -> Item {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The cursor as key values, suitable for handing to callers.
    pub fn key_values(&self) -> Result<BTreeMap<String, KeyValue>, ErrorKind> {
        self.0
            .iter()
            .map(|(name, value)| Ok((name.clone(), KeyValue::from_attribute(value)?)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// Caller-controlled paging options for one logical query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    /// Maximum items to return; 0 means unbounded.
    pub limit: usize,
    pub cursor: Option<Cursor>,
    pub direction: Direction,
}

impl PaginationState {
    fn limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Initial,
    Fetching,
    /// Stopped at the caller limit with more data behind the cursor.
    MoreAvailable,
    /// The store has no more pages.
    Exhausted,
}

impl PageStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PageStatus::MoreAvailable | PageStatus::Exhausted)
    }
}

/// Items plus the cursor to resume from, if the limit cut the result short.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub items: Vec<Item>,
    pub cursor: Option<Cursor>,
    pub scanned_count: usize,
}

/// Collects item pages until the store runs dry or the limit is exceeded.
#[derive(Debug)]
pub struct PageAccumulator {
    limit: Option<usize>,
    key_attributes: Vec<String>,
    start_key: Option<Cursor>,
    items: Vec<Item>,
    scanned_count: usize,
    status: PageStatus,
}

impl PageAccumulator {
    /// `key_attributes` are the attributes a resumption cursor is built from.
    pub fn new(state: &PaginationState, key_attributes: Vec<String>) -> Self {
        Self {
            limit: state.limit(),
            key_attributes,
            start_key: state.cursor.clone(),
            items: Vec::new(),
            scanned_count: 0,
            status: PageStatus::Initial,
        }
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn start_key(&self) -> Option<&Cursor> {
        self.start_key.as_ref()
    }

    /// Page size to request: one more than the items still needed, so a
    /// page that exactly fills the limit still reveals whether more exist.
    pub fn page_size_hint(&self) -> Option<usize> {
        self.limit
            .map(|limit| limit.saturating_sub(self.items.len()) + 1)
    }

    pub fn begin_fetch(&mut self) {
        self.status = PageStatus::Fetching;
    }

    pub fn accept(&mut self, page: Page) -> PageStatus {
        self.scanned_count += page.scanned_count;
        self.items.extend(page.items);
        self.start_key = page.last_evaluated_key;

        self.status = match self.limit {
            Some(limit) if self.items.len() > limit => {
                self.items.truncate(limit);
                self.start_key = self
                    .items
                    .last()
                    .map(|last| Cursor::from_item(last, &self.key_attributes));
                PageStatus::MoreAvailable
            }
            _ if self.start_key.is_none() => PageStatus::Exhausted,
            _ => PageStatus::Fetching,
        };
        self.status
    }

    pub fn finish(self) -> PageResult {
        let cursor = match self.status {
            PageStatus::MoreAvailable => self.start_key,
            _ => None,
        };
        PageResult {
            items: self.items,
            cursor,
            scanned_count: self.scanned_count,
        }
    }
}

/// Scanned (pre-filter) and matched (post-filter) totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub filtered: usize,
}

/// Sums count-only pages, optionally stopping at a limit on matches.
#[derive(Debug)]
pub struct CountAccumulator {
    limit: Option<usize>,
    start_key: Option<Cursor>,
    counts: Counts,
    status: PageStatus,
}

impl CountAccumulator {
    pub fn new(limit: Option<usize>, start_key: Option<Cursor>) -> Self {
        Self {
            limit: limit.filter(|limit| *limit > 0),
            start_key,
            counts: Counts::default(),
            status: PageStatus::Initial,
        }
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn start_key(&self) -> Option<&Cursor> {
        self.start_key.as_ref()
    }

    pub fn begin_fetch(&mut self) {
        self.status = PageStatus::Fetching;
    }

    pub fn accept(&mut self, page: Page) -> PageStatus {
        self.counts.total += page.scanned_count;
        self.counts.filtered += page.count;
        self.start_key = page.last_evaluated_key;

        self.status = match self.limit {
            Some(limit) if self.counts.filtered >= limit => {
                self.counts.filtered = limit;
                if self.start_key.is_some() {
                    PageStatus::MoreAvailable
                } else {
                    PageStatus::Exhausted
                }
            }
            _ if self.start_key.is_none() => PageStatus::Exhausted,
            _ => PageStatus::Fetching,
        };
        self.status
    }

    pub fn finish(self) -> Counts {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;

    use super::*;

    fn record(i: usize) -> Item {
        let mut item = Item::new();
        item.insert("pk".into(), AttributeValue::S("room".into()));
        item.insert("sk".into(), AttributeValue::N(i.to_string()));
        item.insert("name".into(), AttributeValue::S(format!("n{i}")));
        item
    }

    fn page(range: std::ops::Range<usize>, more: bool) -> Page {
        let items: Vec<Item> = range.clone().map(record).collect();
        let last_evaluated_key = more.then(|| {
            Cursor::from_item(&record(range.end - 1), &["pk".into(), "sk".into()])
        });
        Page {
            count: items.len(),
            scanned_count: items.len(),
            items,
            last_evaluated_key,
        }
    }

    fn keys() -> Vec<String> {
        vec!["pk".to_string(), "sk".to_string()]
    }

    #[test]
    fn test_unbounded_runs_until_store_is_exhausted() {
        let mut acc = PageAccumulator::new(&PaginationState::default(), keys());
        assert_eq!(acc.page_size_hint(), None);

        assert_eq!(acc.accept(page(0..3, true)), PageStatus::Fetching);
        assert_eq!(acc.accept(page(3..5, false)), PageStatus::Exhausted);

        let result = acc.finish();
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.cursor, None);
    }

    #[test]
    fn test_limit_truncates_and_builds_cursor() {
        let state = PaginationState {
            limit: 4,
            ..Default::default()
        };
        let mut acc = PageAccumulator::new(&state, keys());
        assert_eq!(acc.page_size_hint(), Some(5));

        assert_eq!(acc.accept(page(0..3, true)), PageStatus::Fetching);
        assert_eq!(acc.page_size_hint(), Some(2));
        assert_eq!(acc.accept(page(3..6, true)), PageStatus::MoreAvailable);

        let result = acc.finish();
        assert_eq!(result.items.len(), 4);
        let cursor = result.cursor.unwrap();
        assert_eq!(cursor.as_item().len(), 2);
        assert_eq!(
            cursor.as_item().get("sk"),
            Some(&AttributeValue::N("3".into()))
        );
        assert!(!cursor.as_item().contains_key("name"));
    }

    #[test]
    fn test_limit_not_reached_returns_no_cursor() {
        let state = PaginationState {
            limit: 10,
            ..Default::default()
        };
        let mut acc = PageAccumulator::new(&state, keys());
        acc.accept(page(0..4, false));

        let result = acc.finish();
        assert_eq!(result.items.len(), 4);
        assert_eq!(result.cursor, None);
    }

    #[test]
    fn test_exact_limit_with_store_token_keeps_fetching() {
        let state = PaginationState {
            limit: 3,
            ..Default::default()
        };
        let mut acc = PageAccumulator::new(&state, keys());

        assert_eq!(acc.accept(page(0..3, true)), PageStatus::Fetching);
        assert_eq!(acc.page_size_hint(), Some(1));
        assert_eq!(acc.accept(page(3..3, false)), PageStatus::Exhausted);

        let result = acc.finish();
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.cursor, None);
    }

    #[test]
    fn test_start_key_comes_from_state() {
        let cursor = Cursor::from_key_values([("pk", KeyValue::from("room"))]);
        let state = PaginationState {
            cursor: Some(cursor.clone()),
            ..Default::default()
        };
        let acc = PageAccumulator::new(&state, keys());
        assert_eq!(acc.status(), PageStatus::Initial);
        assert_eq!(acc.start_key(), Some(&cursor));
    }

    #[test]
    fn test_count_sums_pages() {
        let mut acc = CountAccumulator::new(None, None);
        acc.accept(Page {
            count: 2,
            scanned_count: 5,
            ..Default::default()
        });
        acc.accept(Page {
            count: 1,
            scanned_count: 4,
            ..Default::default()
        });
        assert_eq!(
            acc.finish(),
            Counts {
                total: 9,
                filtered: 3
            }
        );
    }

    #[test]
    fn test_count_with_limit_caps_filtered() {
        let mut acc = CountAccumulator::new(Some(3), None);
        let more = Some(Cursor::from_key_values([("pk", KeyValue::from("x"))]));
        assert_eq!(
            acc.accept(Page {
                count: 2,
                scanned_count: 2,
                last_evaluated_key: more.clone(),
                ..Default::default()
            }),
            PageStatus::Fetching
        );
        assert_eq!(
            acc.accept(Page {
                count: 4,
                scanned_count: 6,
                last_evaluated_key: more,
                ..Default::default()
            }),
            PageStatus::MoreAvailable
        );
        assert_eq!(
            acc.finish(),
            Counts {
                total: 8,
                filtered: 3
            }
        );
    }

    #[test]
    fn test_cursor_key_values() {
        let cursor = Cursor::from_key_values([
            ("pk", KeyValue::from("room")),
            ("sk", KeyValue::from(7)),
        ]);
        let values = cursor.key_values().unwrap();
        assert_eq!(values["pk"], KeyValue::from("room"));
        assert_eq!(values["sk"], KeyValue::N(7));
    }
}
