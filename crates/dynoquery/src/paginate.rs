use tracing::debug;

use dynoquery_core::pagination::{
    CountAccumulator, Counts, Cursor, PageAccumulator, PageResult, PaginationState,
};
use dynoquery_core::store::{Page, ReadRequest, Store};
use dynoquery_core::{Error, Operation, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadKind {
    Query,
    Scan,
}

async fn fetch_page(
    store: &dyn Store,
    operation: Operation,
    kind: ReadKind,
    request: &ReadRequest,
) -> Result<Page> {
    let page = match kind {
        ReadKind::Query => store.query(request).await,
        ReadKind::Scan => store.scan(request).await,
    }
    .map_err(|e| Error::from_store(operation, e))?;

    debug!(
        operation = %operation,
        table = %request.table_name,
        index = request.index_name.as_deref().unwrap_or("-"),
        items = page.items.len(),
        scanned = page.scanned_count,
        more = page.last_evaluated_key.is_some(),
        "fetched page"
    );
    Ok(page)
}

/// Follows pages until the store runs dry or `state.limit` items are
/// collected.
pub(crate) async fn fetch_items(
    store: &dyn Store,
    operation: Operation,
    kind: ReadKind,
    mut request: ReadRequest,
    state: &PaginationState,
    key_attributes: Vec<String>,
) -> Result<PageResult> {
    let mut pages = PageAccumulator::new(state, key_attributes);

    while !pages.status().is_terminal() {
        pages.begin_fetch();
        request.exclusive_start_key = pages.start_key().cloned();
        request.limit = pages.page_size_hint();

        let page = fetch_page(store, operation, kind, &request).await?;
        pages.accept(page);
    }

    Ok(pages.finish())
}

/// Sums count-only pages. The store decides page sizes.
pub(crate) async fn count_items(
    store: &dyn Store,
    operation: Operation,
    kind: ReadKind,
    mut request: ReadRequest,
    limit: Option<usize>,
    start_key: Option<Cursor>,
) -> Result<Counts> {
    let mut counts = CountAccumulator::new(limit, start_key);

    while !counts.status().is_terminal() {
        counts.begin_fetch();
        request.exclusive_start_key = counts.start_key().cloned();
        request.limit = None;

        let page = fetch_page(store, operation, kind, &request).await?;
        counts.accept(page);
    }

    Ok(counts.finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use aws_sdk_dynamodb::types::AttributeValue;
    use dynoquery_core::store::{
        BatchGetOutput, BatchGetRequest, BatchWriteOutput, BatchWriteRequest, DeleteItemRequest,
        GetItemRequest, PutItemRequest, StoreError, StoreResult, UpdateItemRequest,
    };
    use dynoquery_core::{ErrorKind, Item};

    use super::*;

    /// Serves fixed pages in order and records the requested limits.
    struct PagedStore {
        pages: Mutex<Vec<Page>>,
        limits: Mutex<Vec<Option<usize>>>,
    }

    impl PagedStore {
        fn new(mut pages: Vec<Page>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                limits: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, request: &ReadRequest) -> StoreResult<Page> {
            self.limits.lock().unwrap().push(request.limit);
            self.pages
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| StoreError::Other("no more pages".to_string()))
        }
    }

    #[async_trait]
    impl Store for PagedStore {
        async fn get_item(&self, _: GetItemRequest) -> StoreResult<Option<Item>> {
            unimplemented!()
        }
        async fn put_item(&self, _: PutItemRequest) -> StoreResult<()> {
            unimplemented!()
        }
        async fn update_item(&self, _: UpdateItemRequest) -> StoreResult<()> {
            unimplemented!()
        }
        async fn delete_item(&self, _: DeleteItemRequest) -> StoreResult<()> {
            unimplemented!()
        }
        async fn query(&self, request: &ReadRequest) -> StoreResult<Page> {
            self.next(request)
        }
        async fn scan(&self, request: &ReadRequest) -> StoreResult<Page> {
            self.next(request)
        }
        async fn batch_get(&self, _: BatchGetRequest) -> StoreResult<BatchGetOutput> {
            unimplemented!()
        }
        async fn batch_write(&self, _: BatchWriteRequest) -> StoreResult<BatchWriteOutput> {
            unimplemented!()
        }
    }

    fn item(id: u32) -> Item {
        Item::from([("pk".to_string(), AttributeValue::S(format!("id{id}")))])
    }

    fn page(ids: std::ops::Range<u32>, more: bool) -> Page {
        let items: Vec<Item> = ids.map(item).collect();
        let last = items.last().cloned().map(Cursor::new);
        Page {
            count: items.len(),
            scanned_count: items.len(),
            last_evaluated_key: if more { last } else { None },
            items,
        }
    }

    #[tokio::test]
    async fn test_unbounded_follows_every_page() {
        let store = PagedStore::new(vec![page(0..3, true), page(3..5, true), page(5..6, false)]);

        let result = fetch_items(
            &store,
            Operation::Scan,
            ReadKind::Scan,
            ReadRequest::new("t"),
            &PaginationState::default(),
            vec!["pk".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(result.items.len(), 6);
        assert_eq!(result.cursor, None);
        assert_eq!(*store.limits.lock().unwrap(), vec![None, None, None]);
    }

    #[tokio::test]
    async fn test_limit_truncates_and_builds_cursor() {
        let store = PagedStore::new(vec![page(0..2, true), page(2..5, true)]);
        let state = PaginationState {
            limit: 3,
            ..Default::default()
        };

        let result = fetch_items(
            &store,
            Operation::Query,
            ReadKind::Query,
            ReadRequest::new("t"),
            &state,
            vec!["pk".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(result.items, vec![item(0), item(1), item(2)]);
        assert_eq!(result.cursor, Some(Cursor::new(item(2))));
        assert_eq!(*store.limits.lock().unwrap(), vec![Some(4), Some(2)]);
    }

    #[tokio::test]
    async fn test_exact_fill_without_more_has_no_cursor() {
        let store = PagedStore::new(vec![page(0..3, false)]);
        let state = PaginationState {
            limit: 3,
            ..Default::default()
        };

        let result = fetch_items(
            &store,
            Operation::Query,
            ReadKind::Query,
            ReadRequest::new("t"),
            &state,
            vec!["pk".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(result.items.len(), 3);
        assert_eq!(result.cursor, None);
    }

    #[tokio::test]
    async fn test_store_error_is_classified() {
        let store = PagedStore::new(Vec::new());

        let err = fetch_items(
            &store,
            Operation::Scan,
            ReadKind::Scan,
            ReadRequest::new("t"),
            &PaginationState::default(),
            Vec::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            Error::new(Operation::Scan, ErrorKind::Store("no more pages".to_string()))
        );
    }

    #[tokio::test]
    async fn test_count_sums_pages_and_stops_at_limit() {
        let pages = vec![
            Page {
                count: 2,
                scanned_count: 5,
                last_evaluated_key: Some(Cursor::new(item(4))),
                ..Default::default()
            },
            Page {
                count: 4,
                scanned_count: 5,
                last_evaluated_key: Some(Cursor::new(item(9))),
                ..Default::default()
            },
        ];

        let unbounded = count_items(
            &PagedStore::new(vec![pages[0].clone(), Page::default()]),
            Operation::Count,
            ReadKind::Scan,
            ReadRequest::new("t"),
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(unbounded, Counts { total: 5, filtered: 2 });

        let store = PagedStore::new(pages);
        let limited = count_items(
            &store,
            Operation::CountWithLimit,
            ReadKind::Scan,
            ReadRequest::new("t"),
            Some(3),
            None,
        )
        .await
        .unwrap();
        assert_eq!(limited, Counts { total: 10, filtered: 3 });
        assert_eq!(*store.limits.lock().unwrap(), vec![None, None]);
    }
}
