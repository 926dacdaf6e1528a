//! Paginated, filterable, cached list queries.
//!
//! A [`PaginatedQuery`] owns the page coordinates and filter state of one list
//! view. Filter edits are debounced before they reach the cache key; page and
//! page-size changes take effect immediately. Every fetch is split into
//! [`PaginatedQuery::begin`], which produces an owned [`FetchRequest`] that can
//! run anywhere, and [`PaginatedQuery::apply`], which folds the outcome back in.
//! Requests carry a sequence number and only the most recently begun one is
//! applied, so a slow response can never overwrite newer state.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::QueryError;
use crate::storage::{LocalStore, PersistedCell, filters_key};
use crate::timer::Debouncer;

use super::client::{CachePolicy, CachedPage, QueryClient};
use super::fetcher::{Fetcher, PageRequest};
use super::key::{FilterMap, FilterValue, KeyPart, QueryKey, SEARCH_FILTER};
use super::page::{PageResult, normalize_response};

/// Reshapes a raw response before it is normalized into a page
pub type ResponseTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Construction parameters for a [`PaginatedQuery`]
#[derive(Clone)]
pub struct QueryOptions {
    pub endpoint: String,
    pub key: Vec<KeyPart>,
    pub initial_page: u32,
    pub initial_page_size: u32,
    pub initial_filters: FilterMap,
    pub persist_filters: bool,
    pub debounce: Duration,
    /// Served in place of a failed response
    pub mock_data: Option<Value>,
    pub paginated: bool,
    pub cache: CachePolicy,
    pub transform: Option<ResponseTransform>,
}

impl QueryOptions {
    pub fn new(endpoint: impl Into<String>, key: Vec<KeyPart>) -> Self {
        Self {
            endpoint: endpoint.into(),
            key,
            initial_page: 0,
            initial_page_size: DEFAULT_PAGE_SIZE,
            initial_filters: FilterMap::new(),
            persist_filters: false,
            debounce: DEFAULT_DEBOUNCE,
            mock_data: None,
            paginated: true,
            cache: CachePolicy::default(),
            transform: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.initial_page = page;
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.initial_page_size = size.max(1);
        self
    }

    pub fn filters(mut self, filters: FilterMap) -> Self {
        self.initial_filters = filters;
        self
    }

    pub fn persist_filters(mut self, persist: bool) -> Self {
        self.persist_filters = persist;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn mock_data(mut self, mock: Value) -> Self {
        self.mock_data = Some(mock);
        self
    }

    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = policy;
        self
    }

    pub fn without_cache(self) -> Self {
        self.cache(CachePolicy::disabled())
    }

    pub fn transform(mut self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("endpoint", &self.endpoint)
            .field("key", &self.key)
            .field("initial_page", &self.initial_page)
            .field("initial_page_size", &self.initial_page_size)
            .field("initial_filters", &self.initial_filters)
            .field("persist_filters", &self.persist_filters)
            .field("debounce", &self.debounce)
            .field("mock_data", &self.mock_data.is_some())
            .field("paginated", &self.paginated)
            .field("cache", &self.cache)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// What a consumer renders
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<PageResult<T>>,
    pub loading: bool,
    pub error: Option<QueryError>,
    /// The current data is the mock payload standing in for a failed fetch
    pub from_fallback: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            from_fallback: false,
        }
    }
}

/// An owned, runnable fetch produced by [`PaginatedQuery::begin`]
#[derive(Clone)]
pub struct FetchRequest {
    seq: u64,
    key: QueryKey,
    request: PageRequest,
    policy: CachePolicy,
    client: Arc<QueryClient>,
    fetcher: Arc<dyn Fetcher>,
    transform: Option<ResponseTransform>,
    mock_data: Option<Value>,
}

impl FetchRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page(&self) -> u32 {
        self.request.page
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub async fn run(self) -> FetchOutcome {
        let fetcher = Arc::clone(&self.fetcher);
        let request = self.request.clone();
        let transform = self.transform.clone();

        let result = self
            .client
            .fetch(&self.key, self.policy, move || async move {
                let body = fetcher.fetch(&request).await?;
                let body = match transform {
                    Some(transform) => transform(body),
                    None => body,
                };
                normalize_response(body, request.paginated, request.page, request.size)
            })
            .await;

        match result {
            Ok(page) => FetchOutcome {
                seq: self.seq,
                page: self.request.page,
                result: Ok(page),
                from_fallback: false,
            },
            Err(error) => self.fallback(error),
        }
    }

    fn fallback(self, error: QueryError) -> FetchOutcome {
        let result = match self.mock_data {
            Some(mock) => {
                match normalize_response(mock, self.request.paginated, self.request.page, self.request.size) {
                    Ok(page) => {
                        warn!(
                            "Fetching {} failed ({}); serving mock data instead",
                            self.request.endpoint, error
                        );
                        return FetchOutcome {
                            seq: self.seq,
                            page: self.request.page,
                            result: Ok(Arc::new(page)),
                            from_fallback: true,
                        };
                    }
                    Err(mock_error) => {
                        warn!("Mock data for {} is unusable: {}", self.request.endpoint, mock_error);
                        Err(error)
                    }
                }
            }
            None => Err(error),
        };

        FetchOutcome {
            seq: self.seq,
            page: self.request.page,
            result,
            from_fallback: false,
        }
    }
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("seq", &self.seq)
            .field("key", &self.key)
            .field("request", &self.request)
            .finish()
    }
}

/// The result of running a [`FetchRequest`]
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    seq: u64,
    page: u32,
    result: Result<CachedPage, QueryError>,
    from_fallback: bool,
}

impl FetchOutcome {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One list view's query state
pub struct PaginatedQuery<T> {
    client: Arc<QueryClient>,
    fetcher: Arc<dyn Fetcher>,
    options: QueryOptions,
    page: u32,
    page_size: u32,
    filters: Debouncer<FilterMap>,
    persisted: Option<PersistedCell<FilterMap>>,
    state: QueryState<T>,
    latest_seq: u64,
    loaded_once: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T> PaginatedQuery<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create the query. `store` is only consulted when filters are persisted.
    pub fn new(
        client: Arc<QueryClient>,
        fetcher: Arc<dyn Fetcher>,
        options: QueryOptions,
        store: Option<Arc<LocalStore>>,
    ) -> Self {
        let persisted = match (options.persist_filters, store) {
            (true, Some(store)) => Some(PersistedCell::new(
                store,
                filters_key(&options.endpoint),
                options.initial_filters.clone(),
            )),
            _ => None,
        };

        let filters = persisted
            .as_ref()
            .map(|cell| cell.get().clone())
            .unwrap_or_else(|| options.initial_filters.clone());

        Self {
            client,
            fetcher,
            page: options.initial_page,
            page_size: options.initial_page_size.max(1),
            filters: Debouncer::new(filters, options.debounce),
            persisted,
            options,
            state: QueryState::default(),
            latest_seq: 0,
            loaded_once: false,
            _item: PhantomData,
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        self.state
            .data
            .as_ref()
            .map(|data| data.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn data(&self) -> Option<&PageResult<T>> {
        self.state.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.state.error.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_elements(&self) -> u64 {
        self.state.data.as_ref().map_or(0, |d| d.total_elements)
    }

    pub fn total_pages(&self) -> u32 {
        self.state.data.as_ref().map_or(0, |d| d.total_pages)
    }

    /// More pages exist beyond the loaded one
    pub fn has_more(&self) -> bool {
        self.state.data.as_ref().is_some_and(PageResult::has_more)
    }

    /// Filters as last set, including edits still being debounced
    pub fn filters(&self) -> &FilterMap {
        self.filters.latest()
    }

    /// Filters currently folded into the cache key
    pub fn applied_filters(&self) -> FilterMap {
        self.filters.settled()
    }

    pub fn filters_pending(&self) -> bool {
        self.filters.is_pending()
    }

    /// No fetch has completed yet and none is running
    pub fn needs_initial_load(&self) -> bool {
        !self.loaded_once && !self.state.loading
    }

    pub fn descriptor(&self) -> QueryKey {
        QueryKey::new(
            self.options.key.clone(),
            self.page,
            self.page_size,
            &self.filters.settled(),
        )
    }

    /// Start a fetch of the current descriptor
    pub fn begin(&mut self) -> FetchRequest {
        self.latest_seq += 1;
        self.state.loading = true;

        let filters = self.filters.settled().normalized();
        let request = PageRequest {
            endpoint: self.options.endpoint.clone(),
            page: self.page,
            size: self.page_size,
            filters,
            paginated: self.options.paginated,
        };

        FetchRequest {
            seq: self.latest_seq,
            key: self.descriptor(),
            request,
            policy: self.options.cache,
            client: Arc::clone(&self.client),
            fetcher: Arc::clone(&self.fetcher),
            transform: self.options.transform.clone(),
            mock_data: self.options.mock_data.clone(),
        }
    }

    /// Fold a finished fetch into the state.
    ///
    /// Returns false when the outcome belongs to a superseded request.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            debug!(
                "discarding response #{} for page {}; #{} is newer",
                outcome.seq, outcome.page, self.latest_seq
            );
            return false;
        }

        self.state.loading = false;
        self.loaded_once = true;

        match outcome.result.and_then(|page| decode(&page)) {
            Ok(page) => {
                self.state.data = Some(page);
                self.state.error = None;
                self.state.from_fallback = outcome.from_fallback;
            }
            Err(error) => {
                self.state.error = Some(error);
            }
        }
        true
    }

    /// Run a request to completion and apply it
    pub async fn run(&mut self, request: FetchRequest) -> bool {
        let outcome = request.run().await;
        self.apply(outcome)
    }

    /// Fetch the current descriptor and wait for it
    pub async fn fetch(&mut self) -> &QueryState<T> {
        let request = self.begin();
        self.run(request).await;
        &self.state
    }

    /// Move to `page`. Returns the fetch to run, if one is due.
    pub fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page == self.page {
            return None;
        }
        self.page = page;
        self.refetch_after_change()
    }

    /// The page after the loaded one. A failed attempt at that page is retried.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        let next = self.data().filter(|d| d.has_more())?.page.saturating_add(1);
        if next == self.page {
            if self.state.loading || self.state.error.is_none() {
                return None;
            }
            return Some(self.begin());
        }
        self.set_page(next)
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if self.page == 0 {
            return None;
        }
        self.set_page(self.page - 1)
    }

    /// Change the page size; the page index returns to 0
    pub fn set_page_size(&mut self, size: u32) -> Option<FetchRequest> {
        let size = size.max(1);
        if size == self.page_size {
            return None;
        }
        self.page_size = size;
        self.page = 0;
        self.refetch_after_change()
    }

    fn refetch_after_change(&mut self) -> Option<FetchRequest> {
        // Before the first load the mount fetch picks the change up
        if !self.loaded_once && !self.state.loading {
            return None;
        }
        Some(self.begin())
    }

    /// Replace all filters. They reach the cache key once the debounce
    /// settles, and the page index returns to 0 at that point.
    pub fn set_filters(&mut self, filters: FilterMap) {
        if let Some(cell) = self.persisted.as_mut() {
            cell.set(filters.clone());
        }
        self.filters.update(filters);
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let mut filters = self.filters.latest().clone();
        filters.set(key, value);
        self.set_filters(filters);
    }

    pub fn remove_filter(&mut self, key: &str) {
        let mut filters = self.filters.latest().clone();
        if filters.remove(key).is_some() {
            self.set_filters(filters);
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.set_filter(SEARCH_FILTER, text.into());
    }

    /// Back to the initial filters; a persisted filter set is forgotten
    pub fn reset_filters(&mut self) {
        let initial = self.options.initial_filters.clone();
        if let Some(cell) = self.persisted.as_mut() {
            cell.reset(initial.clone());
        }
        self.filters.update(initial);
    }

    /// Apply the debounced filters right away
    pub fn flush_filters(&mut self) -> Option<FetchRequest> {
        self.filters.flush();
        self.poll_filters()
    }

    /// Non-blocking: the fetch to run if debounced filters have settled since
    /// the last call
    pub fn poll_filters(&mut self) -> Option<FetchRequest> {
        self.filters.take_changed()?;
        self.page = 0;
        Some(self.begin())
    }

    /// Wait for a pending filter edit to settle, then return its fetch
    pub async fn settle_filters(&mut self) -> Option<FetchRequest> {
        while self.filters.is_pending() {
            tokio::time::sleep(self.filters.delay()).await;
        }
        self.poll_filters()
    }

    /// Soft refresh: mark this query's entries stale and refetch, keeping the
    /// current data visible meanwhile
    pub fn refresh(&mut self) -> FetchRequest {
        self.client.invalidate(&self.options.key);
        self.begin()
    }

    /// Hard refresh: evict this query's entries and refetch from scratch
    pub fn force_refresh(&mut self) -> FetchRequest {
        self.client.remove(&self.options.key);
        self.state.data = None;
        self.state.from_fallback = false;
        self.begin()
    }
}

fn decode<T: DeserializeOwned>(page: &CachedPage) -> Result<PageResult<T>, QueryError> {
    page.decode()
}

impl<T> fmt::Debug for PaginatedQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedQuery")
            .field("endpoint", &self.options.endpoint)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("filters", self.filters.latest())
            .field("loading", &self.state.loading)
            .field("latest_seq", &self.latest_seq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::{MockFetcher, Row};
    use serde_json::json;
    use std::fs;

    fn query(fetcher: &Arc<MockFetcher>, options: QueryOptions) -> PaginatedQuery<Row> {
        PaginatedQuery::new(QueryClient::new(), fetcher.clone(), options, None)
    }

    fn options() -> QueryOptions {
        QueryOptions::new("/api/bots", vec!["bots".into()])
    }

    #[tokio::test]
    async fn test_initial_fetch() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        assert!(q.needs_initial_load());

        let state = q.fetch().await;
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(q.items().len(), 10);
        assert_eq!(q.total_elements(), 25);
        assert_eq!(q.total_pages(), 3);
        assert!(q.has_more());
        assert!(!q.needs_initial_load());
    }

    #[tokio::test]
    async fn test_page_change_before_first_load_does_not_fetch() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        assert!(q.set_page(1).is_none());
        q.fetch().await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(q.items()[0].id, 11);
    }

    #[tokio::test]
    async fn test_page_change_fetches_immediately() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        q.fetch().await;

        let request = q.set_page(2).expect("page change should refetch");
        assert_eq!(request.page(), 2);
        q.run(request).await;
        assert_eq!(q.items().len(), 5);
        assert!(!q.has_more());
        assert!(q.next_page().is_none());
        assert!(q.set_page(2).is_none());
    }

    #[tokio::test]
    async fn test_page_size_change_resets_page() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        q.fetch().await;
        let request = q.set_page(1).unwrap();
        q.run(request).await;

        let request = q.set_page_size(20).unwrap();
        q.run(request).await;
        assert_eq!(q.page(), 0);
        assert_eq!(q.items().len(), 20);
        assert_eq!(q.total_pages(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filters_are_debounced() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        q.fetch().await;
        let request = q.set_page(1).unwrap();
        q.run(request).await;

        q.set_search("1");
        q.set_search("12");
        assert_eq!(q.page(), 1);
        assert_eq!(q.filters().search(), "12");
        assert_eq!(q.applied_filters().search(), "");
        assert!(q.poll_filters().is_none());

        let request = q.settle_filters().await.expect("settled filters refetch");
        assert_eq!(request.page(), 0);
        q.run(request).await;
        assert_eq!(q.page(), 0);
        assert_eq!(q.applied_filters().search(), "12");
        assert_eq!(q.items().iter().map(|r| r.id).collect::<Vec<_>>(), vec![12]);
        assert_eq!(fetcher.last_request().unwrap().filters.search(), "12");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_without_net_change_does_not_fetch() {
        let fetcher = MockFetcher::numbered(5);
        let mut q = query(&fetcher, options());
        q.fetch().await;

        q.set_search("x");
        q.set_search("");
        assert!(q.settle_filters().await.is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_filter_edit_keeps_page() {
        let fetcher = MockFetcher::numbered(40);
        let mut q = query(&fetcher, options());
        q.fetch().await;
        let request = q.set_page(2).unwrap();
        q.run(request).await;

        q.set_search("x");
        q.set_search("");
        assert!(q.settle_filters().await.is_none());
        assert_eq!(q.page(), 2);
        assert_eq!(q.data().unwrap().page, 2);

        let request = q.next_page().expect("page 3 remains");
        assert_eq!(request.page(), 3);
    }

    #[tokio::test]
    async fn test_next_page_retries_failed_page() {
        let fetcher = MockFetcher::numbered(40);
        let mut q = query(&fetcher, options().without_cache());
        q.fetch().await;

        fetcher.fail_with(QueryError::with_status(502, "bad gateway"));
        let request = q.next_page().unwrap();
        assert_eq!(request.page(), 1);
        q.run(request).await;
        assert!(q.error().is_some());
        assert_eq!(q.data().unwrap().page, 0);

        fetcher.recover();
        let request = q.next_page().expect("failed page is retried");
        assert_eq!(request.page(), 1);
        q.run(request).await;
        assert!(q.error().is_none());
        assert_eq!(q.data().unwrap().page, 1);
        assert_eq!(q.items()[0].id, 11);
        assert!(q.next_page().is_some_and(|r| r.page() == 2));
    }

    #[tokio::test]
    async fn test_identical_descriptor_served_from_cache() {
        let fetcher = MockFetcher::numbered(25);
        let client = QueryClient::new();
        let mut a: PaginatedQuery<Row> =
            PaginatedQuery::new(Arc::clone(&client), fetcher.clone(), options(), None);
        let mut b: PaginatedQuery<Row> =
            PaginatedQuery::new(Arc::clone(&client), fetcher.clone(), options(), None);

        a.fetch().await;
        b.fetch().await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.items(), b.items());
    }

    #[tokio::test]
    async fn test_without_cache_always_hits_network() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options().without_cache());
        q.fetch().await;
        q.fetch().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_and_force_refresh() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        q.fetch().await;
        q.fetch().await;
        assert_eq!(fetcher.calls(), 1);

        let request = q.refresh();
        assert!(q.data().is_some(), "soft refresh keeps data visible");
        q.run(request).await;
        assert_eq!(fetcher.calls(), 2);

        let request = q.force_refresh();
        assert!(q.data().is_none());
        q.run(request).await;
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(q.items().len(), 10);
    }

    #[tokio::test]
    async fn test_error_surfaces_as_state() {
        let fetcher = MockFetcher::failing(QueryError::with_status(503, "maintenance"));
        let mut q = query(&fetcher, options());
        let state = q.fetch().await;
        assert_eq!(state.error.as_ref().unwrap().status, Some(503));
        assert!(state.data.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_mock_fallback_on_failure() {
        let fetcher = MockFetcher::failing(QueryError::new("connection refused"));
        let mock = json!({
            "content": [{"id": 1, "name": "Demo"}],
            "totalElements": 1,
            "totalPages": 1,
            "number": 0,
            "size": 10
        });
        let mut q = query(&fetcher, options().mock_data(mock));
        let state = q.fetch().await;
        assert!(state.error.is_none());
        assert!(state.from_fallback);
        assert_eq!(q.items()[0].name, "Demo");
    }

    #[tokio::test]
    async fn test_unpaginated_endpoint_is_wrapped() {
        let fetcher = MockFetcher::flat(json!([{"id": 1, "name": "ADMIN"}, {"id": 2, "name": "USER"}]));
        let mut q = query(&fetcher, options().paginated(false));
        q.fetch().await;
        assert_eq!(q.total_pages(), 1);
        assert_eq!(q.items().len(), 2);
        assert!(!q.has_more());
        assert!(fetcher.last_request().unwrap().query_pairs().is_empty());
    }

    #[tokio::test]
    async fn test_transform_applied_before_normalizing() {
        let fetcher = MockFetcher::flat(json!({"data": {"items": [{"id": 3, "name": "C"}]}}));
        let mut q = query(
            &fetcher,
            options()
                .paginated(false)
                .transform(|body| body["data"]["items"].clone()),
        );
        q.fetch().await;
        assert_eq!(q.items()[0].id, 3);
    }

    #[tokio::test]
    async fn test_stale_outcome_is_discarded() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options());
        q.fetch().await;

        let slow = q.set_page(1).unwrap();
        let fast = q.set_page(2).unwrap();
        let fast_outcome = fast.run().await;
        let slow_outcome = slow.run().await;

        assert!(q.apply(fast_outcome));
        assert!(!q.apply(slow_outcome));
        assert_eq!(q.data().unwrap().page, 2);
        assert_eq!(q.items()[0].id, 21);
    }

    #[tokio::test]
    async fn test_persisted_filters_survive_recreation() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(LocalStore::open(dir.path().join("storage.json")));
        let fetcher = MockFetcher::numbered(25);

        let mut q: PaginatedQuery<Row> = PaginatedQuery::new(
            QueryClient::new(),
            fetcher.clone(),
            options().persist_filters(true).debounce(Duration::ZERO),
            Some(Arc::clone(&store)),
        );
        q.set_filter("status", "ACTIVE");

        let recreated: PaginatedQuery<Row> = PaginatedQuery::new(
            QueryClient::new(),
            fetcher.clone(),
            options().persist_filters(true),
            Some(store),
        );
        assert_eq!(
            recreated.filters().get("status"),
            Some(&FilterValue::from("ACTIVE"))
        );
        assert_eq!(recreated.applied_filters(), recreated.filters().clone());
    }

    #[tokio::test]
    async fn test_corrupted_persisted_filters_fall_back_to_initial() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"filters_api_bots": "{not json"}"#).unwrap();
        let store = Arc::new(LocalStore::open(&path));

        let initial = FilterMap::new().with("status", "ACTIVE");
        let q: PaginatedQuery<Row> = PaginatedQuery::new(
            QueryClient::new(),
            MockFetcher::numbered(1),
            options().persist_filters(true).filters(initial.clone()),
            Some(store),
        );
        assert_eq!(q.filters(), &initial);
    }

    #[tokio::test]
    async fn test_reset_filters() {
        let fetcher = MockFetcher::numbered(25);
        let initial = FilterMap::new().with("status", "ACTIVE");
        let mut q = query(&fetcher, options().filters(initial.clone()).debounce(Duration::ZERO));
        q.set_search("abc");
        assert!(q.poll_filters().is_some());
        q.reset_filters();
        assert_eq!(q.filters(), &initial);
        assert_eq!(q.applied_filters(), initial);
    }

    #[tokio::test]
    async fn test_reset_filters_returns_to_first_page_when_applied() {
        let fetcher = MockFetcher::numbered(25);
        let mut q = query(&fetcher, options().debounce(Duration::ZERO));
        q.set_search("1");
        q.fetch().await;
        let request = q.set_page(1).unwrap();
        q.run(request).await;

        q.reset_filters();
        assert_eq!(q.page(), 1);
        let request = q.poll_filters().expect("reset changes the applied filters");
        assert_eq!(request.page(), 0);
        assert_eq!(q.page(), 0);
    }
}
