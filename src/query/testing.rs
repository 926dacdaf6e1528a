//! Scriptable in-memory fetcher shared by the query and select tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::QueryError;

use super::fetcher::{Fetcher, PageRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    pub name: String,
}

enum Source {
    /// Rows `1..=n`, paged and searchable
    Numbered(Vec<Row>),
    /// The same body for every request
    Flat(Value),
}

pub struct MockFetcher {
    source: Source,
    failure: Mutex<Option<QueryError>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockFetcher {
    fn with_source(source: Source) -> Self {
        Self {
            source,
            failure: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn numbered(count: i64) -> Arc<Self> {
        let rows = (1..=count)
            .map(|id| Row {
                id,
                name: format!("Row {id}"),
            })
            .collect();
        Arc::new(Self::with_source(Source::Numbered(rows)))
    }

    pub fn rows(rows: Vec<Row>) -> Arc<Self> {
        Arc::new(Self::with_source(Source::Numbered(rows)))
    }

    pub fn flat(body: Value) -> Arc<Self> {
        Arc::new(Self::with_source(Source::Flat(body)))
    }

    pub fn failing(error: QueryError) -> Arc<Self> {
        let fetcher = Self::with_source(Source::Flat(Value::Null));
        *fetcher.failure.lock() = Some(error);
        Arc::new(fetcher)
    }

    /// Fail every following request until `recover`
    pub fn fail_with(&self, error: QueryError) {
        *self.failure.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PageRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    fn respond(&self, request: &PageRequest) -> Value {
        let rows = match &self.source {
            Source::Flat(body) => return body.clone(),
            Source::Numbered(rows) => rows,
        };

        let search = request.filters.search().to_lowercase();
        let matching: Vec<&Row> = rows
            .iter()
            .filter(|row| {
                search.is_empty()
                    || row.id.to_string().contains(&search)
                    || row.name.to_lowercase().contains(&search)
            })
            .collect();

        if !request.paginated {
            return json!(matching);
        }

        let size = request.size.max(1) as usize;
        let total = matching.len();
        let total_pages = total.div_ceil(size);
        let content: Vec<&Row> = matching
            .into_iter()
            .skip(request.page as usize * size)
            .take(size)
            .collect();

        json!({
            "content": content,
            "totalElements": total,
            "totalPages": total_pages,
            "number": request.page,
            "size": size,
            "last": request.page as usize + 1 >= total_pages,
        })
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<Value, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        Ok(self.respond(request))
    }
}
