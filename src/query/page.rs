//! Page results and normalization of backend list responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    /// Whether this is the final page
    pub last: bool,
}

impl<T> PageResult<T> {
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            page,
            size,
            last: true,
        }
    }

    /// Wrap a complete, unpaginated list as a single page
    pub fn single(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            items,
            total_elements: len as u64,
            total_pages: 1,
            page: 0,
            size: len as u32,
            last: true,
        }
    }

    pub fn is_last(&self) -> bool {
        !self.has_more()
    }

    pub fn has_more(&self) -> bool {
        !self.last && self.page.saturating_add(1) < self.total_pages
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
            last: self.last,
        }
    }
}

impl PageResult<Value> {
    /// Deserialize every item into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<PageResult<T>, QueryError> {
        let items = self
            .items
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(PageResult {
            items,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page: self.page,
            size: self.size,
            last: self.last,
        })
    }
}

/// Page envelope as returned by paginated list endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope {
    content: Vec<Value>,
    total_elements: Option<u64>,
    total_pages: Option<u32>,
    number: Option<u32>,
    size: Option<u32>,
    last: Option<bool>,
}

/// Turn a raw list response into a [`PageResult`].
///
/// Paginated endpoints answer with a page envelope; anything answering with a
/// bare array (non-paginated endpoints, or a paginated one that ignored the
/// paging parameters) is wrapped as a single page.
pub fn normalize_response(
    body: Value,
    paginated: bool,
    requested_page: u32,
    requested_size: u32,
) -> Result<PageResult<Value>, QueryError> {
    let is_envelope = body
        .as_object()
        .is_some_and(|map| map.contains_key("content"));
    if is_envelope {
        let envelope: PageEnvelope = serde_json::from_value(body)?;
        return Ok(from_envelope(envelope, requested_page, requested_size));
    }

    match body {
        Value::Array(items) => Ok(PageResult::single(items)),
        Value::Null if !paginated => Ok(PageResult::single(Vec::new())),
        other => {
            let kind = match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                Value::String(_) => "a string",
                Value::Object(_) => "an object without 'content'",
                Value::Array(_) => "an array",
            };
            let expected = if paginated {
                "a page envelope or an array"
            } else {
                "an array"
            };
            Err(QueryError::new(format!(
                "unexpected response shape: expected {}, got {}",
                expected, kind
            )))
        }
    }
}

fn from_envelope(envelope: PageEnvelope, requested_page: u32, requested_size: u32) -> PageResult<Value> {
    let size = envelope.size.unwrap_or(requested_size);
    let page = envelope.number.unwrap_or(requested_page);
    let total_elements = envelope
        .total_elements
        .unwrap_or(envelope.content.len() as u64);

    let total_pages = match envelope.total_pages {
        Some(pages) => pages,
        None if size > 0 => total_elements.div_ceil(size as u64) as u32,
        None => 1,
    };

    let last = envelope
        .last
        .unwrap_or(total_pages == 0 || page.saturating_add(1) >= total_pages);

    PageResult {
        items: envelope.content,
        total_elements,
        total_pages,
        page,
        size,
        last,
    }
}
