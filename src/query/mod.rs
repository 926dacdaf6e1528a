//! Paginated list queries over the admin API.
//!
//! The pieces compose bottom-up: [`QueryKey`] identifies a cached page,
//! [`QueryClient`] caches pages and collapses concurrent loads, a [`Fetcher`]
//! moves raw responses over the wire, and [`PaginatedQuery`] ties page
//! coordinates, debounced filters and fetch sequencing together for one view.

mod client;
mod fetcher;
mod key;
mod page;
mod paginated;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CachePolicy, CachedPage, QueryClient};
pub use fetcher::{Fetcher, PageRequest};
pub use key::{FilterMap, FilterValue, KeyPart, QueryKey, SEARCH_FILTER, Scalar, parse_filter};
pub use page::{PageResult, normalize_response};
pub use paginated::{
    DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, FetchOutcome, FetchRequest, PaginatedQuery, QueryOptions,
    QueryState, ResponseTransform,
};
