use async_trait::async_trait;
use serde_json::Value;

use crate::error::QueryError;

use super::key::FilterMap;

/// A request for one page of a list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub endpoint: String,
    pub page: u32,
    pub size: u32,
    pub filters: FilterMap,
    /// Non-paginated endpoints receive no paging parameters
    pub paginated: bool,
}

impl PageRequest {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.paginated {
            pairs.push(("page".to_string(), self.page.to_string()));
            pairs.push(("size".to_string(), self.size.to_string()));
        }
        pairs.extend(self.filters.to_query_pairs());
        pairs
    }
}

/// Transport used by the query layer to load raw list responses
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<Value, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_paginated() {
        let request = PageRequest {
            endpoint: "/api/bots".to_string(),
            page: 2,
            size: 20,
            filters: FilterMap::new().with("search", "alpha").with("status", ""),
            paginated: true,
        };
        assert_eq!(
            request.query_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "20".to_string()),
                ("search".to_string(), "alpha".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_unpaginated() {
        let request = PageRequest {
            endpoint: "/api/roles".to_string(),
            page: 0,
            size: 10,
            filters: FilterMap::new(),
            paginated: false,
        };
        assert!(request.query_pairs().is_empty());
    }
}
