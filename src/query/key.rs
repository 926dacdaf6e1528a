//! Cache identity: key parts, filter maps and the resulting query key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

/// Filter key used by the search convenience setters
pub const SEARCH_FILTER: &str = "search";

/// A primitive value usable in cache keys and filters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// One element of a cache key
pub type KeyPart = Scalar;

impl Scalar {
    /// Parse CLI text: booleans and integers are recognized, everything else is a string
    pub fn parse(s: &str) -> Self {
        match s {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => s
                .parse::<i64>()
                .map(Scalar::Int)
                .unwrap_or_else(|_| Scalar::Str(s.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Str(s) if s.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A filter value: a single scalar or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl FilterValue {
    /// Empty strings and empty lists are treated as "no filter"
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::One(s) => s.is_empty(),
            FilterValue::Many(values) => values.iter().all(Scalar::is_empty),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::One(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        FilterValue::One(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::One(value.into())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::One(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::One(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::One(value.into())
    }
}

impl From<Vec<Scalar>> for FilterValue {
    fn from(values: Vec<Scalar>) -> Self {
        FilterValue::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Many(values.into_iter().map(Scalar::from).collect())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Many(values.into_iter().map(Scalar::from).collect())
    }
}

/// Ordered filter map; ordering keeps cache keys and query strings stable
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap(BTreeMap<String, FilterValue>);

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    /// Current value of the `search` filter, empty if unset
    pub fn search(&self) -> &str {
        self.get(SEARCH_FILTER)
            .and_then(FilterValue::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Copy without empty values
    pub fn normalized(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Query string pairs; lists become repeated keys
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in self.normalized().0 {
            match value {
                FilterValue::One(scalar) => pairs.push((key, scalar.to_string())),
                FilterValue::Many(values) => {
                    for scalar in values.into_iter().filter(|s| !s.is_empty()) {
                        pairs.push((key.clone(), scalar.to_string()));
                    }
                }
            }
        }
        pairs
    }
}

impl FromIterator<(String, FilterValue)> for FilterMap {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FilterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", parts.join("&"))
    }
}

/// Parse a `key=value` or `key=a,b,c` filter argument
pub fn parse_filter(arg: &str) -> Result<(String, FilterValue)> {
    let (key, value) = arg.split_once('=').ok_or_else(|| {
        AdminError::InvalidFilter(arg.to_string(), "expected key=value".to_string())
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(AdminError::InvalidFilter(
            arg.to_string(),
            "filter key cannot be empty".to_string(),
        ));
    }

    let value = if value.contains(',') {
        FilterValue::Many(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Scalar::parse)
                .collect(),
        )
    } else {
        FilterValue::One(Scalar::parse(value.trim()))
    };

    Ok((key.to_string(), value))
}

/// The identity of one cached page.
///
/// Built from the caller's cache key, the page coordinates and the filters that
/// have made it through debouncing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub parts: Vec<KeyPart>,
    pub page: u32,
    pub size: u32,
    pub filters: FilterMap,
}

impl QueryKey {
    pub fn new(parts: Vec<KeyPart>, page: u32, size: u32, filters: &FilterMap) -> Self {
        Self {
            parts,
            page,
            size,
            filters: filters.normalized(),
        }
    }

    /// Whether this key belongs to the family identified by `prefix`
    pub fn matches_prefix(&self, prefix: &[KeyPart]) -> bool {
        self.parts.starts_with(prefix)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}[page={} size={}]", parts.join("/"), self.page, self.size)?;
        if !self.filters.is_empty() {
            write!(f, "?{}", self.filters)?;
        }
        Ok(())
    }
}
