use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("invalid filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(QueryError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// A failed fetch as seen by the query layer.
///
/// Cloneable so that one failure can be handed to every waiter of a shared
/// in-flight request and kept in component state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// HTTP status code, if the server answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("unexpected response shape: {}", err))
    }
}

impl From<QueryError> for AdminError {
    fn from(err: QueryError) -> Self {
        if err.is_not_found() {
            return AdminError::NotFound(err.message);
        }
        if err.is_unauthorized() {
            return AdminError::Forbidden(err.message);
        }
        AdminError::Api(err)
    }
}
