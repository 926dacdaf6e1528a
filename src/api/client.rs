//! HTTP client for the admin API.
//!
//! The bearer token lives in a `SecretBox` and is only exposed while building
//! the Authorization header, which is marked sensitive so reqwest redacts it
//! from its own debug output.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretBox};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{AdminError, QueryError, Result};
use crate::query::{Fetcher, PageRequest};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RestClient {
    client: Client,
    base_url: Url,
    token: Option<SecretBox<String>>,
}

impl RestClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AdminError::Config(format!(
                "API base URL must be http(s), got '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token
                .filter(|t| !t.is_empty())
                .map(|t| SecretBox::new(Box::new(t))),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url(), config.token(), config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Resolve `path` below the base URL, keeping any base path prefix
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    fn auth_header(&self) -> std::result::Result<Option<header::HeaderValue>, QueryError> {
        let Some(token) = &self.token else {
            return Ok(None);
        };
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| QueryError::new("API token contains characters not allowed in a header"))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    /// GET `path` with query parameters and return the JSON body
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Value, QueryError> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(query);
        if let Some(auth) = self.auth_header()? {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, path, &body));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch one record from a detail endpoint
    pub async fn get_one<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, QueryError> {
        let body = self.get_json(path, &[]).await?;
        if body.is_null() {
            return Err(QueryError::with_status(404, format!("{} returned no content", path)));
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// Error for a non-2xx response, preferring the server's own message
fn status_error(status: StatusCode, path: &str, body: &str) -> QueryError {
    let server_message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error", "detail"]
            .iter()
            .find_map(|field| json.get(field).and_then(Value::as_str).map(str::to_string))
    });

    let message = server_message.unwrap_or_else(|| {
        format!(
            "{} {}",
            path,
            status.canonical_reason().unwrap_or("request failed")
        )
    });
    QueryError::with_status(status.as_u16(), message)
}

#[async_trait]
impl Fetcher for RestClient {
    async fn fetch(&self, request: &PageRequest) -> std::result::Result<Value, QueryError> {
        self.get_json(&request.endpoint, &request.query_pairs()).await
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
