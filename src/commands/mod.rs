//! CLI command implementations.

mod config;
mod filters;
mod ls;
mod pick;
mod show;
mod whoami;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use filters::cmd_filters;
pub use ls::{LsOptions, cmd_ls};
pub use pick::{PickOptions, cmd_pick};
pub use show::cmd_show;
pub use whoami::cmd_whoami;

use std::sync::Arc;

use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::access::{Claims, load_claims};
use crate::api::{Entity, Resource, RestClient};
use crate::config::Config;
use crate::error::Result;
use crate::notify::Notifier;
use crate::query::{QueryClient, QueryOptions};
use crate::storage::LocalStore;

/// Run a generic `async fn name::<Record>(args..)` for the record type behind
/// a [`Resource`].
macro_rules! for_resource {
    ($resource:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $resource {
            $crate::api::Resource::Bots => $func::<$crate::api::Bot>($($arg),*).await,
            $crate::api::Resource::Posts => $func::<$crate::api::BlogPost>($($arg),*).await,
            $crate::api::Resource::Users => $func::<$crate::api::User>($($arg),*).await,
            $crate::api::Resource::Roles => $func::<$crate::api::Role>($($arg),*).await,
            $crate::api::Resource::Permissions => {
                $func::<$crate::api::Permission>($($arg),*).await
            }
            $crate::api::Resource::Services => $func::<$crate::api::Service>($($arg),*).await,
            $crate::api::Resource::Notifications => {
                $func::<$crate::api::Notification>($($arg),*).await
            }
        }
    };
}
pub(crate) use for_resource;

/// Output of a command, printed as JSON or as human readable text
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print the JSON form when `json` is set; the text form otherwise, falling
    /// back to pretty JSON when no text was given
    pub fn print(self, json: bool) -> Result<()> {
        match self.text {
            Some(text) if !json => println!("{}", text),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Everything a resource command needs, built once per invocation
pub struct AppContext {
    pub config: Config,
    pub api: Arc<RestClient>,
    pub queries: Arc<QueryClient>,
    pub store: Arc<LocalStore>,
    pub notifier: Arc<Notifier>,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let api = Arc::new(RestClient::from_config(&config)?);
        let store = Arc::new(LocalStore::open(config.storage_path()));
        Ok(Self {
            config,
            api,
            queries: QueryClient::new(),
            store,
            notifier: Notifier::new(),
        })
    }

    pub async fn claims(&self) -> Result<Claims> {
        load_claims(&self.api, &self.config).await
    }

    /// Fail with `Forbidden` unless the caller may read `resource`
    pub async fn authorize(&self, resource: Resource) -> Result<Claims> {
        let claims = self.claims().await?;
        claims.require(
            &resource.gate(),
            &format!("reading {}", resource.display_name().to_lowercase()),
        )?;
        Ok(claims)
    }

    /// Query options for `resource` seeded from the `query` config section
    pub fn query_options(&self, resource: Resource) -> QueryOptions {
        let query = &self.config.query;
        QueryOptions::new(resource.endpoint(), resource.cache_key())
            .page_size(query.page_size)
            .debounce(query.debounce())
            .paginated(resource.is_paginated())
            .cache(query.cache_policy())
    }
}

/// Render records as a table with the entity's columns
pub fn render_table<T: Entity>(items: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns().iter().copied());
    for item in items {
        builder.push_record(item.row());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
