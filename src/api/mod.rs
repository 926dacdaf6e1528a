//! Admin REST API: HTTP client, resource catalogue and typed records.

mod client;
mod records;
mod resource;

pub use client::RestClient;
pub use records::{BlogPost, Bot, Notification, Permission, Role, Service, User};
pub use resource::Resource;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::select::OptionId;

/// A backend record with a stable identity
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> OptionId;

    /// Human readable name used in pickers and tags
    fn label(&self) -> String;

    /// Table headers, matching [`Entity::row`]
    fn columns() -> &'static [&'static str];

    fn row(&self) -> Vec<String>;
}
