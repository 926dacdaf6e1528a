//! Records returned by the admin API.
//!
//! Only the identity is required. Everything else is optional, and fields this
//! console does not know about are kept in `extra` so `--json` output loses
//! nothing.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::select::OptionId;

use super::Entity;

fn cell<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Names of nested references that are either plain strings or `{ "name": .. }`
fn names(values: &[Value]) -> String {
    let names: Vec<&str> = values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        })
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: OptionId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Bot {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("bot {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Status", "Model", "Created"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.name),
            cell(&self.status),
            cell(&self.model),
            cell(&self.created_at),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: OptionId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for BlogPost {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.slug.clone())
            .unwrap_or_else(|| format!("post {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Status", "Author", "Tags", "Published"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.title),
            cell(&self.status),
            cell(&self.author),
            names(&self.tags),
            cell(&self.published_at),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: OptionId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub roles: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

impl Entity for User {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Username", "Name", "Email", "Enabled", "Roles"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.username),
            cell(&self.full_name()),
            cell(&self.email),
            cell(&self.enabled),
            names(&self.roles),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: OptionId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Role {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("role {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Description", "Permissions"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.name),
            cell(&self.description),
            names(&self.permissions),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: OptionId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Permission {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("permission {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), cell(&self.name), cell(&self.description)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: OptionId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Service {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("service {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Status", "Version", "URL"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.name),
            cell(&self.status),
            cell(&self.version),
            cell(&self.url),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: OptionId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Notification {
    fn id(&self) -> OptionId {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| format!("notification {}", self.id))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Level", "Title", "Read", "Created"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            cell(&self.level),
            cell(&self.title),
            cell(&self.read),
            cell(&self.created_at),
        ]
    }
}
