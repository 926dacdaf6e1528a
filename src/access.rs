//! Role and permission gating.
//!
//! Claims come from the backend's profile endpoint. When it cannot be reached
//! the `identity` section of the configuration stands in.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::api::RestClient;
use crate::config::Config;
use crate::error::{AdminError, Result};

/// Role that passes every gate
pub const ADMIN_ROLE: &str = "ADMIN";

/// What the current user holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub username: Option<String>,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    /// Claims came from configuration rather than the backend
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub from_config: bool,
}

impl Claims {
    pub fn new(
        username: Option<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
        permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            username,
            roles: roles
                .into_iter()
                .map(Into::<String>::into)
                .map(|role| normalize_role(&role))
                .collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            from_config: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let identity = &config.identity;
        Self {
            from_config: true,
            ..Self::new(
                identity.username.clone(),
                identity.roles.iter().cloned(),
                identity.permissions.iter().cloned(),
            )
        }
    }

    /// Read claims out of a profile response.
    ///
    /// Roles and permissions may be plain strings or `{ "name": .. }` objects;
    /// permissions nested inside role objects count too, as do Spring-style
    /// `authorities` (`ROLE_` prefixed entries are roles).
    pub fn from_profile(profile: &Value) -> Self {
        let username = ["username", "preferred_username", "email"]
            .iter()
            .find_map(|field| profile.get(field).and_then(Value::as_str))
            .map(str::to_string);

        let mut roles = BTreeSet::new();
        let mut permissions = BTreeSet::new();

        for role in array(profile, "roles") {
            if let Some(name) = name_of(role) {
                roles.insert(normalize_role(name));
            }
            for permission in array(role, "permissions") {
                if let Some(name) = name_of(permission) {
                    permissions.insert(name.to_string());
                }
            }
        }
        for permission in array(profile, "permissions") {
            if let Some(name) = name_of(permission) {
                permissions.insert(name.to_string());
            }
        }
        for authority in array(profile, "authorities") {
            match name_of(authority).or_else(|| authority.get("authority").and_then(Value::as_str)) {
                Some(name) if name.starts_with("ROLE_") => {
                    roles.insert(normalize_role(name));
                }
                Some(name) => {
                    permissions.insert(name.to_string());
                }
                None => {}
            }
        }

        Self {
            username,
            roles,
            permissions,
            from_config: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(ADMIN_ROLE)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&normalize_role(role))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn allows(&self, gate: &Gate) -> bool {
        if self.is_admin() {
            return true;
        }
        match gate {
            Gate::Open => true,
            Gate::Role(role) => self.has_role(role),
            Gate::Permission(permission) => self.has_permission(permission),
            Gate::Any(gates) => gates.iter().any(|g| self.allows(g)),
            Gate::All(gates) => gates.iter().all(|g| self.allows(g)),
        }
    }

    /// `Ok(())` when allowed, `AdminError::Forbidden` naming `what` otherwise
    pub fn require(&self, gate: &Gate, what: &str) -> Result<()> {
        if self.allows(gate) {
            Ok(())
        } else {
            Err(AdminError::Forbidden(format!(
                "{} requires {}",
                what, gate
            )))
        }
    }
}

/// An access requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Anyone authenticated
    Open,
    Role(String),
    Permission(String),
    Any(Vec<Gate>),
    All(Vec<Gate>),
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |gates: &[Gate], sep: &str| {
            gates
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self {
            Gate::Open => write!(f, "nothing"),
            Gate::Role(role) => write!(f, "role {}", role),
            Gate::Permission(permission) => write!(f, "permission '{}'", permission),
            Gate::Any(gates) => write!(f, "({})", join(gates, " or ")),
            Gate::All(gates) => write!(f, "({})", join(gates, " and ")),
        }
    }
}

/// Ask the backend who we are, falling back to configured claims
pub async fn load_claims(client: &RestClient, config: &Config) -> Result<Claims> {
    match client.get_json(&config.api.me_endpoint, &[]).await {
        Ok(profile) => Ok(Claims::from_profile(&profile)),
        Err(e) if !config.identity.is_empty() => {
            warn!(
                "Could not load claims from {} ({}); using configured identity",
                config.api.me_endpoint, e
            );
            Ok(Claims::from_config(config))
        }
        Err(e) => Err(e.into()),
    }
}

fn array<'a>(value: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn name_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("name").and_then(Value::as_str),
        _ => None,
    }
}

fn normalize_role(role: &str) -> String {
    role.trim().trim_start_matches("ROLE_").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(roles: &[&str], permissions: &[&str]) -> Claims {
        Claims::new(
            Some("ada".to_string()),
            roles.iter().copied(),
            permissions.iter().copied(),
        )
    }

    #[test]
    fn test_admin_passes_everything() {
        let admin = claims(&["admin"], &[]);
        assert!(admin.allows(&Gate::Permission("bot:write".to_string())));
        assert!(admin.allows(&Gate::All(vec![
            Gate::Role("EDITOR".to_string()),
            Gate::Role("OPERATOR".to_string()),
        ])));
    }

    #[test]
    fn test_any_and_all() {
        let editor = claims(&["EDITOR"], &["blog:read"]);
        let any = Gate::Any(vec![
            Gate::Role("OPERATOR".to_string()),
            Gate::Permission("blog:read".to_string()),
        ]);
        let all = Gate::All(vec![
            Gate::Role("EDITOR".to_string()),
            Gate::Permission("blog:publish".to_string()),
        ]);
        assert!(editor.allows(&any));
        assert!(!editor.allows(&all));
        assert!(editor.allows(&Gate::Open));
        assert!(editor.has_role("ROLE_editor"));
    }

    #[test]
    fn test_require_reports_gate() {
        let err = claims(&[], &[])
            .require(&Gate::Permission("user:read".to_string()), "listing users")
            .unwrap_err();
        match err {
            AdminError::Forbidden(msg) => {
                assert_eq!(msg, "listing users requires permission 'user:read'")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_profile_shapes() {
        let profile = json!({
            "username": "grace",
            "roles": [
                "ROLE_operator",
                {"id": 1, "name": "EDITOR", "permissions": [{"name": "blog:read"}, "blog:write"]}
            ],
            "permissions": ["bot:read"],
            "authorities": [{"authority": "ROLE_AUDITOR"}, "user:read"]
        });
        let claims = Claims::from_profile(&profile);
        assert_eq!(claims.username.as_deref(), Some("grace"));
        assert_eq!(
            claims.roles.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["AUDITOR", "EDITOR", "OPERATOR"]
        );
        for permission in ["blog:read", "blog:write", "bot:read", "user:read"] {
            assert!(claims.has_permission(permission), "{permission}");
        }
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.identity.username = Some("ops".to_string());
        config.identity.roles = vec!["operator".to_string()];
        let claims = Claims::from_config(&config);
        assert!(claims.from_config);
        assert!(claims.has_role("OPERATOR"));
    }
}
