use crate::access::Gate;
use crate::enum_display_fromstr;
use crate::error::AdminError;
use crate::query::KeyPart;

/// List endpoints exposed by the admin API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Bots,
    Posts,
    Users,
    Roles,
    Permissions,
    Services,
    Notifications,
}

enum_display_fromstr!(
    Resource,
    AdminError::UnknownResource,
    {
        Bots => "bots",
        Posts => "posts",
        Users => "users",
        Roles => "roles",
        Permissions => "permissions",
        Services => "services",
        Notifications => "notifications",
    }
);

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Bots,
        Resource::Posts,
        Resource::Users,
        Resource::Roles,
        Resource::Permissions,
        Resource::Services,
        Resource::Notifications,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Bots => "/api/bots",
            Resource::Posts => "/api/blog/posts",
            Resource::Users => "/api/users",
            Resource::Roles => "/api/roles",
            Resource::Permissions => "/api/permissions",
            Resource::Services => "/api/services",
            Resource::Notifications => "/api/notifications",
        }
    }

    /// Detail endpoint for one record
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint(), id)
    }

    /// Cache key prefix shared by every page of this resource
    pub fn cache_key(&self) -> Vec<KeyPart> {
        vec![self.to_string().into()]
    }

    /// Roles, permissions and services come back as plain arrays
    pub fn is_paginated(&self) -> bool {
        !matches!(
            self,
            Resource::Roles | Resource::Permissions | Resource::Services
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::Bots => "Bots",
            Resource::Posts => "Blog posts",
            Resource::Users => "Users",
            Resource::Roles => "Roles",
            Resource::Permissions => "Permissions",
            Resource::Services => "Services",
            Resource::Notifications => "Notifications",
        }
    }

    /// What the caller must hold to read this resource
    pub fn gate(&self) -> Gate {
        match self {
            Resource::Bots => Gate::Permission("bot:read".to_string()),
            Resource::Posts => Gate::Any(vec![
                Gate::Role("EDITOR".to_string()),
                Gate::Permission("blog:read".to_string()),
            ]),
            Resource::Users => Gate::Permission("user:read".to_string()),
            Resource::Roles => Gate::Permission("role:read".to_string()),
            Resource::Permissions => Gate::Permission("permission:read".to_string()),
            Resource::Services => Gate::Any(vec![
                Gate::Role("OPERATOR".to_string()),
                Gate::Permission("service:read".to_string()),
            ]),
            Resource::Notifications => Gate::Open,
        }
    }
}
