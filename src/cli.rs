use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::Resource;

#[derive(Parser)]
#[command(name = "adminctl")]
#[command(about = "Terminal console for the admin REST API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of a resource
    Ls {
        /// Resource: bots, posts, users, roles, permissions, services, notifications
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Page size (default: query.page_size from config)
        #[arg(short, long)]
        size: Option<u32>,

        /// Free-text search
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Filter as key=value or key=a,b (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Restore saved filters for this resource and save the ones given
        #[arg(long)]
        persist: bool,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,

        /// JSON file shown in place of a failed response
        #[arg(long, value_name = "FILE")]
        fallback: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record
    Show {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Record identity
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick records interactively and print their identities
    Pick {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Choose exactly one record
        #[arg(long)]
        single: bool,

        /// Initial search text
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Filter as key=value or key=a,b (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current user's roles, permissions and readable resources
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or clear the filters saved with `ls --persist`
    Filters {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Forget the saved filters
        #[arg(long)]
        clear: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.base_url, api.token, query.page_size, ...)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (api.base_url, api.token, query.page_size, ...)
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            LsOptions, PickOptions, cmd_config_get, cmd_config_set, cmd_config_show, cmd_filters,
            cmd_ls, cmd_pick, cmd_show, cmd_whoami,
        };

        match self {
            Commands::Ls {
                resource,
                page,
                size,
                search,
                filters,
                persist,
                no_cache,
                fallback,
                json,
            } => {
                cmd_ls(LsOptions {
                    resource,
                    page,
                    size,
                    search,
                    filters,
                    persist,
                    no_cache,
                    fallback,
                    json,
                })
                .await
            }

            Commands::Show { resource, id, json } => cmd_show(resource, &id, json).await,

            Commands::Pick {
                resource,
                single,
                search,
                filters,
                json,
            } => {
                cmd_pick(PickOptions {
                    resource,
                    single,
                    search,
                    filters,
                    json,
                })
                .await
            }

            Commands::Whoami { json } => cmd_whoami(json).await,

            Commands::Filters {
                resource,
                clear,
                json,
            } => cmd_filters(resource, clear, json).await,

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            },
        }
    }
}

fn parse_resource(s: &str) -> Result<Resource, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid resource. Must be one of: {}",
            Resource::NAMES.join(", ")
        )
    })
}
