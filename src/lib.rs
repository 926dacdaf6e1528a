pub mod access;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod macros;
pub mod notify;
pub mod query;
pub mod select;
pub mod storage;
pub mod timer;
pub mod tui;

pub use access::{Claims, Gate};
pub use api::{Entity, Resource, RestClient};
pub use config::Config;
pub use error::{AdminError, QueryError, Result};
pub use notify::{Notifier, Toast, ToastLevel};
pub use query::{
    CachePolicy, FetchOutcome, FetchRequest, Fetcher, FilterMap, FilterValue, PageResult,
    PaginatedQuery, QueryClient, QueryKey, QueryOptions, QueryState,
};
pub use select::{
    MultiSelect, OptionAccessors, OptionId, SearchableSelect, SelectMode, SelectOptions,
    SelectValue, Selected,
};
pub use storage::{LocalStore, PersistedCell};
pub use timer::{Debouncer, TimerHandle};
