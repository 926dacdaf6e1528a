use owo_colors::OwoColorize;
use serde_json::json;

use super::{AppContext, CommandOutput};
use crate::api::Resource;
use crate::error::Result;
use crate::query::FilterMap;
use crate::storage::filters_key;

/// Show or clear the filter set saved for a resource
pub async fn cmd_filters(resource: Resource, clear: bool, json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.authorize(resource).await?;
    let store = &ctx.store;
    let key = filters_key(resource.endpoint());

    if clear {
        let removed = store.remove(&key)?;
        let text = if removed {
            format!("Cleared saved filters for {}", resource.to_string().cyan())
        } else {
            format!("No saved filters for {}", resource.to_string().cyan())
        };
        return CommandOutput::new(json!({
            "action": "filters_clear",
            "resource": resource.to_string(),
            "removed": removed,
        }))
        .with_text(text)
        .print(json);
    }

    let filters: FilterMap = store.get(&key, FilterMap::new());
    let mut text = format!("{} {}\n", "Saved filters for".dimmed(), resource.to_string().cyan());
    if filters.is_empty() {
        text.push_str(&format!("  {}", "none".dimmed()));
    } else {
        for (name, value) in filters.to_query_pairs() {
            text.push_str(&format!("  {} = {}\n", name, value));
        }
    }

    CommandOutput::new(json!({
        "resource": resource.to_string(),
        "key": key,
        "filters": filters,
    }))
    .with_text(text.trim_end().to_string())
    .print(json)
}
