use owo_colors::OwoColorize;
use serde_json::{Value, json};

use super::{AppContext, CommandOutput, for_resource};
use crate::api::{Entity, Resource};
use crate::error::{AdminError, Result};

/// Display one record
pub async fn cmd_show(resource: Resource, id: &str, json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.authorize(resource).await?;
    for_resource!(resource, show_record(&ctx, resource, id, json))
}

async fn show_record<T: Entity>(
    ctx: &AppContext,
    resource: Resource,
    id: &str,
    json: bool,
) -> Result<()> {
    let record: T = ctx
        .api
        .get_one(&resource.item_path(id))
        .await
        .map_err(|e| match AdminError::from(e) {
            AdminError::NotFound(_) => AdminError::NotFound(format!("{} {}", resource, id)),
            other => other,
        })?;

    let value = serde_json::to_value(&record)?;
    let json_output = json!({
        "resource": resource.to_string(),
        "record": value,
    });

    CommandOutput::new(json_output)
        .with_text(format_record(&record, &value))
        .print(json)
}

/// Title line, the table columns as fields, then any remaining scalar fields
fn format_record<T: Entity>(record: &T, value: &Value) -> String {
    let mut out = format!("{} {}\n", record.id().to_string().cyan(), record.label().bold());

    let columns = T::columns();
    let width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    for (column, cell) in columns.iter().zip(record.row()) {
        out.push_str(&format!("  {:<width$}  {}\n", column.dimmed(), cell, width = width));
    }

    if let Value::Object(map) = value {
        let extra: Vec<String> = map
            .iter()
            .filter(|(key, _)| !covered(key, columns))
            .filter_map(|(key, v)| match v {
                Value::String(s) => Some(format!("  {}: {}", key.dimmed(), s)),
                Value::Number(n) => Some(format!("  {}: {}", key.dimmed(), n)),
                Value::Bool(b) => Some(format!("  {}: {}", key.dimmed(), b)),
                _ => None,
            })
            .collect();
        if !extra.is_empty() {
            out.push('\n');
            out.push_str(&extra.join("\n"));
        }
    }

    out.trim_end().to_string()
}

/// A JSON field already shown through a table column
fn covered(key: &str, columns: &[&str]) -> bool {
    let key = key.to_lowercase();
    columns
        .iter()
        .any(|c| c.to_lowercase().replace(' ', "") == key)
}
