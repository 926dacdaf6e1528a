use std::sync::Arc;

use iocraft::prelude::*;
use parking_lot::Mutex;
use serde_json::json;

use super::ls::collect_filters;
use super::{AppContext, CommandOutput, for_resource};
use crate::api::{Entity, Resource};
use crate::error::{AdminError, Result};
use crate::select::{MultiSelect, OptionAccessors, SelectMode, SelectOptions, Selected};
use crate::tui::{OptionPicker, PickerExit, SharedControl};

/// Options for `adminctl pick`
#[derive(Debug, Clone)]
pub struct PickOptions {
    pub resource: Resource,
    pub single: bool,
    /// Initial search text
    pub search: Option<String>,
    /// Raw `key=value` arguments narrowing the options
    pub filters: Vec<String>,
    pub json: bool,
}

/// Pick records interactively and print their identities
pub async fn cmd_pick(opts: PickOptions) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.authorize(opts.resource).await?;
    for_resource!(opts.resource, pick_records(&ctx, &opts))
}

async fn pick_records<T: Entity>(ctx: &AppContext, opts: &PickOptions) -> Result<()> {
    let mode = if opts.single {
        SelectMode::Single
    } else {
        SelectMode::Multiple
    };
    let mut settings = SelectOptions::from_config(&ctx.config.select)
        .mode(mode)
        .placeholder(format!(
            "Search {}...",
            opts.resource.display_name().to_lowercase()
        ));
    if let Some(seed) = &opts.search {
        settings = settings.search_seed(seed.clone());
    }

    let query = ctx
        .query_options(opts.resource)
        .filters(collect_filters(None, &opts.filters)?);

    let notifier = ctx.notifier.clone();
    let control = MultiSelect::<T>::new(
        ctx.queries.clone(),
        ctx.api.clone(),
        query,
        OptionAccessors::from_entity(),
        settings,
    )
    .on_change(move |selection| {
        if mode == SelectMode::Multiple {
            notifier.info(format!("{} selected", selection.len()));
        }
    });

    let control = Arc::new(Mutex::new(control));
    let shared: SharedControl = control.clone();
    let exit = Arc::new(Mutex::new(PickerExit::Cancelled));
    let title = format!("Pick {}", opts.resource.display_name().to_lowercase());

    let result = element!(OptionPicker(
        title: title,
        control: Some(shared),
        notifier: Some(ctx.notifier.clone()),
        exit: Some(exit.clone()),
    ))
    .fullscreen()
    .await
    .map_err(|e| AdminError::Other(format!("TUI error: {e}")));

    ctx.notifier.shutdown();
    ctx.queries.shutdown();
    result?;

    if *exit.lock() == PickerExit::Cancelled {
        return Err(AdminError::Other("selection cancelled".to_string()));
    }

    let control = control.lock();
    print_selection(opts.resource, control.selection(), control.accessors(), opts.json)
}

fn print_selection<T: Entity>(
    resource: Resource,
    selection: &[Selected<T>],
    accessors: &OptionAccessors<T>,
    json: bool,
) -> Result<()> {
    let selected: Vec<_> = selection
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "label": s.label(accessors),
                "record": s.entity,
            })
        })
        .collect();
    let text = selection
        .iter()
        .map(|s| s.id.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    CommandOutput::new(json!({
        "resource": resource.to_string(),
        "selected": selected,
    }))
    .with_text(text)
    .print(json)
}
