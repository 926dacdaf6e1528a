use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{AppContext, CommandOutput, for_resource, render_table};
use crate::api::{Entity, Resource};
use crate::error::{AdminError, Result};
use crate::query::{FilterMap, PageResult, PaginatedQuery, SEARCH_FILTER, parse_filter};

/// Options for `adminctl ls`
#[derive(Debug, Clone)]
pub struct LsOptions {
    pub resource: Resource,
    /// Zero-based page index
    pub page: u32,
    pub size: Option<u32>,
    pub search: Option<String>,
    /// Raw `key=value` arguments
    pub filters: Vec<String>,
    /// Restore the saved filter set and save any filters given here
    pub persist: bool,
    pub no_cache: bool,
    /// JSON payload shown when the backend cannot be reached
    pub fallback: Option<PathBuf>,
    pub json: bool,
}

/// List one page of a resource
pub async fn cmd_ls(opts: LsOptions) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.authorize(opts.resource).await?;
    for_resource!(opts.resource, list_page(&ctx, &opts))
}

/// Filters given on the command line, `--search` included
pub(crate) fn collect_filters(search: Option<&str>, args: &[String]) -> Result<FilterMap> {
    let mut filters = FilterMap::new();
    for arg in args {
        let (key, value) = parse_filter(arg)?;
        filters.set(key, value);
    }
    if let Some(search) = search {
        filters.set(SEARCH_FILTER, search);
    }
    Ok(filters)
}

async fn list_page<T: Entity>(ctx: &AppContext, opts: &LsOptions) -> Result<()> {
    let filters = collect_filters(opts.search.as_deref(), &opts.filters)?;

    // One-shot command: nothing to debounce
    let mut options = ctx
        .query_options(opts.resource)
        .debounce(Duration::ZERO)
        .persist_filters(opts.persist);
    if let Some(size) = opts.size {
        options = options.page_size(size);
    }
    if opts.no_cache {
        options = options.without_cache();
    }
    if let Some(path) = &opts.fallback {
        let raw = fs::read_to_string(path)?;
        options = options.mock_data(serde_json::from_str(&raw)?);
    }

    let fetcher = ctx.api.clone();
    let mut query: PaginatedQuery<T> = PaginatedQuery::new(
        ctx.queries.clone(),
        fetcher,
        options,
        Some(ctx.store.clone()),
    );
    if !filters.is_empty() {
        query.set_filters(filters);
    }
    // Before the first load this only moves the index
    query.set_page(opts.page);

    let state = query.fetch().await.clone();
    let page = match (state.data, state.error) {
        (Some(page), _) => page,
        (None, Some(error)) => return Err(AdminError::from(error)),
        (None, None) => PageResult::empty(query.page(), query.page_size()),
    };

    let applied = query.applied_filters();
    let json_output = json!({
        "resource": opts.resource.to_string(),
        "page": page.page,
        "size": page.size,
        "total_elements": page.total_elements,
        "total_pages": page.total_pages,
        "last": page.is_last(),
        "filters": applied,
        "fallback": state.from_fallback,
        "items": page.items,
    });

    let mut text = String::new();
    if page.items.is_empty() {
        text.push_str(&format!(
            "{}",
            format!("No {} found", opts.resource.display_name().to_lowercase()).dimmed()
        ));
    } else {
        text.push_str(&render_table(&page.items));
    }
    text.push('\n');
    text.push_str(&page_footer(&page));
    if !applied.is_empty() {
        text.push_str(&format!("\n{} {}", "filters:".dimmed(), applied));
    }
    if state.from_fallback {
        text.push_str(&format!(
            "\n{}",
            "backend unreachable; showing fallback data".yellow()
        ));
    }

    CommandOutput::new(json_output)
        .with_text(text)
        .print(opts.json)
}

/// `page X/Y (N total)`, one-based
pub(crate) fn page_footer<T>(page: &PageResult<T>) -> String {
    format!(
        "page {}/{} ({} total)",
        page.page.saturating_add(1),
        page.total_pages.max(1),
        page.total_elements
    )
}
