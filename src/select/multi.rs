//! Incremental multi-select control.
//!
//! Options are loaded page by page through a [`PaginatedQuery`] and collected
//! into an [`AccumulatedOptions`] set. Moving toward the bottom of the list
//! requests the next page; typing a search restarts from page 0.
//!
//! Like the query it wraps, the control never awaits on its own: operations
//! that need data return a [`FetchRequest`] for the caller to run, and the
//! outcome is folded back with [`MultiSelect::apply`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::SelectConfig;
use crate::error::QueryError;
use crate::query::{
    FetchOutcome, FetchRequest, Fetcher, FilterValue, PaginatedQuery, QueryClient, QueryOptions,
    SEARCH_FILTER,
};
use crate::timer::Debouncer;

use super::highlight::match_indices;
use super::options::AccumulatedOptions;
use super::value::{OptionAccessors, OptionId, SelectValue, Selected};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Choosing an option replaces the selection and closes the control
    Single,
    #[default]
    Multiple,
}

/// Display and behaviour settings for a select control
#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub mode: SelectMode,
    pub placeholder: String,
    /// Option rows visible at once
    pub max_height: usize,
    pub show_tags: bool,
    pub show_checkboxes: bool,
    /// Rows left below the viewport at which the next page is requested
    pub scroll_threshold: usize,
    pub search_debounce: Duration,
    /// Search text applied when the control first loads
    pub search_seed: Option<String>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            mode: SelectMode::Multiple,
            placeholder: "Select...".to_string(),
            max_height: 10,
            show_tags: true,
            show_checkboxes: true,
            scroll_threshold: 2,
            search_debounce: SEARCH_DEBOUNCE,
            search_seed: None,
        }
    }
}

impl SelectOptions {
    pub fn from_config(config: &SelectConfig) -> Self {
        Self {
            max_height: config.max_height.max(1) as usize,
            scroll_threshold: config.scroll_threshold as usize,
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn max_height(mut self, rows: usize) -> Self {
        self.max_height = rows.max(1);
        self
    }

    pub fn show_tags(mut self, show: bool) -> Self {
        self.show_tags = show;
        self
    }

    pub fn show_checkboxes(mut self, show: bool) -> Self {
        self.show_checkboxes = show;
        self
    }

    pub fn scroll_threshold(mut self, rows: usize) -> Self {
        self.scroll_threshold = rows;
        self
    }

    pub fn search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn search_seed(mut self, seed: impl Into<String>) -> Self {
        self.search_seed = Some(seed.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Loading { page: u32 },
    Loaded { page: u32 },
    /// The last fetch failed; options and selection are untouched
    Failed,
}

/// A visible option, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRow {
    pub index: usize,
    pub id: OptionId,
    pub label: String,
    pub selected: bool,
    pub highlighted: bool,
    /// Character positions in `label` matching the search text
    pub matches: Vec<usize>,
}

type ChangeCallback<T> = Box<dyn FnMut(&[Selected<T>]) + Send + Sync>;

pub struct MultiSelect<T> {
    query: PaginatedQuery<T>,
    accessors: OptionAccessors<T>,
    settings: SelectOptions,
    options: AccumulatedOptions<T>,
    selection: Vec<Selected<T>>,
    phase: Phase,
    search: Debouncer<String>,
    cursor: usize,
    scroll: usize,
    on_change: Option<ChangeCallback<T>>,
}

impl<T> MultiSelect<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        client: Arc<QueryClient>,
        fetcher: Arc<dyn Fetcher>,
        mut query: QueryOptions,
        accessors: OptionAccessors<T>,
        settings: SelectOptions,
    ) -> Self {
        // The control debounces search itself
        query.debounce = Duration::ZERO;
        query.persist_filters = false;
        query.initial_page = 0;

        let seed = settings.search_seed.clone().unwrap_or_default();
        if !seed.is_empty() {
            query.initial_filters.set(SEARCH_FILTER, seed.clone());
        }

        Self {
            query: PaginatedQuery::new(client, fetcher, query, None),
            accessors,
            search: Debouncer::new(seed, settings.search_debounce),
            settings,
            options: AccumulatedOptions::new(),
            selection: Vec::new(),
            phase: Phase::Closed,
            cursor: 0,
            scroll: 0,
            on_change: None,
        }
    }

    /// Called with the full selection after every user-driven change
    pub fn on_change(mut self, callback: impl FnMut(&[Selected<T>]) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn settings(&self) -> &SelectOptions {
        &self.settings
    }

    pub fn accessors(&self) -> &OptionAccessors<T> {
        &self.accessors
    }

    pub fn query(&self) -> &PaginatedQuery<T> {
        &self.query
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn options(&self) -> &AccumulatedOptions<T> {
        &self.options
    }

    pub fn selection(&self) -> &[Selected<T>] {
        &self.selection
    }

    pub fn selected_ids(&self) -> Vec<OptionId> {
        self.selection.iter().map(|s| s.id.clone()).collect()
    }

    pub fn is_selected(&self, id: &OptionId) -> bool {
        self.selection.iter().any(|s| &s.id == id)
    }

    /// Labels of the selected options, for tag rendering
    pub fn tags(&self) -> Vec<String> {
        self.selection
            .iter()
            .map(|s| s.label(&self.accessors))
            .collect()
    }

    /// Raw text in the search box
    pub fn search_text(&self) -> &str {
        self.search.latest()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text rendered in place of the dropdown when the last fetch failed
    pub fn error_text(&self) -> Option<String> {
        if self.phase != Phase::Failed {
            return None;
        }
        self.query.error().map(|e| format!("Error loading options: {}", e))
    }

    /// Replace the selection without notifying the change callback
    pub fn set_value(&mut self, values: Vec<SelectValue<T>>) {
        let mut selection: Vec<Selected<T>> = Vec::new();
        for value in values {
            let selected = Selected::from_value(value, &self.accessors);
            if !selection.contains(&selected) {
                selection.push(selected);
            }
        }
        if self.settings.mode == SelectMode::Single {
            selection.truncate(1);
        }
        self.selection = selection;
        self.resolve_selection();
    }

    /// Open the dropdown. Returns the fetch to run, if any.
    ///
    /// The first open loads page 0. Reopening refetches only when the last
    /// fetch failed or the loaded options belong to an earlier search.
    pub fn open(&mut self) -> Option<FetchRequest> {
        if self.is_open() {
            return None;
        }

        let stale_search = !self.query.needs_initial_load()
            && self.query.applied_filters().search() != self.search.latest().as_str();

        let request = if stale_search {
            let text = self.search.latest().clone();
            self.query.set_search(text);
            self.query.poll_filters()
        } else if self.query.needs_initial_load() || self.query.error().is_some() {
            Some(self.query.begin())
        } else {
            None
        };

        self.phase = match &request {
            Some(request) => Phase::Loading {
                page: request.page(),
            },
            None => Phase::Loaded {
                page: self.query.page(),
            },
        };
        request
    }

    /// Close the dropdown, clearing the search box. Options and selection stay.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.search.reset(String::new());
        self.search.take_changed();
    }

    /// Type into the search box
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search.update(text.into());
    }

    /// Pick up a settled search. Returns the page 0 fetch it causes.
    pub fn poll(&mut self) -> Option<FetchRequest> {
        let text = self.search.take_changed()?;
        if !self.is_open() {
            return None;
        }
        if self.query.applied_filters().search() == text {
            return None;
        }
        debug!("select search settled on {:?}", text);

        self.query.set_search(text);
        let request = self.query.poll_filters()?;
        self.phase = Phase::Loading { page: 0 };
        self.cursor = 0;
        self.scroll = 0;
        Some(request)
    }

    /// Wait for the search debounce to settle, then [`poll`](Self::poll)
    pub async fn settle_search(&mut self) -> Option<FetchRequest> {
        while self.search.is_pending() {
            tokio::time::sleep(self.search.delay()).await;
        }
        self.poll()
    }

    /// Apply the typed search immediately
    pub fn flush_search(&mut self) -> Option<FetchRequest> {
        self.search.flush();
        self.poll()
    }

    /// Fold a finished fetch in. Returns false for superseded outcomes.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if !self.query.apply(outcome) {
            return false;
        }

        if self.query.error().is_some() {
            if self.is_open() {
                self.phase = Phase::Failed;
            }
            return true;
        }

        let page = match self.query.data() {
            Some(data) => {
                self.options.merge(data.page, &data.items, &self.accessors);
                data.page
            }
            None => 0,
        };
        if page == 0 {
            self.cursor = 0;
            self.scroll = 0;
        }
        self.clamp_cursor();
        self.resolve_selection();

        if self.is_open() {
            self.phase = Phase::Loaded { page };
        }
        true
    }

    /// Run a fetch to completion and apply it
    pub async fn run(&mut self, request: FetchRequest) -> bool {
        let outcome = request.run().await;
        self.apply(outcome)
    }

    /// Request the next page when the viewport is near the bottom
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        if !matches!(self.phase, Phase::Loaded { .. }) || self.query.is_loading() {
            return None;
        }
        if self.rows_below_viewport() > self.settings.scroll_threshold {
            return None;
        }
        let request = self.query.next_page()?;
        self.phase = Phase::Loading {
            page: request.page(),
        };
        Some(request)
    }

    pub fn move_down(&mut self) -> Option<FetchRequest> {
        if self.options.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1).min(self.options.len() - 1);
        self.ensure_cursor_visible();
        self.load_more()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) -> Option<FetchRequest> {
        if self.options.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + self.settings.max_height).min(self.options.len() - 1);
        self.ensure_cursor_visible();
        self.load_more()
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.settings.max_height);
        self.ensure_cursor_visible();
    }

    /// Scroll the viewport by `rows` without moving past either end
    pub fn scroll_by(&mut self, rows: isize) -> Option<FetchRequest> {
        let max_scroll = self.options.len().saturating_sub(self.settings.max_height);
        self.scroll = self.scroll.saturating_add_signed(rows).min(max_scroll);
        let bottom = self.scroll + self.settings.max_height;
        if self.cursor < self.scroll {
            self.cursor = self.scroll;
        } else if self.cursor >= bottom {
            self.cursor = bottom.saturating_sub(1);
        }
        self.clamp_cursor();
        self.load_more()
    }

    /// Options loaded but below the visible window
    pub fn rows_below_viewport(&self) -> usize {
        self.options
            .len()
            .saturating_sub(self.scroll + self.settings.max_height)
    }

    /// Toggle (multiple) or choose (single) the option under the cursor
    pub fn toggle_highlighted(&mut self) {
        if let Some((id, _)) = self.options.get_index(self.cursor) {
            let id = id.clone();
            self.toggle_id(&id);
        }
    }

    /// Toggle or choose a loaded option by identity. Unknown ids are ignored.
    pub fn toggle_id(&mut self, id: &OptionId) {
        if let Some(item) = self.options.get(id).cloned() {
            self.select(item);
        }
    }

    /// In single mode replace the selection and close; in multiple mode toggle
    /// membership
    pub fn select(&mut self, item: T) {
        let selected = Selected::from_entity(item, &self.accessors);
        match self.settings.mode {
            SelectMode::Single => {
                self.selection = vec![selected];
                self.close();
            }
            SelectMode::Multiple => match self.selection.iter().position(|s| *s == selected) {
                Some(index) => {
                    self.selection.remove(index);
                }
                None => self.selection.push(selected),
            },
        }
        self.notify();
    }

    pub fn remove(&mut self, id: &OptionId) -> bool {
        let before = self.selection.len();
        self.selection.retain(|s| &s.id != id);
        let removed = self.selection.len() != before;
        if removed {
            self.notify();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.notify();
        }
    }

    /// The visible window of options
    pub fn rows(&self) -> Vec<OptionRow> {
        let search = self.search.latest();
        self.options
            .ids()
            .iter()
            .zip(self.options.items())
            .enumerate()
            .skip(self.scroll)
            .take(self.settings.max_height)
            .map(|(index, (id, item))| {
                let label = self.accessors.label(item);
                OptionRow {
                    index,
                    id: id.clone(),
                    matches: match_indices(&label, search),
                    label,
                    selected: self.is_selected(id),
                    highlighted: index == self.cursor,
                }
            })
            .collect()
    }

    /// Filters other than search can narrow the option source
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Option<FetchRequest> {
        self.query.set_filter(key, value);
        let request = self.query.poll_filters()?;
        if self.is_open() {
            self.phase = Phase::Loading { page: 0 };
        }
        Some(request)
    }

    pub fn last_error(&self) -> Option<&QueryError> {
        self.query.error()
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.selection);
        }
    }

    fn resolve_selection(&mut self) {
        for selected in self.selection.iter_mut().filter(|s| !s.is_resolved()) {
            if let Some(item) = self.options.get(&selected.id) {
                selected.entity = Some(item.clone());
            }
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.options.len().saturating_sub(1));
    }

    fn ensure_cursor_visible(&mut self) {
        let height = self.settings.max_height;
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

impl<T> fmt::Debug for MultiSelect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("phase", &self.phase)
            .field("mode", &self.settings.mode)
            .field("options", &self.options.ids())
            .field("selection", &self.selection.iter().map(|s| &s.id).collect::<Vec<_>>())
            .field("cursor", &self.cursor)
            .field("scroll", &self.scroll)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::{MockFetcher, Row};
    use parking_lot::Mutex;
    use serde_json::json;

    fn accessors() -> OptionAccessors<Row> {
        OptionAccessors::new(|r: &Row| r.name.clone(), |r: &Row| r.id.into())
    }

    fn control(fetcher: &Arc<MockFetcher>, settings: SelectOptions) -> MultiSelect<Row> {
        MultiSelect::new(
            QueryClient::new(),
            fetcher.clone(),
            QueryOptions::new("/api/users", vec!["users".into()]),
            accessors(),
            settings,
        )
    }

    async fn opened(fetcher: &Arc<MockFetcher>, settings: SelectOptions) -> MultiSelect<Row> {
        let mut select = control(fetcher, settings);
        let request = select.open().expect("first open loads page 0");
        assert_eq!(select.phase(), Phase::Loading { page: 0 });
        assert!(select.run(request).await);
        select
    }

    fn ids(select: &MultiSelect<Row>) -> Vec<i64> {
        select.options().items().iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_single_page_does_not_fetch_on_scroll() {
        let fetcher = MockFetcher::flat(json!({
            "content": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}],
            "totalElements": 2,
            "totalPages": 1,
            "number": 0,
            "size": 10
        }));
        let mut select = opened(&fetcher, SelectOptions::default()).await;

        let labels: Vec<&str> = select.options().items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert!(select.query().data().unwrap().last);
        assert_eq!(select.phase(), Phase::Loaded { page: 0 });

        assert!(select.move_down().is_none());
        assert!(select.load_more().is_none());
        assert!(select.scroll_by(5).is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_multi_toggle_by_identity() {
        let fetcher = MockFetcher::numbered(3);
        let mut select = opened(&fetcher, SelectOptions::default()).await;

        select.toggle_id(&OptionId::Int(2));
        assert_eq!(select.selected_ids(), vec![OptionId::Int(2)]);
        assert_eq!(select.selection()[0].entity.as_ref().unwrap().name, "Row 2");
        assert!(select.is_open());

        select.toggle_id(&OptionId::Int(2));
        assert!(select.selection().is_empty());
    }

    #[tokio::test]
    async fn test_single_mode_closes_on_select() {
        let fetcher = MockFetcher::numbered(3);
        let mut select = opened(&fetcher, SelectOptions::default().mode(SelectMode::Single)).await;

        select.toggle_id(&OptionId::Int(1));
        select.open();
        select.toggle_id(&OptionId::Int(3));
        assert_eq!(select.selected_ids(), vec![OptionId::Int(3)]);
        assert!(!select.is_open());
    }

    #[tokio::test]
    async fn test_scrolling_appends_next_page() {
        let fetcher = MockFetcher::numbered(25);
        let mut select = opened(&fetcher, SelectOptions::default().max_height(5)).await;
        assert_eq!(select.options().len(), 10);

        // Rows 0..5 visible, 5 below: above the threshold
        assert!(select.load_more().is_none());

        let mut request = None;
        for _ in 0..9 {
            if let Some(r) = select.move_down() {
                request = Some(r);
                break;
            }
        }
        let request = request.expect("nearing the bottom requests page 1");
        assert_eq!(request.page(), 1);
        assert!(select.is_loading());
        assert!(select.move_down().is_none(), "no second fetch while one is in flight");

        select.run(request).await;
        assert_eq!(ids(&select), (1..=20).collect::<Vec<_>>());
        assert_eq!(select.phase(), Phase::Loaded { page: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_replaces_options() {
        let fetcher = MockFetcher::numbered(30);
        let mut select = opened(&fetcher, SelectOptions::default()).await;
        let request = select.page_down().unwrap();
        select.run(request).await;
        assert_eq!(select.options().len(), 20);

        select.set_search("2");
        select.set_search("25");
        assert!(select.poll().is_none());

        let request = select.settle_search().await.expect("settled search fetches");
        assert_eq!(request.page(), 0);
        select.run(request).await;
        assert_eq!(ids(&select), vec![25]);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(select.rows()[0].matches, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_error_keeps_options_and_selection() {
        let fetcher = MockFetcher::numbered(30);
        let mut select = opened(&fetcher, SelectOptions::default()).await;
        select.toggle_id(&OptionId::Int(1));

        fetcher.fail_with(QueryError::with_status(500, "boom"));
        let request = select.page_down().unwrap();
        select.run(request).await;

        assert_eq!(select.phase(), Phase::Failed);
        assert_eq!(select.options().len(), 10);
        assert_eq!(select.selected_ids(), vec![OptionId::Int(1)]);
        assert!(select.error_text().unwrap().contains("boom"));
        assert!(select.page_down().is_none(), "no automatic retry");

        fetcher.recover();
        select.close();
        let request = select.open().expect("reopening retries");
        select.run(request).await;
        assert_eq!(select.options().len(), 20);
        assert!(select.error_text().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_clears_search_and_reopen_restores_list() {
        let fetcher = MockFetcher::numbered(30);
        let mut select = opened(&fetcher, SelectOptions::default()).await;

        select.set_search("7");
        let request = select.settle_search().await.unwrap();
        select.run(request).await;
        assert_eq!(ids(&select), vec![7, 17, 27]);

        select.toggle_id(&OptionId::Int(17));
        select.close();
        assert_eq!(select.search_text(), "");
        assert_eq!(ids(&select), vec![7, 17, 27]);
        assert_eq!(select.selected_ids(), vec![OptionId::Int(17)]);

        let request = select.open().expect("options from the old search are refetched");
        assert_eq!(request.page(), 0);
        select.run(request).await;
        assert_eq!(select.options().len(), 10);
        assert_eq!(select.selected_ids(), vec![OptionId::Int(17)]);
    }

    #[tokio::test]
    async fn test_reopen_without_changes_does_not_fetch() {
        let fetcher = MockFetcher::numbered(5);
        let mut select = opened(&fetcher, SelectOptions::default()).await;
        select.close();
        assert!(select.open().is_none());
        assert_eq!(select.phase(), Phase::Loaded { page: 0 });
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_ids_resolve_when_options_load() {
        let fetcher = MockFetcher::numbered(5);
        let mut select = control(&fetcher, SelectOptions::default());
        select.set_value(vec![SelectValue::Id(OptionId::Int(3)), SelectValue::Id(OptionId::Int(3))]);
        assert_eq!(select.tags(), vec!["3".to_string()]);

        let request = select.open().unwrap();
        select.run(request).await;
        assert_eq!(select.tags(), vec!["Row 3".to_string()]);
        assert!(select.rows()[2].selected);
    }

    #[tokio::test]
    async fn test_search_seed_is_applied_on_first_load() {
        let fetcher = MockFetcher::numbered(30);
        let select = opened(&fetcher, SelectOptions::default().search_seed("3")).await;
        assert_eq!(ids(&select), vec![3, 13, 23, 30]);
        assert_eq!(fetcher.last_request().unwrap().filters.search(), "3");
    }

    #[tokio::test]
    async fn test_change_callback_sees_each_change() {
        let fetcher = MockFetcher::numbered(5);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut select = control(&fetcher, SelectOptions::default())
            .on_change(move |selection: &[Selected<Row>]| sink.lock().push(selection.len()));

        let request = select.open().unwrap();
        select.run(request).await;
        select.toggle_id(&OptionId::Int(1));
        select.toggle_id(&OptionId::Int(2));
        select.remove(&OptionId::Int(1));
        select.clear();
        select.clear();

        assert_eq!(*seen.lock(), vec![1, 2, 1, 0]);
    }
}
