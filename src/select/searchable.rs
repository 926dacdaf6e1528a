//! Single-value searchable select.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::query::{FetchOutcome, FetchRequest, Fetcher, QueryClient, QueryOptions};

use super::multi::{MultiSelect, OptionRow, Phase, SelectMode, SelectOptions};
use super::value::{OptionAccessors, OptionId, SelectValue, Selected};

/// A select holding at most one value.
///
/// While closed the input shows the selected label; while open it shows the
/// search text.
#[derive(Debug)]
pub struct SearchableSelect<T> {
    inner: MultiSelect<T>,
}

impl<T> SearchableSelect<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        client: Arc<QueryClient>,
        fetcher: Arc<dyn Fetcher>,
        query: QueryOptions,
        accessors: OptionAccessors<T>,
        settings: SelectOptions,
    ) -> Self {
        let settings = settings.mode(SelectMode::Single).show_checkboxes(false);
        Self {
            inner: MultiSelect::new(client, fetcher, query, accessors, settings),
        }
    }

    pub fn on_change(self, mut callback: impl FnMut(Option<&Selected<T>>) + Send + Sync + 'static) -> Self {
        Self {
            inner: self
                .inner
                .on_change(move |selection: &[Selected<T>]| callback(selection.first())),
        }
    }

    pub fn value(&self) -> Option<&Selected<T>> {
        self.inner.selection().first()
    }

    pub fn set_value(&mut self, value: Option<SelectValue<T>>) {
        self.inner.set_value(value.into_iter().collect());
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// What the input box displays
    pub fn input_text(&self) -> String {
        if self.inner.is_open() {
            return self.inner.search_text().to_string();
        }
        self.value()
            .map(|selected| selected.label(self.inner.accessors()))
            .unwrap_or_default()
    }

    pub fn placeholder(&self) -> &str {
        &self.inner.settings().placeholder
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    pub fn open(&mut self) -> Option<FetchRequest> {
        self.inner.open()
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.inner.set_search(text);
    }

    pub fn poll(&mut self) -> Option<FetchRequest> {
        self.inner.poll()
    }

    pub async fn settle_search(&mut self) -> Option<FetchRequest> {
        self.inner.settle_search().await
    }

    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        self.inner.apply(outcome)
    }

    pub async fn run(&mut self, request: FetchRequest) -> bool {
        self.inner.run(request).await
    }

    pub fn move_down(&mut self) -> Option<FetchRequest> {
        self.inner.move_down()
    }

    pub fn move_up(&mut self) {
        self.inner.move_up();
    }

    /// Choose the highlighted option and close
    pub fn confirm(&mut self) {
        self.inner.toggle_highlighted();
    }

    pub fn choose(&mut self, id: &OptionId) {
        self.inner.toggle_id(id);
    }

    pub fn rows(&self) -> Vec<OptionRow> {
        self.inner.rows()
    }

    pub fn error_text(&self) -> Option<String> {
        self.inner.error_text()
    }

    pub fn control(&self) -> &MultiSelect<T> {
        &self.inner
    }

    pub fn control_mut(&mut self) -> &mut MultiSelect<T> {
        &mut self.inner
    }
}
