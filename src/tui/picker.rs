//! Interactive option picker (`adminctl pick`)
//!
//! The view owns no selection state of its own. Everything lives in a
//! [`MultiSelect`] shared behind a mutex; the view forwards keys to it, runs
//! the fetches it hands back, and re-renders when they land.

// State handles are Copy; they are rebound before moving into closures
#![allow(clippy::clone_on_copy)]

use std::sync::Arc;
use std::time::Duration;

use iocraft::prelude::*;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::notify::{Notifier, Toast};
use crate::query::{FetchOutcome, FetchRequest};
use crate::select::{MultiSelect, OptionRow, SelectMode, SelectOptions};
use crate::tui::components::{
    Footer, InlineSearchBox, OptionList, TagBar, picker_shortcuts, render_toast, selection_status,
};
use crate::tui::theme::theme;

/// How often the view checks for a settled search and expired toasts
const TICK: Duration = Duration::from_millis(50);

/// What the picker view needs from a select control, independent of the
/// record type behind it
pub trait PickerControl: Send + Sync {
    fn settings(&self) -> &SelectOptions;
    fn is_open(&self) -> bool;
    fn is_loading(&self) -> bool;
    fn open(&mut self) -> Option<FetchRequest>;
    fn search_text(&self) -> String;
    fn set_search(&mut self, text: String);
    fn poll(&mut self) -> Option<FetchRequest>;
    fn apply(&mut self, outcome: FetchOutcome) -> bool;
    fn move_up(&mut self);
    fn move_down(&mut self) -> Option<FetchRequest>;
    fn page_up(&mut self);
    fn page_down(&mut self) -> Option<FetchRequest>;
    fn toggle_highlighted(&mut self);
    fn rows(&self) -> Vec<OptionRow>;
    fn tags(&self) -> Vec<String>;
    fn selected_count(&self) -> usize;
    fn error_text(&self) -> Option<String>;
    fn loaded(&self) -> usize;
    fn total(&self) -> u64;
}

impl<T> PickerControl for MultiSelect<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn settings(&self) -> &SelectOptions {
        MultiSelect::settings(self)
    }

    fn is_open(&self) -> bool {
        MultiSelect::is_open(self)
    }

    fn is_loading(&self) -> bool {
        MultiSelect::is_loading(self)
    }

    fn open(&mut self) -> Option<FetchRequest> {
        MultiSelect::open(self)
    }

    fn search_text(&self) -> String {
        MultiSelect::search_text(self).to_string()
    }

    fn set_search(&mut self, text: String) {
        MultiSelect::set_search(self, text)
    }

    fn poll(&mut self) -> Option<FetchRequest> {
        MultiSelect::poll(self)
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        MultiSelect::apply(self, outcome)
    }

    fn move_up(&mut self) {
        MultiSelect::move_up(self)
    }

    fn move_down(&mut self) -> Option<FetchRequest> {
        MultiSelect::move_down(self)
    }

    fn page_up(&mut self) {
        MultiSelect::page_up(self)
    }

    fn page_down(&mut self) -> Option<FetchRequest> {
        MultiSelect::page_down(self)
    }

    fn toggle_highlighted(&mut self) {
        MultiSelect::toggle_highlighted(self)
    }

    fn rows(&self) -> Vec<OptionRow> {
        MultiSelect::rows(self)
    }

    fn tags(&self) -> Vec<String> {
        MultiSelect::tags(self)
    }

    fn selected_count(&self) -> usize {
        self.selection().len()
    }

    fn error_text(&self) -> Option<String> {
        MultiSelect::error_text(self)
    }

    fn loaded(&self) -> usize {
        self.options().len()
    }

    fn total(&self) -> u64 {
        self.query().total_elements()
    }
}

pub type SharedControl = Arc<Mutex<dyn PickerControl>>;

/// How the picker was left
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickerExit {
    #[default]
    Cancelled,
    Confirmed,
}

/// Result of one key press
#[derive(Debug)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// A fetch to run in the background
    Fetch(FetchRequest),
    Exit(PickerExit),
}

impl From<Option<FetchRequest>> for KeyOutcome {
    fn from(request: Option<FetchRequest>) -> Self {
        request.map_or(KeyOutcome::Handled, KeyOutcome::Fetch)
    }
}

/// Apply a key press to the control
pub fn handle_key(
    control: &mut dyn PickerControl,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> KeyOutcome {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let mode = control.settings().mode;

    match code {
        KeyCode::Esc => KeyOutcome::Exit(PickerExit::Cancelled),
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => KeyOutcome::Exit(PickerExit::Cancelled),
        KeyCode::Enter => {
            if mode == SelectMode::Single {
                control.toggle_highlighted();
            }
            KeyOutcome::Exit(PickerExit::Confirmed)
        }
        KeyCode::Up => {
            control.move_up();
            KeyOutcome::Handled
        }
        KeyCode::Char('p') if ctrl => {
            control.move_up();
            KeyOutcome::Handled
        }
        KeyCode::Down => control.move_down().into(),
        KeyCode::Char('n') if ctrl => control.move_down().into(),
        KeyCode::PageDown => control.page_down().into(),
        KeyCode::PageUp => {
            control.page_up();
            KeyOutcome::Handled
        }
        KeyCode::Char(' ') if mode == SelectMode::Multiple => {
            control.toggle_highlighted();
            KeyOutcome::Handled
        }
        KeyCode::Backspace => {
            let mut text = control.search_text();
            if text.pop().is_none() {
                return KeyOutcome::Ignored;
            }
            control.set_search(text);
            KeyOutcome::Handled
        }
        KeyCode::Char(c) if !ctrl => {
            let mut text = control.search_text();
            text.push(c);
            control.set_search(text);
            KeyOutcome::Handled
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Everything the view renders, copied out under one lock
#[derive(Debug, Clone, Default)]
struct Snapshot {
    mode: SelectMode,
    placeholder: String,
    show_tags: bool,
    show_checkboxes: bool,
    search: String,
    rows: Vec<OptionRow>,
    tags: Vec<String>,
    selected: usize,
    loading: bool,
    error: Option<String>,
    loaded: usize,
    total: u64,
}

impl Snapshot {
    fn of(control: &dyn PickerControl) -> Self {
        let settings = control.settings();
        Self {
            mode: settings.mode,
            placeholder: settings.placeholder.clone(),
            show_tags: settings.show_tags,
            show_checkboxes: settings.show_checkboxes,
            search: control.search_text(),
            rows: control.rows(),
            tags: control.tags(),
            selected: control.selected_count(),
            loading: control.is_loading(),
            error: control.error_text(),
            loaded: control.loaded(),
            total: control.total(),
        }
    }
}

/// Props for the OptionPicker component
#[derive(Default, Props)]
pub struct OptionPickerProps {
    pub title: String,
    pub control: Option<SharedControl>,
    pub notifier: Option<Arc<Notifier>>,
    /// Written once the view exits
    pub exit: Option<Arc<Mutex<PickerExit>>>,
}

/// Fullscreen picker over a select control
///
/// Layout:
/// ```text
/// +------------------------------------------+
/// | Title                                    |
/// | / search                                 |
/// | [tag] [tag]                              |
/// | [ ] option                               |
/// | [x] option                               |
/// | 20 of 134 loaded                         |
/// +------------------------------------------+
/// | Toast                                    |
/// | Footer                       N selected  |
/// +------------------------------------------+
/// ```
#[component]
pub fn OptionPicker<'a>(props: &OptionPickerProps, mut hooks: Hooks) -> impl Into<AnyElement<'a>> {
    let (width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();

    let mut version = hooks.use_state(|| 0u64);
    let mut should_exit = hooks.use_state(|| false);
    let mut started = hooks.use_state(|| false);
    let toast: State<Option<Toast>> = hooks.use_state(|| None);

    let control = props.control.clone();

    // Run a fetch off the render path and fold the outcome back in
    let fetch_handler: Handler<FetchRequest> = hooks.use_async_handler({
        let control = control.clone();
        let notifier = props.notifier.clone();
        let version_setter = version.clone();

        move |request: FetchRequest| {
            let control = control.clone();
            let notifier = notifier.clone();
            let mut version_setter = version_setter.clone();

            async move {
                let outcome = request.run().await;
                let failed = !outcome.is_ok();
                if let Some(control) = control {
                    let error = {
                        let mut control = control.lock();
                        let applied = control.apply(outcome);
                        if applied && failed {
                            control.error_text()
                        } else {
                            None
                        }
                    };
                    if let (Some(notifier), Some(error)) = (notifier, error) {
                        notifier.error(error);
                    }
                }
                version_setter.set(version_setter.get() + 1);
            }
        }
    });

    // Settled searches and toast expiry
    hooks.use_future({
        let control = control.clone();
        let notifier = props.notifier.clone();
        let fetch_handler = fetch_handler.clone();
        let mut toast_setter = toast.clone();

        async move {
            loop {
                tokio::time::sleep(TICK).await;

                if let Some(control) = &control {
                    let request = control.lock().poll();
                    if let Some(request) = request {
                        fetch_handler(request);
                    }
                }

                if let Some(notifier) = &notifier {
                    notifier.expire(Instant::now());
                    let latest = notifier.latest();
                    if *toast_setter.read() != latest {
                        toast_setter.set(latest);
                    }
                }
            }
        }
    });

    // Open on first render
    if !started.get() {
        started.set(true);
        if let Some(control) = &control {
            let request = control.lock().open();
            if let Some(request) = request {
                fetch_handler.clone()(request);
            }
        }
    }

    hooks.use_terminal_events({
        let control = control.clone();
        let fetch_handler = fetch_handler.clone();
        let exit = props.exit.clone();

        move |event| {
            let TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                return;
            };
            if kind == KeyEventKind::Release {
                return;
            }
            let Some(control) = &control else {
                should_exit.set(true);
                return;
            };

            let outcome = handle_key(&mut *control.lock(), code, modifiers);
            match outcome {
                KeyOutcome::Ignored => return,
                KeyOutcome::Handled => {}
                KeyOutcome::Fetch(request) => fetch_handler(request),
                KeyOutcome::Exit(how) => {
                    if let Some(exit) = &exit {
                        *exit.lock() = how;
                    }
                    should_exit.set(true);
                }
            }
            version.set(version.get() + 1);
        }
    });

    if should_exit.get() {
        system.exit();
    }

    let snapshot = control
        .as_ref()
        .map(|c| Snapshot::of(&*c.lock()))
        .unwrap_or_default();
    let current_toast = toast.read().clone();
    let theme = theme();

    element! {
        View(
            width,
            height,
            flex_direction: FlexDirection::Column,
            background_color: theme.background,
        ) {
            View(width: 100pct, height: 1, padding_left: 1) {
                Text(content: props.title.clone(), color: theme.highlight, weight: Weight::Bold)
            }
            View(
                width: 100pct,
                border_style: BorderStyle::Round,
                border_color: theme.border_focused,
                padding_left: 1,
                padding_right: 1,
            ) {
                InlineSearchBox(
                    value: snapshot.search.clone(),
                    placeholder: snapshot.placeholder.clone(),
                    has_focus: true,
                    busy: snapshot.loading,
                )
            }
            #((snapshot.show_tags && !snapshot.tags.is_empty()).then(|| element! {
                TagBar(tags: snapshot.tags.clone())
            }))
            OptionList(
                rows: snapshot.rows.clone(),
                show_checkboxes: snapshot.show_checkboxes,
                error: snapshot.error.clone(),
                loading: snapshot.loading,
                loaded: snapshot.loaded,
                total: snapshot.total,
            )
            #(render_toast(&current_toast))
            Footer(
                shortcuts: picker_shortcuts(snapshot.mode),
                status: selection_status(snapshot.mode, snapshot.selected),
            )
        }
    }
}
