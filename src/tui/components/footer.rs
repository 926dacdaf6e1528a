//! Bottom bar: key hints on the left, selection status on the right

use iocraft::prelude::*;

use super::shortcuts::ShortcutsBuilder;
use crate::select::SelectMode;
use crate::tui::theme::theme;

/// One key hint, e.g. `Space` / `Toggle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub key: String,
    pub action: String,
}

impl Shortcut {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub shortcuts: Vec<Shortcut>,
    /// Right-aligned status, e.g. "3 selected"
    pub status: Option<String>,
}

#[component]
pub fn Footer(props: &FooterProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let hints: Vec<AnyElement<'static>> = props
        .shortcuts
        .iter()
        .map(|s| {
            element! {
                Text(
                    content: format!("{} {}", s.key, s.action.to_lowercase()),
                    color: theme.text_dimmed,
                )
            }
            .into_any()
        })
        .collect();

    element! {
        View(
            width: 100pct,
            flex_direction: FlexDirection::Row,
            flex_shrink: 0.0,
            justify_content: JustifyContent::SpaceBetween,
            padding_left: 1,
            padding_right: 1,
            border_edges: Edges::Top,
            border_style: BorderStyle::Single,
            border_color: theme.border,
        ) {
            View(flex_direction: FlexDirection::Row, flex_wrap: FlexWrap::Wrap, column_gap: 3) {
                #(hints)
            }
            #(props.status.clone().map(|status| element! {
                Text(content: status, color: theme.checkbox_on, weight: Weight::Bold)
            }))
        }
    }
}

/// Key hints for the option picker in `mode`
pub fn picker_shortcuts(mode: SelectMode) -> Vec<Shortcut> {
    let builder = ShortcutsBuilder::new().with_search().with_navigation();
    let builder = match mode {
        SelectMode::Multiple => builder.add("Space", "Toggle").add("Enter", "Done"),
        SelectMode::Single => builder.add("Enter", "Choose"),
    };
    builder.with_cancel().build()
}

/// Status text for the footer; nothing until something is picked
pub fn selection_status(mode: SelectMode, selected: usize) -> Option<String> {
    match (mode, selected) {
        (_, 0) => None,
        (SelectMode::Single, _) => Some("1 chosen".to_string()),
        (SelectMode::Multiple, n) => Some(format!("{n} selected")),
    }
}
