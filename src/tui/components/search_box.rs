//! Search input line

use iocraft::prelude::*;

use crate::tui::theme::theme;

/// Props for the InlineSearchBox component
#[derive(Default, Props)]
pub struct InlineSearchBoxProps {
    /// Text typed so far
    pub value: String,
    /// Shown dimmed while nothing is typed
    pub placeholder: String,
    /// Whether the search box has focus
    pub has_focus: bool,
    /// A search is being fetched
    pub busy: bool,
}

/// Inline search input without borders.
///
/// Keystrokes are handled by the owning view, this only renders.
#[component]
pub fn InlineSearchBox(props: &InlineSearchBoxProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    let has_focus = props.has_focus;

    let (content, color) = if props.value.is_empty() {
        (props.placeholder.clone(), theme.text_dimmed)
    } else {
        (props.value.clone(), theme.text)
    };

    element! {
        View(
            flex_direction: FlexDirection::Row,
            width: 100pct,
            height: 1,
        ) {
            View(margin_right: 1) {
                Text(
                    content: "/",
                    color: if has_focus { theme.border_focused } else { theme.text_dimmed },
                )
            }
            View(flex_grow: 1.0) {
                Text(content, color)
                #(has_focus.then(|| element! {
                    Text(content: "▏", color: theme.border_focused)
                }))
            }
            #(props.busy.then(|| element! {
                Text(content: "loading…", color: theme.text_dimmed)
            }))
        }
    }
}
