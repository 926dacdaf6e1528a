//! Option list for the picker: checkbox rows with highlighted matches, the
//! selected tags, and the inline fetch error.

use iocraft::prelude::*;

use crate::select::{OptionRow, highlight_segments};
use crate::tui::theme::theme;

/// Props for the OptionList component
#[derive(Default, Props)]
pub struct OptionListProps {
    /// Visible window of options
    pub rows: Vec<OptionRow>,
    pub show_checkboxes: bool,
    /// Replaces the list when the last fetch failed
    pub error: Option<String>,
    pub loading: bool,
    /// Total options loaded so far
    pub loaded: usize,
    /// Total options the backend reports
    pub total: u64,
}

fn checkbox(selected: bool) -> &'static str {
    if selected { "[x] " } else { "[ ] " }
}

#[component]
pub fn OptionList(props: &OptionListProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();

    if let Some(error) = &props.error {
        return element! {
            View(width: 100pct, padding_left: 1, flex_grow: 1.0) {
                Text(content: error.clone(), color: theme.error)
            }
        };
    }

    if props.rows.is_empty() {
        let message = if props.loading { "Loading…" } else { "No options" };
        return element! {
            View(width: 100pct, padding_left: 1, flex_grow: 1.0) {
                Text(content: message, color: theme.text_dimmed)
            }
        };
    }

    let status = if props.loading {
        format!("{} of {} loaded, loading more…", props.loaded, props.total)
    } else {
        format!("{} of {} loaded", props.loaded, props.total)
    };

    element! {
        View(width: 100pct, flex_direction: FlexDirection::Column, flex_grow: 1.0) {
            #(props.rows.iter().map(|row| {
                let background = if row.highlighted {
                    theme.highlight_background
                } else {
                    theme.background
                };
                let segments = highlight_segments(&row.label, &row.matches);
                element! {
                    View(
                        width: 100pct,
                        height: 1,
                        flex_direction: FlexDirection::Row,
                        padding_left: 1,
                        background_color: background,
                    ) {
                        #(props.show_checkboxes.then(|| element! {
                            Text(
                                content: checkbox(row.selected),
                                color: if row.selected { theme.checkbox_on } else { theme.text_dimmed },
                            )
                        }))
                        #(segments.into_iter().map(|(text, matched)| element! {
                            Text(
                                content: text,
                                color: if matched { theme.search_match } else { theme.text },
                                weight: if matched || row.highlighted { Weight::Bold } else { Weight::Normal },
                            )
                        }))
                    }
                }
            }))
            View(padding_left: 1, height: 1) {
                Text(content: status, color: theme.text_dimmed)
            }
        }
    }
}

/// Props for the TagBar component
#[derive(Default, Props)]
pub struct TagBarProps {
    pub tags: Vec<String>,
}

/// Selected labels as tags
#[component]
pub fn TagBar(props: &TagBarProps) -> impl Into<AnyElement<'static>> {
    let theme = theme();
    element! {
        View(
            width: 100pct,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            column_gap: 1,
            padding_left: 1,
        ) {
            #(props.tags.iter().map(|tag| element! {
                Text(content: format!("[{}]", tag), color: theme.tag)
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_marks() {
        assert_eq!(checkbox(true), "[x] ");
        assert_eq!(checkbox(false), "[ ] ");
    }
}
