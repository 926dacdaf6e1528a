//! One-line toast strip above the footer

use iocraft::prelude::*;

use crate::notify::{Toast, ToastLevel};
use crate::tui::theme::theme;

fn prefix(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Info => "i",
        ToastLevel::Success => "ok",
        ToastLevel::Warning => "!",
        ToastLevel::Error => "x",
    }
}

/// The current toast, if any, ready for a `#(..)` slot
pub fn render_toast(toast: &Option<Toast>) -> Option<AnyElement<'static>> {
    let theme = theme();
    let toast = toast.as_ref()?;
    let color = theme.toast_color(toast.level);

    Some(
        element! {
            View(
                width: 100pct,
                flex_direction: FlexDirection::Row,
                flex_shrink: 0.0,
                padding_left: 1,
                column_gap: 1,
            ) {
                Text(content: format!("[{}]", prefix(toast.level)), color, weight: Weight::Bold)
                Text(content: toast.message.clone(), color: theme.text)
            }
        }
        .into_any(),
    )
}
