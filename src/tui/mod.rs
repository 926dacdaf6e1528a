//! Terminal UI for interactive selection

pub mod components;
pub mod picker;
pub mod theme;

pub use picker::{
    KeyOutcome, OptionPicker, OptionPickerProps, PickerControl, PickerExit, SharedControl,
    handle_key,
};
pub use theme::Theme;
