//! Shared TUI components

pub mod footer;
pub mod option_list;
pub mod search_box;
pub mod shortcuts;
pub mod toast;

pub use footer::{Footer, FooterProps, Shortcut, picker_shortcuts, selection_status};
pub use option_list::{OptionList, OptionListProps, TagBar, TagBarProps};
pub use search_box::{InlineSearchBox, InlineSearchBoxProps};
pub use toast::render_toast;
