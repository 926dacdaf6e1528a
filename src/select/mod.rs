//! Select controls backed by paginated queries.

mod highlight;
mod multi;
mod options;
mod searchable;
mod value;

pub use highlight::{highlight_segments, match_indices};
pub use multi::{MultiSelect, OptionRow, Phase, SEARCH_DEBOUNCE, SelectMode, SelectOptions};
pub use options::AccumulatedOptions;
pub use searchable::SearchableSelect;
pub use value::{OptionAccessors, OptionId, SelectValue, Selected};
