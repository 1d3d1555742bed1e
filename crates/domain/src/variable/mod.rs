//! Query variable domain types
//!
//! The variable state, its configuration enums, and the pure result
//! transformation from raw frames to selectable options.

mod metric_find;
mod option;
mod refresh;
mod sort;
mod state;
mod values;

pub use metric_find::{MetricFindValue, metric_find_values_to_frame, to_metric_find_values};
pub use option::VariableValueOption;
pub use refresh::VariableRefresh;
pub use sort::{VariableSort, sort_variable_values};
pub use state::QueryVariableState;
pub use values::{VariableRegex, metric_names_to_variable_values};
