//! Dashvar Domain - Core types for query-driven dashboard variables
//!
//! This crate contains the pure domain model: variable state and
//! configuration, datasource references, time ranges, query requests,
//! result snapshots, and the transformation of raw results into
//! selectable options. Types here have no I/O dependencies.

pub mod data;
pub mod datasource;
pub mod error;
pub mod id;
pub mod query;
pub mod time_range;
pub mod variable;

pub use data::{DataFrame, DataQueryError, Field, FieldType, LoadingState, PanelData};
pub use datasource::DataSourceRef;
pub use error::{DomainError, DomainResult};
pub use id::generate_request_id;
pub use query::{CoreApp, DataQuery, DataQueryRequest, ScopedVar, ScopedVars};
pub use time_range::{RawTimeRange, TimeRange};
pub use variable::{
    MetricFindValue, QueryVariableState, VariableRefresh, VariableRegex, VariableSort,
    VariableValueOption, metric_find_values_to_frame, metric_names_to_variable_values,
    sort_variable_values, to_metric_find_values,
};
