//! Dashvar Application - query variable resolution and ports
//!
//! This crate defines the application layer with:
//! - Port traits for datasources, time range, interpolation and time
//! - The query variable: option resolution pipeline and lifecycle
//! - The variable family trait

pub mod error;
pub mod ports;
pub mod query_variable;
pub mod variable;

pub use error::{VariableError, VariableResult};
pub use ports::{
    Clock, DataSourceApi, DataSourceError, DataSourceRegistry, InterpolationFormat,
    RunRequestOptions, TemplateInterpolator, TimeRangeSource,
};
pub use query_variable::{
    DataSourceGate, LegacyQueryRunner, MetricFindOptions, MetricFindSource, QueryVariable,
    RequestBuilder, ResolutionPhase, VariableGetOptionsArgs, VariableServices,
};
pub use variable::VariableValueProvider;
