//! Dashvar Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer, plus loading of dashboard definitions.

pub mod adapters;
pub mod dashboard;
pub mod datasource;
pub mod definition;
pub mod interpolation;

pub use adapters::{SystemClock, WatchTimeRange};
pub use dashboard::Dashboard;
pub use datasource::{
    HttpDataSource, InMemoryDataSourceRegistry, StaticDataSource, StaticOutcome,
    StaticValuesSource,
};
pub use definition::{
    DashboardDefinition, DataSourceDefinition, DefinitionError, DefinitionResult,
    TimeRangeDefinition, load_definition,
};
pub use interpolation::{TemplateSrv, VariableReference, parse_references};
