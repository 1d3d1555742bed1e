//! Datasource adapters and the registry resolving them.

mod http;
mod registry;
mod static_source;

pub use http::{DEFAULT_TIMEOUT_MS, HttpDataSource};
pub use registry::InMemoryDataSourceRegistry;
pub use static_source::{StaticDataSource, StaticOutcome, StaticValuesSource};
