//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the query variable and the systems
//! around it. Each port is a trait implemented by adapters in the
//! infrastructure layer, or by test doubles.

mod clock;
mod datasource;
mod interpolation;
mod time_range;

pub use clock::Clock;
pub use datasource::{DataSourceApi, DataSourceError, DataSourceRegistry, RunRequestOptions};
pub use interpolation::{InterpolationFormat, TemplateInterpolator};
pub use time_range::TimeRangeSource;
