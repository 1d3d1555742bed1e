//! Query targets and execution requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datasource::DataSourceRef;
use crate::time_range::TimeRange;

/// Application that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoreApp {
    /// Dashboards (the only issuer of variable queries).
    #[default]
    Dashboard,
    /// Ad-hoc exploration.
    Explore,
    /// Anything else.
    Unknown,
}

/// A `{text, value}` binding injected into a request for interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedVar {
    /// Display text.
    pub text: String,
    /// Raw value.
    pub value: String,
}

impl ScopedVar {
    /// Creates a new binding.
    #[must_use]
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// Name to binding map. Ordered so serialized requests are stable.
pub type ScopedVars = BTreeMap<String, ScopedVar>;

/// A single query target, as produced by a datasource from variable context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    /// Identifier of the target within its request.
    pub ref_id: String,

    /// Datasource the target is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,

    /// Datasource specific query payload.
    #[serde(default)]
    pub query: serde_json::Value,
}

impl DataQuery {
    /// Creates a target with the given ref id and query payload.
    #[must_use]
    pub fn new(ref_id: impl Into<String>, query: serde_json::Value) -> Self {
        Self {
            ref_id: ref_id.into(),
            datasource: None,
            query,
        }
    }

    /// Addresses the target to a datasource.
    #[must_use]
    pub fn with_datasource(mut self, datasource: Option<DataSourceRef>) -> Self {
        self.datasource = datasource;
        self
    }

    /// Returns the query payload as text when it is a plain string.
    #[must_use]
    pub fn query_text(&self) -> Option<&str> {
        self.query.as_str()
    }
}

/// A complete execution request for one resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryRequest {
    /// Issuing application.
    pub app: CoreApp,
    /// Correlation id, fresh per attempt.
    pub request_id: String,
    /// Timezone of the dashboard (empty for browser/default).
    pub timezone: String,
    /// Time range the query is evaluated over.
    pub range: TimeRange,
    /// Interval hint (empty: let the datasource decide).
    pub interval: String,
    /// Interval hint in milliseconds (0: let the datasource decide).
    pub interval_ms: u64,
    /// The query targets; variable requests carry exactly one.
    pub targets: Vec<DataQuery>,
    /// Bindings available to the datasource for interpolation.
    pub scoped_vars: ScopedVars,
    /// When the request was issued.
    pub start_time: DateTime<Utc>,
}
