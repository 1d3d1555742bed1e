//! Dashboard definition files.
//!
//! A definition describes the dashboard time range, its datasources and
//! its query variables. Files are YAML (`.yaml`, `.yml`) or JSON
//! (`.json`).

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use dashvar_domain::{DataFrame, MetricFindValue, QueryVariableState, TimeRange};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading a dashboard definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The file could not be read.
    #[error("failed to read definition {path}: {source}")]
    Io {
        /// Path of the definition.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML document is invalid.
    #[error("invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is invalid.
    #[error("invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not a supported format.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// A datasource could not be set up.
    #[error("datasource {uid} could not be created: {message}")]
    DataSource {
        /// Uid of the datasource.
        uid: String,
        /// What went wrong.
        message: String,
    },

    /// Two variables share a name.
    #[error("duplicate variable name: {0}")]
    DuplicateVariable(String),
}

/// Result type alias for definition operations.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Dashboard time range as written in a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum TimeRangeDefinition {
    /// Fixed start and end.
    Absolute {
        /// Range start.
        from: DateTime<Utc>,
        /// Range end.
        to: DateTime<Utc>,
    },
    /// The last `lastMinutes` minutes before now.
    Relative {
        /// Span of the range in minutes.
        last_minutes: i64,
    },
}

impl TimeRangeDefinition {
    /// Resolves the definition against `now`.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> TimeRange {
        match self {
            Self::Absolute { from, to } => TimeRange::new(*from, *to),
            Self::Relative { last_minutes } => TimeRange::last(Duration::minutes(*last_minutes), now),
        }
    }
}

/// A datasource entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataSourceDefinition {
    /// Serves fixed frames.
    Frames {
        /// Datasource uid.
        uid: String,
        /// Frames returned for every request.
        #[serde(default)]
        frames: Vec<DataFrame>,
    },
    /// Serves a fixed list of values through a metric find query.
    Values {
        /// Datasource uid.
        uid: String,
        /// Values the query filters.
        #[serde(default)]
        values: Vec<MetricFindValue>,
    },
    /// Queries an HTTP endpoint.
    Http {
        /// Datasource uid.
        uid: String,
        /// Query endpoint.
        url: Url,
        /// Request timeout in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
}

impl DataSourceDefinition {
    /// Uid of the datasource.
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            Self::Frames { uid, .. } | Self::Values { uid, .. } | Self::Http { uid, .. } => uid,
        }
    }
}

/// A complete dashboard definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardDefinition {
    /// Dashboard time range; the default range when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRangeDefinition>,

    /// Uid of the datasource used by variables without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_datasource: Option<String>,

    /// Datasources.
    pub datasources: Vec<DataSourceDefinition>,

    /// Query variables, in resolution order.
    pub variables: Vec<QueryVariableState>,
}

impl DashboardDefinition {
    /// Parses a YAML definition.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::Yaml` if the document is invalid.
    pub fn from_yaml_str(yaml: &str) -> DefinitionResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::Json` if the document is invalid.
    pub fn from_json_str(json: &str) -> DefinitionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Time range the dashboard starts with.
    #[must_use]
    pub fn initial_time_range(&self, now: DateTime<Utc>) -> TimeRange {
        self.time_range
            .as_ref()
            .map_or_else(|| TimeRange::default_at(now), |range| range.resolve(now))
    }
}

/// Loads a definition, picking the format from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension or does not parse.
pub async fn load_definition(path: &Path) -> DefinitionResult<DashboardDefinition> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !matches!(extension.as_str(), "yaml" | "yml" | "json") {
        return Err(DefinitionError::UnsupportedFormat(path.display().to_string()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "loading dashboard definition");

    if extension == "json" {
        DashboardDefinition::from_json_str(&content)
    } else {
        DashboardDefinition::from_yaml_str(&content)
    }
}
