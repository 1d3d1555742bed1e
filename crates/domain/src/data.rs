//! Query result snapshots.
//!
//! A datasource answers a request with a stream of [`PanelData`] snapshots.
//! Only [`LoadingState::Done`] and [`LoadingState::Error`] are terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Loading state carried by every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum LoadingState {
    /// Nothing has been requested yet.
    #[default]
    NotStarted,
    /// Request in flight.
    Loading,
    /// Partial results are arriving.
    Streaming,
    /// Final results.
    Done,
    /// The request failed.
    Error,
}

impl LoadingState {
    /// Returns true for states after which no further updates are expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Error reported by a datasource for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct DataQueryError {
    /// Human readable message.
    pub message: String,

    /// Upstream status code, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Target the error belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,

    /// Set when the request was cancelled rather than failed.
    #[serde(default)]
    pub cancelled: bool,
}

impl DataQueryError {
    /// Creates a plain error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Creates an error tagged as cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            message: "Request was cancelled".to_string(),
            cancelled: true,
            ..Self::default()
        }
    }

    /// Attaches an upstream status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Declared type of a frame field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text values.
    String,
    /// Numeric values.
    Number,
    /// Boolean values.
    Boolean,
    /// Timestamps.
    Time,
    /// Anything else.
    Other,
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column name.
    pub name: String,

    /// Declared type; inferred from the values when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    /// Column values.
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

impl Field {
    /// Creates an untyped field.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            values,
        }
    }

    /// Creates a string field.
    #[must_use]
    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            field_type: Some(FieldType::String),
            values: values
                .into_iter()
                .map(|v| serde_json::Value::String(v.into()))
                .collect(),
        }
    }

    /// Returns the declared type, or infers it from the first non-null value.
    #[must_use]
    pub fn kind(&self) -> FieldType {
        if let Some(kind) = self.field_type {
            return kind;
        }
        self.values
            .iter()
            .find(|v| !v.is_null())
            .map_or(FieldType::Other, |v| match v {
                serde_json::Value::String(_) => FieldType::String,
                serde_json::Value::Number(_) => FieldType::Number,
                serde_json::Value::Bool(_) => FieldType::Boolean,
                _ => FieldType::Other,
            })
    }

    /// Returns the value at `index` coerced to text.
    ///
    /// Missing cells and nulls become the empty string.
    #[must_use]
    pub fn text_at(&self, index: usize) -> String {
        self.opt_text_at(index).unwrap_or_default()
    }

    /// Returns the value at `index` coerced to text, or `None` for missing
    /// cells and nulls.
    #[must_use]
    pub fn opt_text_at(&self, index: usize) -> Option<String> {
        match self.values.get(index)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Returns the value at `index` when it is a boolean.
    #[must_use]
    pub fn bool_at(&self, index: usize) -> Option<bool> {
        self.values.get(index).and_then(serde_json::Value::as_bool)
    }
}

/// A table of fields, as returned by a datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DataFrame {
    /// Optional frame name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Columns.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl DataFrame {
    /// Creates a frame from its fields.
    #[must_use]
    pub const fn new(fields: Vec<Field>) -> Self {
        Self { name: None, fields }
    }

    /// Number of rows; the longest column wins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.iter().map(|f| f.values.len()).max().unwrap_or(0)
    }

    /// Returns true if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One snapshot of a request's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PanelData {
    /// Loading state of the request.
    pub state: LoadingState,

    /// Result frames.
    #[serde(default)]
    pub series: Vec<DataFrame>,

    /// Error detail, set when `state` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DataQueryError>,
}

impl PanelData {
    /// A loading snapshot without data.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            state: LoadingState::Loading,
            ..Self::default()
        }
    }

    /// A partial snapshot.
    #[must_use]
    pub const fn streaming(series: Vec<DataFrame>) -> Self {
        Self {
            state: LoadingState::Streaming,
            series,
            error: None,
        }
    }

    /// A final snapshot.
    #[must_use]
    pub const fn done(series: Vec<DataFrame>) -> Self {
        Self {
            state: LoadingState::Done,
            series,
            error: None,
        }
    }

    /// A failed snapshot.
    #[must_use]
    pub fn error(error: DataQueryError) -> Self {
        Self {
            state: LoadingState::Error,
            series: Vec::new(),
            error: Some(error),
        }
    }

    /// Returns true if no further updates are expected for this request.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
