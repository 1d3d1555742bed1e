//! Datasource references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a datasource known to the datasource registry.
///
/// A reference without a uid points at the registry's default datasource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataSourceRef {
    /// Unique identifier of the datasource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Plugin type of the datasource (e.g. `prometheus`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ds_type: Option<String>,
}

impl DataSourceRef {
    /// Creates a reference to the datasource with the given uid.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ds_type: None,
        }
    }

    /// Creates a reference to the registry's default datasource.
    #[must_use]
    pub const fn default_datasource() -> Self {
        Self {
            uid: None,
            ds_type: None,
        }
    }

    /// Sets the plugin type.
    #[must_use]
    pub fn with_type(mut self, ds_type: impl Into<String>) -> Self {
        self.ds_type = Some(ds_type.into());
        self
    }
}

impl fmt::Display for DataSourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.uid, &self.ds_type) {
            (Some(uid), Some(ds_type)) => write!(f, "{ds_type}:{uid}"),
            (Some(uid), None) => write!(f, "{uid}"),
            (None, Some(ds_type)) => write!(f, "{ds_type}:default"),
            (None, None) => write!(f, "default"),
        }
    }
}
