//! Selectable variable options.

use serde::{Deserialize, Serialize};

/// One selectable value of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableValueOption {
    /// Text shown to the user.
    pub label: String,
    /// Value substituted into queries.
    pub value: String,
}

impl VariableValueOption {
    /// Creates an option with distinct label and value.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Creates an option whose label equals its value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}
