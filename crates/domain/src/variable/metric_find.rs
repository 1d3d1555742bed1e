//! Conversion of raw result frames into metric find values.

use serde::{Deserialize, Serialize};

use crate::data::{DataFrame, Field, FieldType};

/// Canonical row shape of a "find values" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetricFindValue {
    /// Display text.
    pub text: String,

    /// Value, when it differs from the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Whether the value can be expanded further (tree-like sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expandable: Option<bool>,
}

impl MetricFindValue {
    /// A value whose text is its value.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A value with distinct text and value.
    #[must_use]
    pub fn with_value(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: Some(value.into()),
            expandable: None,
        }
    }
}

/// Column roles discovered in one frame.
#[derive(Debug, Default)]
struct ColumnRoles {
    string: Option<usize>,
    text: Option<usize>,
    value: Option<usize>,
    expandable: Option<usize>,
}

impl ColumnRoles {
    fn discover(frame: &DataFrame) -> Self {
        let mut roles = Self::default();
        for (index, field) in frame.fields.iter().enumerate() {
            let kind = field.kind();
            let name = field.name.to_lowercase();
            if kind == FieldType::String && roles.string.is_none() {
                roles.string = Some(index);
            }
            if name == "text" && kind == FieldType::String && roles.text.is_none() {
                roles.text = Some(index);
            }
            if name == "value" && roles.value.is_none() {
                roles.value = Some(index);
            }
            if name == "expandable" && kind == FieldType::Boolean && roles.expandable.is_none() {
                roles.expandable = Some(index);
            }
        }
        roles
    }
}

/// Converts result frames into metric find values.
///
/// Total over any frame shape: a frame without a string column uses its
/// first column, with values coerced to text. Frames without columns
/// contribute nothing.
#[must_use]
pub fn to_metric_find_values(series: &[DataFrame]) -> Vec<MetricFindValue> {
    let mut values = Vec::new();

    for frame in series {
        if frame.fields.is_empty() {
            continue;
        }

        let roles = ColumnRoles::discover(frame);
        let string_index = roles.string.unwrap_or(0);
        let text_index = roles.text.unwrap_or(string_index);
        let string_field = &frame.fields[string_index];
        let text_field = &frame.fields[text_index];

        for row in 0..frame.len() {
            let mut text = text_field.text_at(row);
            if text.is_empty() {
                text = string_field.text_at(row);
            }
            values.push(MetricFindValue {
                text,
                value: roles.value.and_then(|i| frame.fields[i].opt_text_at(row)),
                expandable: roles.expandable.and_then(|i| frame.fields[i].bool_at(row)),
            });
        }
    }

    values
}

/// Builds a frame from metric find values.
///
/// The `value` and `expandable` columns are only present when at least one
/// value carries them.
#[must_use]
pub fn metric_find_values_to_frame(values: &[MetricFindValue]) -> DataFrame {
    let mut fields = vec![Field::strings("text", values.iter().map(|v| v.text.clone()))];

    if values.iter().any(|v| v.value.is_some()) {
        let column = values
            .iter()
            .map(|v| v.value.clone().map_or(serde_json::Value::Null, serde_json::Value::String))
            .collect();
        fields.push(Field {
            field_type: Some(FieldType::String),
            ..Field::new("value", column)
        });
    }

    if values.iter().any(|v| v.expandable.is_some()) {
        let column = values
            .iter()
            .map(|v| v.expandable.map_or(serde_json::Value::Null, serde_json::Value::Bool))
            .collect();
        fields.push(Field {
            field_type: Some(FieldType::Boolean),
            ..Field::new("expandable", column)
        });
    }

    DataFrame::new(fields)
}
