//! Query variable state.

use serde::{Deserialize, Serialize};

use super::option::VariableValueOption;
use super::refresh::VariableRefresh;
use super::sort::VariableSort;
use crate::datasource::DataSourceRef;

/// Configuration and current selection of a query variable.
///
/// `options` always holds the result of the newest completed resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryVariableState {
    /// Variable name, as referenced from queries (`$name`).
    pub name: String,
    /// Currently selected value.
    pub value: String,
    /// Display text of the current selection.
    pub text: String,
    /// Datasource specific query. An empty string means "no query".
    pub query: serde_json::Value,
    /// Datasource the query runs against.
    pub datasource: Option<DataSourceRef>,
    /// Regex applied to the query results; may reference other variables.
    pub regex: String,
    /// When the options are re-resolved.
    pub refresh: VariableRefresh,
    /// Sort order of the options.
    pub sort: VariableSort,
    /// Resolved options.
    pub options: Vec<VariableValueOption>,
}

impl Default for QueryVariableState {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            text: String::new(),
            query: serde_json::Value::String(String::new()),
            datasource: None,
            regex: String::new(),
            refresh: VariableRefresh::default(),
            sort: VariableSort::default(),
            options: Vec::new(),
        }
    }
}

impl QueryVariableState {
    /// Creates a state with defaults and the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<serde_json::Value>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the datasource.
    #[must_use]
    pub fn with_datasource(mut self, datasource: DataSourceRef) -> Self {
        self.datasource = Some(datasource);
        self
    }

    /// Sets the filter regex.
    #[must_use]
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    /// Sets the refresh trigger.
    #[must_use]
    pub const fn with_refresh(mut self, refresh: VariableRefresh) -> Self {
        self.refresh = refresh;
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort: VariableSort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the current selection.
    #[must_use]
    pub fn with_current(mut self, value: impl Into<String>, text: impl Into<String>) -> Self {
        self.value = value.into();
        self.text = text.into();
        self
    }

    /// Returns true if there is nothing to query.
    #[must_use]
    pub fn has_empty_query(&self) -> bool {
        matches!(&self.query, serde_json::Value::String(s) if s.is_empty())
    }

    /// Stores newly resolved options and keeps the selection valid.
    ///
    /// A current value found among the options keeps its value and takes
    /// the option's label. Otherwise the first option is selected, or the
    /// selection is cleared when there are no options.
    pub fn apply_options(&mut self, options: Vec<VariableValueOption>) {
        match options.iter().find(|o| o.value == self.value) {
            Some(current) => self.text.clone_from(&current.label),
            None => match options.first() {
                Some(first) => {
                    self.value.clone_from(&first.value);
                    self.text.clone_from(&first.label);
                }
                None => {
                    self.value.clear();
                    self.text.clear();
                }
            },
        }
        self.options = options;
    }
}
