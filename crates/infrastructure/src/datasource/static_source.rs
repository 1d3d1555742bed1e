//! Datasources serving configured data.

use async_trait::async_trait;
use dashvar_application::ports::{DataSourceApi, RunRequestOptions};
use dashvar_application::query_variable::{MetricFindOptions, MetricFindSource};
use dashvar_domain::{DataFrame, DataQueryError, DataQueryRequest, MetricFindValue, PanelData};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};

/// What a [`StaticDataSource`] answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticOutcome {
    /// The configured frames.
    Frames(Vec<DataFrame>),
    /// A query failure.
    Failure(DataQueryError),
}

/// Datasource answering every request with the same frames.
///
/// Each request yields a `Loading` snapshot followed by `Done` or `Error`.
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    uid: String,
    outcome: StaticOutcome,
}

impl StaticDataSource {
    /// Datasource answering with `frames`.
    #[must_use]
    pub fn new(uid: impl Into<String>, frames: Vec<DataFrame>) -> Self {
        Self {
            uid: uid.into(),
            outcome: StaticOutcome::Frames(frames),
        }
    }

    /// Datasource failing every request with `error`.
    #[must_use]
    pub fn failing(uid: impl Into<String>, error: DataQueryError) -> Self {
        Self {
            uid: uid.into(),
            outcome: StaticOutcome::Failure(error),
        }
    }

    /// Datasource whose requests are always cancelled.
    #[must_use]
    pub fn cancelled(uid: impl Into<String>) -> Self {
        Self::failing(uid, DataQueryError::cancelled())
    }
}

impl DataSourceApi for StaticDataSource {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn run_request(
        &self,
        _options: RunRequestOptions,
        request: DataQueryRequest,
    ) -> BoxStream<'static, PanelData> {
        tracing::trace!(uid = %self.uid, request_id = %request.request_id, "static request");
        let terminal = match &self.outcome {
            StaticOutcome::Frames(frames) => PanelData::done(frames.clone()),
            StaticOutcome::Failure(error) => PanelData::error(error.clone()),
        };
        stream::iter([PanelData::loading(), terminal]).boxed()
    }
}

/// Metric find source over a fixed list of values.
///
/// The query is a case-insensitive substring of the text; `*` or an empty
/// query matches everything. The search filter narrows the result the
/// same way.
#[derive(Debug, Clone)]
pub struct StaticValuesSource {
    uid: String,
    values: Vec<MetricFindValue>,
}

impl StaticValuesSource {
    /// Creates a source serving `values`.
    #[must_use]
    pub fn new(uid: impl Into<String>, values: Vec<MetricFindValue>) -> Self {
        Self {
            uid: uid.into(),
            values,
        }
    }
}

fn contains_ignore_case(text: &str, needle: &str) -> bool {
    needle.is_empty() || needle == "*" || text.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl MetricFindSource for StaticValuesSource {
    fn uid(&self) -> &str {
        &self.uid
    }

    async fn metric_find_query(
        &self,
        query: &serde_json::Value,
        options: MetricFindOptions,
    ) -> Result<Vec<MetricFindValue>, DataQueryError> {
        let pattern = match query {
            serde_json::Value::String(s) => s.as_str(),
            serde_json::Value::Null => "",
            other => {
                return Err(DataQueryError::new(format!(
                    "unsupported query for static values: {other}"
                )));
            }
        };
        let filter = options.search_filter.unwrap_or_default();

        Ok(self
            .values
            .iter()
            .filter(|v| contains_ignore_case(&v.text, pattern))
            .filter(|v| contains_ignore_case(&v.text, &filter))
            .cloned()
            .collect())
    }
}
