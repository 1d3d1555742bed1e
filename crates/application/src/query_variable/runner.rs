//! Adapter for datasources that only answer "metric find" queries.

use std::sync::Arc;

use async_trait::async_trait;
use dashvar_domain::{
    DataQueryError, DataQueryRequest, MetricFindValue, PanelData, ScopedVars, TimeRange,
    metric_find_values_to_frame,
};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};

use crate::ports::{DataSourceApi, RunRequestOptions};

/// Options handed to a metric find query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFindOptions {
    /// Range the query should cover.
    pub range: TimeRange,
    /// Text typed into the variable picker.
    pub search_filter: Option<String>,
    /// Variables visible to the query.
    pub scoped_vars: ScopedVars,
}

/// A datasource that resolves variable queries to a flat list of values.
#[async_trait]
pub trait MetricFindSource: Send + Sync {
    /// Unique identifier of the datasource.
    fn uid(&self) -> &str;

    /// Runs a variable query.
    ///
    /// # Errors
    ///
    /// Returns a `DataQueryError` if the query fails. Errors tagged as
    /// cancelled are treated as an empty result by callers.
    async fn metric_find_query(
        &self,
        query: &serde_json::Value,
        options: MetricFindOptions,
    ) -> Result<Vec<MetricFindValue>, DataQueryError>;
}

/// Exposes a [`MetricFindSource`] through the streaming request interface.
///
/// Each request yields a `Loading` snapshot followed by a single terminal
/// snapshot: `Done` with one frame built from the values, or `Error`.
pub struct LegacyQueryRunner<S> {
    source: Arc<S>,
}

impl<S: MetricFindSource + 'static> LegacyQueryRunner<S> {
    /// Wraps a metric find source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: MetricFindSource + 'static> DataSourceApi for LegacyQueryRunner<S> {
    fn uid(&self) -> &str {
        self.source.uid()
    }

    fn run_request(
        &self,
        options: RunRequestOptions,
        request: DataQueryRequest,
    ) -> BoxStream<'static, PanelData> {
        let source = Arc::clone(&self.source);

        let result = async move {
            let Some(target) = request.targets.into_iter().next() else {
                return PanelData::done(Vec::new());
            };
            let find_options = MetricFindOptions {
                range: request.range,
                search_filter: options.search_filter,
                scoped_vars: request.scoped_vars,
            };

            match source.metric_find_query(&target.query, find_options).await {
                Ok(values) => {
                    tracing::trace!(count = values.len(), "metric find query returned");
                    PanelData::done(vec![metric_find_values_to_frame(&values)])
                }
                Err(mut error) => {
                    error.ref_id.get_or_insert(target.ref_id);
                    PanelData::error(error)
                }
            }
        };

        stream::once(async { PanelData::loading() })
            .chain(stream::once(result))
            .boxed()
    }
}
