//! Datasource ports
//!
//! A [`DataSourceRegistry`] turns a [`DataSourceRef`] into a shared
//! [`DataSourceApi`] handle. The handle builds query targets and runs
//! requests, answering with a stream of result snapshots.

use std::sync::Arc;

use async_trait::async_trait;
use dashvar_domain::{DataQuery, DataQueryRequest, DataSourceRef, PanelData, QueryVariableState};
use futures_util::stream::BoxStream;

/// Errors that can occur while resolving a datasource.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DataSourceError {
    /// No datasource matches the reference.
    #[error("datasource not found: {0}")]
    NotFound(String),

    /// The datasource exists but cannot be reached or initialised.
    #[error("datasource unavailable: {0}")]
    Unavailable(String),
}

/// Options passed alongside a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequestOptions {
    /// Text typed into the variable picker, forwarded as-is.
    pub search_filter: Option<String>,
}

/// A resolved datasource, shared between variables and panels.
///
/// Implementations must not rely on being mutated by callers; every
/// method takes `&self`.
pub trait DataSourceApi: Send + Sync {
    /// Unique identifier of the datasource.
    fn uid(&self) -> &str;

    /// Builds the query target for a variable.
    ///
    /// The default uses the variable's query as-is with ref id `A`.
    fn get_target(&self, variable: &QueryVariableState) -> DataQuery {
        DataQuery::new("A", variable.query.clone()).with_datasource(variable.datasource.clone())
    }

    /// Runs a request.
    ///
    /// The stream yields snapshots until (and possibly after) a terminal
    /// `Done` or `Error` snapshot.
    fn run_request(
        &self,
        options: RunRequestOptions,
        request: DataQueryRequest,
    ) -> BoxStream<'static, PanelData>;
}

/// Registry resolving datasource references.
#[async_trait]
pub trait DataSourceRegistry: Send + Sync {
    /// Resolves a reference to a datasource handle.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::NotFound` for unknown references and
    /// `DataSourceError::Unavailable` when the datasource cannot be loaded.
    async fn get(&self, reference: &DataSourceRef)
    -> Result<Arc<dyn DataSourceApi>, DataSourceError>;
}
