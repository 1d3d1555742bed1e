//! Resolve-once datasource gate.
//!
//! Every resolution run opens its own gate. The gate spawns the registry
//! lookup and hands the result over a oneshot channel, so exactly one
//! resolution is in flight per run. Dropping a gate discards it: a lookup
//! that completes later sends into a closed channel and is ignored.

use std::sync::Arc;

use dashvar_domain::DataSourceRef;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{VariableError, VariableResult};
use crate::ports::{DataSourceApi, DataSourceError, DataSourceRegistry};

type Resolution = Result<Arc<dyn DataSourceApi>, DataSourceError>;

/// A single pending datasource resolution.
pub struct DataSourceGate {
    receiver: oneshot::Receiver<Resolution>,
    release: CancellationToken,
}

impl DataSourceGate {
    /// Starts resolving `reference` through `registry`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn open(registry: Arc<dyn DataSourceRegistry>, reference: DataSourceRef) -> Self {
        let (sender, receiver) = oneshot::channel();
        let release = CancellationToken::new();
        let token = release.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::trace!(datasource = %reference, "datasource resolution released");
                }
                result = registry.get(&reference) => {
                    // nobody listens once the gate was discarded
                    let _ = sender.send(result);
                }
            }
        });

        Self { receiver, release }
    }

    /// Token that releases this gate when cancelled.
    #[must_use]
    pub fn release_token(&self) -> CancellationToken {
        self.release.clone()
    }

    /// Waits for the datasource.
    ///
    /// # Errors
    ///
    /// Returns `VariableError::DataSource` if the registry failed, or
    /// `VariableError::Released` if the gate was released first. A release
    /// is not a failure and callers should ignore it.
    pub async fn wait(self) -> VariableResult<Arc<dyn DataSourceApi>> {
        match self.receiver.await {
            Ok(Ok(datasource)) => Ok(datasource),
            Ok(Err(error)) => Err(VariableError::DataSource(error)),
            Err(_) => Err(VariableError::Released),
        }
    }
}
