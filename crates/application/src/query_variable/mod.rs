//! Query-driven variables.
//!
//! A [`QueryVariable`] resolves its options by running its query against a
//! datasource. Resolution runs through a fixed pipeline:
//!
//! 1. short-circuit when there is no query or no datasource
//! 2. resolve the datasource through a per-run [`DataSourceGate`]
//! 3. build the request with [`RequestBuilder`] and run it
//! 4. wait for the first final snapshot
//! 5. turn the frames into options, filter them with the regex and sort them
//!
//! The lifecycle half activates the variable, re-resolves it when the time
//! range changes and applies results to the state, newest run only.

mod gate;
mod lifecycle;
mod pipeline;
mod request;
mod runner;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use dashvar_domain::{QueryVariableState, VariableValueOption};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ports::{Clock, DataSourceRegistry, TemplateInterpolator, TimeRangeSource};

pub use gate::DataSourceGate;
pub use pipeline::{ResolutionPhase, VariableGetOptionsArgs};
pub use request::RequestBuilder;
pub use runner::{LegacyQueryRunner, MetricFindOptions, MetricFindSource};

use lifecycle::{Activation, RunTracker};

/// Services a query variable talks to.
#[derive(Clone)]
pub struct VariableServices {
    /// Resolves datasource references.
    pub datasources: Arc<dyn DataSourceRegistry>,
    /// Dashboard time range.
    pub time_range: Arc<dyn TimeRangeSource>,
    /// Interpolates the regex.
    pub interpolator: Arc<dyn TemplateInterpolator>,
    /// Source of the current time.
    pub clock: Arc<dyn Clock>,
}

/// A dashboard variable whose options come from a datasource query.
pub struct QueryVariable {
    state: watch::Sender<QueryVariableState>,
    datasources: Arc<dyn DataSourceRegistry>,
    time_range: Arc<dyn TimeRangeSource>,
    interpolator: Arc<dyn TemplateInterpolator>,
    requests: RequestBuilder,
    runs: RunTracker,
    gate: Mutex<Option<CancellationToken>>,
    current_run: Mutex<Option<JoinHandle<()>>>,
    activation: Mutex<Option<Activation>>,
}

impl QueryVariable {
    /// Creates an inactive variable.
    #[must_use]
    pub fn new(state: QueryVariableState, services: VariableServices) -> Self {
        Self {
            state: watch::Sender::new(state),
            requests: RequestBuilder::new(Arc::clone(&services.time_range), services.clock),
            datasources: services.datasources,
            time_range: services.time_range,
            interpolator: services.interpolator,
            runs: RunTracker::default(),
            gate: Mutex::new(None),
            current_run: Mutex::new(None),
            activation: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> QueryVariableState {
        self.state.borrow().clone()
    }

    /// Name of the variable.
    #[must_use]
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Options applied by the newest completed run.
    #[must_use]
    pub fn options(&self) -> Vec<VariableValueOption> {
        self.state.borrow().options.clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe_to_state(&self) -> watch::Receiver<QueryVariableState> {
        self.state.subscribe()
    }

    /// Changes the variable's configuration.
    ///
    /// Takes effect on the next resolution run.
    pub fn update_state(&self, update: impl FnOnce(&mut QueryVariableState)) {
        self.state.send_modify(update);
    }

    /// Keeps the release token of the newest gate.
    ///
    /// The previous gate is discarded, not released.
    fn track_gate(&self, token: CancellationToken) {
        *self.gate.lock() = Some(token);
    }
}

impl std::fmt::Debug for QueryVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryVariable")
            .field("state", &*self.state.borrow())
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
