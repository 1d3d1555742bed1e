//! Activation and state updates.

use std::sync::{Arc, Weak};

use dashvar_domain::VariableRefresh;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::QueryVariable;
use super::pipeline::VariableGetOptionsArgs;
use crate::error::VariableResult;

/// Scope of an active variable.
pub(super) struct Activation {
    scope: CancellationToken,
}

/// Hands out monotonic run ids and applies results for the newest run
/// only.
#[derive(Debug, Default)]
pub(super) struct RunTracker {
    latest: Mutex<u64>,
}

impl RunTracker {
    /// Starts a new run, superseding every earlier one.
    pub(super) fn next(&self) -> u64 {
        let mut latest = self.latest.lock();
        *latest += 1;
        *latest
    }

    /// Supersedes every run started so far.
    pub(super) fn invalidate(&self) {
        *self.latest.lock() += 1;
    }

    /// Runs `apply` if `run` is still the newest run.
    ///
    /// Holds the tracker lock while applying, so a concurrent
    /// [`RunTracker::invalidate`] either happens before or after the
    /// whole update.
    pub(super) fn apply_if_current(&self, run: u64, apply: impl FnOnce()) -> bool {
        let latest = self.latest.lock();
        if *latest != run {
            return false;
        }
        apply();
        drop(latest);
        true
    }
}

impl QueryVariable {
    /// Activates the variable.
    ///
    /// Starts an initial resolution unless the variable never refreshes.
    /// Variables refreshed on time range change also re-resolve on every
    /// range change. Activating an active variable does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(self: &Arc<Self>) {
        let mut activation = self.activation.lock();
        if activation.is_some() {
            return;
        }

        let scope = CancellationToken::new();
        let refresh = self.state.borrow().refresh;

        if refresh != VariableRefresh::Never {
            self.spawn_update();
        }
        if refresh.follows_time_range() {
            self.watch_time_range(scope.clone());
        }

        tracing::debug!(variable = %self.name(), %refresh, "variable activated");
        *activation = Some(Activation { scope });
    }

    /// Deactivates the variable.
    ///
    /// Stops listening to the time range, aborts the running resolution and
    /// releases its datasource gate. No state update happens after this
    /// returns.
    pub fn deactivate(&self) {
        let mut activation = self.activation.lock();
        if let Some(active) = activation.take() {
            active.scope.cancel();
            tracing::debug!(variable = %self.name(), "variable deactivated");
        }

        self.runs.invalidate();
        if let Some(run) = self.current_run.lock().take() {
            run.abort();
        }
        if let Some(gate) = self.gate.lock().take() {
            gate.cancel();
        }
        drop(activation);
    }

    /// Returns true while the variable is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.activation.lock().is_some()
    }

    /// Resolves the options and applies them to the state.
    ///
    /// The result is dropped if a newer run started in the meantime or the
    /// variable was deactivated. When applied, the current selection is
    /// kept if it is still among the options, otherwise the first option
    /// is selected.
    ///
    /// # Errors
    ///
    /// Returns the resolution error; the previous options are kept.
    pub async fn validate_and_update(&self) -> VariableResult<()> {
        let run = self.runs.next();
        self.update_for_run(run).await
    }

    async fn update_for_run(&self, run: u64) -> VariableResult<()> {
        let options = self
            .get_value_options(&VariableGetOptionsArgs::default())
            .await?;

        let applied = self.runs.apply_if_current(run, || {
            self.state.send_modify(|state| state.apply_options(options));
        });
        if !applied {
            tracing::debug!(variable = %self.name(), run, "discarding stale variable options");
        }
        Ok(())
    }

    /// Starts a background update, aborting the one in flight.
    fn spawn_update(self: &Arc<Self>) {
        let run = self.runs.next();
        let variable = Arc::clone(self);

        let handle = tokio::spawn(async move {
            match variable.update_for_run(run).await {
                Ok(()) => {}
                Err(error) if error.is_released() => {}
                Err(error) => {
                    tracing::warn!(
                        variable = %variable.name(),
                        %error,
                        "failed to update variable options"
                    );
                }
            }
        });

        if let Some(previous) = self.current_run.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Starts a background update unless `scope` was cancelled.
    ///
    /// Checked under the activation lock, so a concurrent
    /// [`QueryVariable::deactivate`] either sees and aborts the new run or
    /// prevents it from starting.
    fn spawn_update_in(self: &Arc<Self>, scope: &CancellationToken) {
        let _activation = self.activation.lock();
        if scope.is_cancelled() {
            return;
        }
        self.spawn_update();
    }

    fn watch_time_range(self: &Arc<Self>, scope: CancellationToken) {
        let mut changes = self.time_range.subscribe();
        let variable: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = scope.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let Some(variable) = variable.upgrade() else {
                            break;
                        };
                        tracing::debug!(variable = %variable.name(), "time range changed");
                        variable.spawn_update_in(&scope);
                    }
                }
            }
        });
    }
}
