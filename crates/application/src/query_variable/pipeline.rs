//! Option resolution for a single run.

use std::fmt;
use std::sync::Arc;

use dashvar_domain::{
    DataQueryError, LoadingState, PanelData, VariableValueOption, metric_names_to_variable_values,
    to_metric_find_values,
};
use futures_util::StreamExt;

use super::QueryVariable;
use super::gate::DataSourceGate;
use crate::error::{VariableError, VariableResult};
use crate::ports::{InterpolationFormat, RunRequestOptions};

/// Arguments for one option resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableGetOptionsArgs {
    /// Text typed into the variable picker.
    pub search_filter: Option<String>,
}

impl VariableGetOptionsArgs {
    /// Arguments carrying a search filter.
    #[must_use]
    pub fn with_search_filter(filter: impl Into<String>) -> Self {
        Self {
            search_filter: Some(filter.into()),
        }
    }
}

/// Steps of a resolution run, as they appear in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    /// Nothing to query; resolves to no options.
    EmptyResult,
    /// Waiting for the datasource handle.
    AwaitingDatasource,
    /// Request built and sent.
    Requesting,
    /// Waiting for the final snapshot.
    AwaitingTerminalResult,
    /// Turning frames into options.
    Transforming,
    /// Options produced.
    Completed,
    /// The run failed.
    Failed,
}

impl fmt::Display for ResolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EmptyResult => "empty_result",
            Self::AwaitingDatasource => "awaiting_datasource",
            Self::Requesting => "requesting",
            Self::AwaitingTerminalResult => "awaiting_terminal_result",
            Self::Transforming => "transforming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(variable: &str, phase: ResolutionPhase) {
    tracing::debug!(variable, %phase, "variable resolution");
}

impl QueryVariable {
    /// Resolves the variable's options once.
    ///
    /// Produces exactly one outcome. A cancelled query resolves to no
    /// options rather than an error.
    ///
    /// # Errors
    ///
    /// - `VariableError::DataSource` if the datasource cannot be resolved
    /// - `VariableError::Released` if the variable was deactivated while
    ///   the datasource was being resolved. This is a benign outcome: no
    ///   options were produced and callers should ignore it (see
    ///   [`VariableError::is_released`]) instead of surfacing an error
    /// - `VariableError::Query` if the query failed
    /// - `VariableError::NoTerminalResult` if the result stream ended early
    pub async fn get_value_options(
        &self,
        args: &VariableGetOptionsArgs,
    ) -> VariableResult<Vec<VariableValueOption>> {
        let result = self.resolve(args).await;
        if let Err(error) = &result {
            let name = self.name();
            enter(&name, ResolutionPhase::Failed);
            tracing::debug!(variable = %name, %error, "variable resolution failed");
        }
        result
    }

    async fn resolve(
        &self,
        args: &VariableGetOptionsArgs,
    ) -> VariableResult<Vec<VariableValueOption>> {
        let state = self.state();

        let reference = match &state.datasource {
            Some(reference) if !state.has_empty_query() => reference.clone(),
            _ => {
                enter(&state.name, ResolutionPhase::EmptyResult);
                return Ok(Vec::new());
            }
        };

        enter(&state.name, ResolutionPhase::AwaitingDatasource);
        let gate = DataSourceGate::open(Arc::clone(&self.datasources), reference);
        self.track_gate(gate.release_token());
        let datasource = gate.wait().await?;

        let target = datasource.get_target(&state);
        let request = self.requests.build(target, &state);
        let request_id = request.request_id.clone();

        enter(&state.name, ResolutionPhase::Requesting);
        let options = RunRequestOptions {
            search_filter: args.search_filter.clone(),
        };
        let mut snapshots = datasource.run_request(options, request);

        enter(&state.name, ResolutionPhase::AwaitingTerminalResult);
        let terminal = loop {
            match snapshots.next().await {
                Some(snapshot) if snapshot.is_terminal() => break snapshot,
                Some(_) => {}
                None => return Err(VariableError::NoTerminalResult { request_id }),
            }
        };
        drop(snapshots);

        let series = match terminal {
            PanelData {
                state: LoadingState::Error,
                error,
                ..
            } => {
                let error = error.unwrap_or_else(|| DataQueryError::new("query failed"));
                if error.cancelled {
                    tracing::debug!(variable = %state.name, %request_id, "query cancelled");
                    return Ok(Vec::new());
                }
                return Err(VariableError::Query(error));
            }
            PanelData { series, .. } => series,
        };

        enter(&state.name, ResolutionPhase::Transforming);
        let values = to_metric_find_values(&series);
        let regex = self
            .interpolator
            .interpolate(&state.regex, None, InterpolationFormat::Regex);
        let options = metric_names_to_variable_values(&regex, state.sort, &values);

        tracing::debug!(
            variable = %state.name,
            %request_id,
            count = options.len(),
            "variable options resolved"
        );
        enter(&state.name, ResolutionPhase::Completed);
        Ok(options)
    }
}
