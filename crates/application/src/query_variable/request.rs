//! Request construction for variable queries.

use std::sync::Arc;

use dashvar_domain::{
    CoreApp, DataQuery, DataQueryRequest, QueryVariableState, ScopedVar, ScopedVars, TimeRange,
    generate_request_id,
};

use crate::ports::{Clock, TimeRangeSource};

/// Builds execution requests for a variable's query target.
#[derive(Clone)]
pub struct RequestBuilder {
    time_range: Arc<dyn TimeRangeSource>,
    clock: Arc<dyn Clock>,
}

impl RequestBuilder {
    /// Creates a builder reading the live range and the current time from
    /// the given ports.
    #[must_use]
    pub fn new(time_range: Arc<dyn TimeRangeSource>, clock: Arc<dyn Clock>) -> Self {
        Self { time_range, clock }
    }

    /// Assembles the request for one resolution attempt.
    ///
    /// Variables refreshed on time range change query the live range;
    /// every other variable queries the default range so its requests stay
    /// stable. The variable itself is always available as a scoped
    /// variable under its own name.
    #[must_use]
    pub fn build(&self, target: DataQuery, variable: &QueryVariableState) -> DataQueryRequest {
        let now = self.clock.now();

        let mut scoped_vars = ScopedVars::new();
        scoped_vars.insert(
            variable.name.clone(),
            ScopedVar::new(variable.text.clone(), variable.value.clone()),
        );

        let range = if variable.refresh.follows_time_range() {
            self.time_range.current()
        } else {
            TimeRange::default_at(now)
        };

        DataQueryRequest {
            app: CoreApp::Dashboard,
            request_id: generate_request_id(),
            timezone: String::new(),
            range,
            interval: String::new(),
            interval_ms: 0,
            targets: vec![target],
            scoped_vars,
            start_time: now,
        }
    }
}
