//! Dashboard assembly from a definition.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashvar_application::ports::{Clock, DataSourceApi};
use dashvar_application::query_variable::{LegacyQueryRunner, QueryVariable, VariableServices};
use dashvar_application::VariableResult;
use dashvar_domain::{QueryVariableState, ScopedVar};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::adapters::WatchTimeRange;
use crate::datasource::{
    HttpDataSource, InMemoryDataSourceRegistry, StaticDataSource, StaticValuesSource,
};
use crate::definition::{DashboardDefinition, DataSourceDefinition, DefinitionError, DefinitionResult};
use crate::interpolation::TemplateSrv;

/// A dashboard: its time range, its datasources and its query variables.
///
/// The current selection of every variable is published to the
/// dashboard's [`TemplateSrv`], so variables can reference the variables
/// defined before them.
pub struct Dashboard {
    time_range: Arc<WatchTimeRange>,
    templates: Arc<TemplateSrv>,
    variables: Vec<Arc<QueryVariable>>,
    publishers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Builds a dashboard from its definition.
    ///
    /// # Errors
    ///
    /// Returns an error if a datasource cannot be created or two variables
    /// share a name.
    pub fn build(definition: DashboardDefinition, clock: Arc<dyn Clock>) -> DefinitionResult<Self> {
        let time_range = Arc::new(WatchTimeRange::new(
            definition.initial_time_range(clock.now()),
        ));
        let templates = Arc::new(TemplateSrv::new());

        let mut registry = InMemoryDataSourceRegistry::new();
        for datasource in definition.datasources {
            registry.register(build_datasource(datasource)?);
        }
        if let Some(uid) = definition.default_datasource {
            registry = registry.with_default(uid);
        }

        let services = VariableServices {
            datasources: Arc::new(registry),
            time_range: time_range.clone(),
            interpolator: templates.clone(),
            clock,
        };

        let mut names = HashSet::new();
        let mut variables = Vec::with_capacity(definition.variables.len());
        for state in definition.variables {
            if !names.insert(state.name.clone()) {
                return Err(DefinitionError::DuplicateVariable(state.name));
            }
            publish(&templates, &state);
            variables.push(Arc::new(QueryVariable::new(state, services.clone())));
        }

        Ok(Self {
            time_range,
            templates,
            variables,
            publishers: Mutex::new(Vec::new()),
        })
    }

    /// Variables in definition order.
    #[must_use]
    pub fn variables(&self) -> &[Arc<QueryVariable>] {
        &self.variables
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Arc<QueryVariable>> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// The dashboard time range.
    #[must_use]
    pub fn time_range(&self) -> &WatchTimeRange {
        &self.time_range
    }

    /// The dashboard's interpolation service.
    #[must_use]
    pub fn templates(&self) -> &TemplateSrv {
        &self.templates
    }

    /// Resolves every variable once, in definition order.
    ///
    /// Each variable sees the selection of the variables resolved before
    /// it. A failing variable keeps its previous options and does not stop
    /// the others.
    pub async fn resolve_all(&self) -> Vec<(String, VariableResult<()>)> {
        let mut results = Vec::with_capacity(self.variables.len());
        for variable in &self.variables {
            let result = variable.validate_and_update().await;
            publish(&self.templates, &variable.state());
            results.push((variable.name(), result));
        }
        results
    }

    /// Activates every variable and keeps the published selections in sync
    /// with their state.
    ///
    /// Activating an active dashboard does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(&self) {
        let mut publishers = self.publishers.lock();
        if !publishers.is_empty() {
            return;
        }
        for variable in &self.variables {
            let mut changes = variable.subscribe_to_state();
            let templates = Arc::clone(&self.templates);
            publishers.push(tokio::spawn(async move {
                while changes.changed().await.is_ok() {
                    let state = changes.borrow_and_update().clone();
                    publish(&templates, &state);
                }
            }));
            variable.activate();
        }
    }

    /// Deactivates every variable.
    pub fn deactivate(&self) {
        for variable in &self.variables {
            variable.deactivate();
        }
        for publisher in self.publishers.lock().drain(..) {
            publisher.abort();
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn publish(templates: &TemplateSrv, state: &QueryVariableState) {
    templates.set_variable(
        state.name.clone(),
        ScopedVar::new(state.text.clone(), state.value.clone()),
    );
}

fn build_datasource(definition: DataSourceDefinition) -> DefinitionResult<Arc<dyn DataSourceApi>> {
    let datasource: Arc<dyn DataSourceApi> = match definition {
        DataSourceDefinition::Frames { uid, frames } => Arc::new(StaticDataSource::new(uid, frames)),
        DataSourceDefinition::Values { uid, values } => {
            Arc::new(LegacyQueryRunner::new(StaticValuesSource::new(uid, values)))
        }
        DataSourceDefinition::Http {
            uid,
            url,
            timeout_ms,
        } => {
            let datasource =
                HttpDataSource::new(uid.clone(), url).map_err(|e| DefinitionError::DataSource {
                    uid,
                    message: e.to_string(),
                })?;
            match timeout_ms {
                Some(ms) => Arc::new(datasource.with_timeout(Duration::from_millis(ms))),
                None => Arc::new(datasource),
            }
        }
    };
    Ok(datasource)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::SystemClock;
    use dashvar_domain::{DataSourceRef, MetricFindValue};
    use pretty_assertions::assert_eq;

    fn definition() -> DashboardDefinition {
        DashboardDefinition {
            datasources: vec![DataSourceDefinition::Values {
                uid: "hosts".to_string(),
                values: vec![
                    MetricFindValue::text("prod-web-1"),
                    MetricFindValue::text("prod-web-2"),
                    MetricFindValue::text("staging-web-1"),
                ],
            }],
            variables: vec![
                QueryVariableState::new("env")
                    .with_query("*")
                    .with_datasource(DataSourceRef::new("hosts"))
                    .with_regex("/^(\\w+)-/")
                    .with_current("staging", "staging"),
                QueryVariableState::new("host")
                    .with_query("*")
                    .with_datasource(DataSourceRef::new("hosts"))
                    .with_regex("/^$env-(.*)/"),
            ],
            ..DashboardDefinition::default()
        }
    }

    #[tokio::test]
    async fn test_chained_variables() {
        let dashboard = Dashboard::build(definition(), Arc::new(SystemClock)).unwrap();

        let results = dashboard.resolve_all().await;
        assert!(results.iter().all(|(_, result)| result.is_ok()));

        let env = dashboard.variable("env").unwrap().state();
        let env_values: Vec<_> = env.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(env_values, vec!["prod", "prod", "staging"]);
        assert_eq!(env.value, "staging");

        let host = dashboard.variable("host").unwrap().state();
        let host_values: Vec<_> = host.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(host_values, vec!["web-1"]);
        assert_eq!(dashboard.templates().variable("host").unwrap().value, "web-1");
    }

    #[tokio::test]
    async fn test_activate_twice_keeps_one_publisher_per_variable() {
        let dashboard = Dashboard::build(definition(), Arc::new(SystemClock)).unwrap();

        dashboard.activate();
        dashboard.activate();
        assert_eq!(dashboard.publishers.lock().len(), dashboard.variables().len());

        dashboard.deactivate();
        assert!(dashboard.publishers.lock().is_empty());
        assert!(dashboard.variables().iter().all(|v| !v.is_active()));
    }

    #[test]
    fn test_duplicate_variables_rejected() {
        let mut definition = definition();
        definition.variables.push(QueryVariableState::new("env"));

        let error = Dashboard::build(definition, Arc::new(SystemClock)).err().unwrap();
        assert!(matches!(error, DefinitionError::DuplicateVariable(ref name) if name == "env"));
    }
}
