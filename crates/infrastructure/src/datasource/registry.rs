//! In-memory datasource registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashvar_application::ports::{DataSourceApi, DataSourceError, DataSourceRegistry};
use dashvar_domain::DataSourceRef;

/// Registry of datasources known up front, looked up by uid.
///
/// References without a uid resolve to the default datasource, if one is
/// configured.
#[derive(Default)]
pub struct InMemoryDataSourceRegistry {
    datasources: HashMap<String, Arc<dyn DataSourceApi>>,
    default_uid: Option<String>,
}

impl InMemoryDataSourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a datasource under its uid, replacing any previous one.
    pub fn register(&mut self, datasource: Arc<dyn DataSourceApi>) {
        let uid = datasource.uid().to_string();
        tracing::debug!(%uid, "datasource registered");
        self.datasources.insert(uid, datasource);
    }

    /// Registers a datasource, builder style.
    #[must_use]
    pub fn with(mut self, datasource: Arc<dyn DataSourceApi>) -> Self {
        self.register(datasource);
        self
    }

    /// Sets the datasource used for references without a uid.
    #[must_use]
    pub fn with_default(mut self, uid: impl Into<String>) -> Self {
        self.default_uid = Some(uid.into());
        self
    }

    /// Number of registered datasources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.datasources.len()
    }

    /// Returns true if no datasource is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }
}

#[async_trait]
impl DataSourceRegistry for InMemoryDataSourceRegistry {
    async fn get(
        &self,
        reference: &DataSourceRef,
    ) -> Result<Arc<dyn DataSourceApi>, DataSourceError> {
        let uid = reference
            .uid
            .as_deref()
            .or(self.default_uid.as_deref())
            .ok_or_else(|| DataSourceError::NotFound("default datasource".to_string()))?;

        self.datasources
            .get(uid)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(uid.to_string()))
    }
}
