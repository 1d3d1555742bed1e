//! Test doubles shared by the query variable tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashvar_domain::{
    DataFrame, DataQueryRequest, DataSourceRef, Field, PanelData, QueryVariableState, ScopedVars,
    TimeRange,
};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use parking_lot::Mutex;
use tokio::sync::watch;

use super::{QueryVariable, VariableServices};
use crate::ports::{
    Clock, DataSourceApi, DataSourceError, DataSourceRegistry, InterpolationFormat,
    RunRequestOptions, TemplateInterpolator, TimeRangeSource,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

pub struct TestTimeRange {
    sender: watch::Sender<TimeRange>,
}

impl TestTimeRange {
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(TimeRange::last(Duration::hours(1), now())),
        }
    }

    pub fn set(&self, range: TimeRange) {
        self.sender.send_replace(range);
    }
}

impl TimeRangeSource for TestTimeRange {
    fn current(&self) -> TimeRange {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<TimeRange> {
        self.sender.subscribe()
    }
}

/// Replaces `$name` tokens from a fixed table, escaping for regex use.
#[derive(Default)]
pub struct TableInterpolator {
    values: HashMap<String, String>,
}

impl TableInterpolator {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl TemplateInterpolator for TableInterpolator {
    fn interpolate(
        &self,
        text: &str,
        _scoped_vars: Option<&ScopedVars>,
        format: InterpolationFormat,
    ) -> String {
        self.values.iter().fold(text.to_string(), |acc, (name, value)| {
            let value = match format {
                InterpolationFormat::Raw => value.clone(),
                InterpolationFormat::Regex => regex::escape(value),
            };
            acc.replace(&format!("${name}"), &value)
        })
    }
}

/// A datasource that replays a fixed list of snapshots per request.
pub struct ScriptedDataSource {
    uid: String,
    snapshots: Mutex<Vec<PanelData>>,
    pub requests: Mutex<Vec<(RunRequestOptions, DataQueryRequest)>>,
}

impl ScriptedDataSource {
    pub fn new(uid: &str, snapshots: Vec<PanelData>) -> Arc<Self> {
        Arc::new(Self {
            uid: uid.to_string(),
            snapshots: Mutex::new(snapshots),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn rows(uid: &str, texts: &[&str]) -> Arc<Self> {
        Self::new(
            uid,
            vec![PanelData::loading(), PanelData::done(vec![frame(texts)])],
        )
    }

    pub fn set_snapshots(&self, snapshots: Vec<PanelData>) {
        *self.snapshots.lock() = snapshots;
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl DataSourceApi for ScriptedDataSource {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn run_request(
        &self,
        options: RunRequestOptions,
        request: DataQueryRequest,
    ) -> BoxStream<'static, PanelData> {
        self.requests.lock().push((options, request));
        stream::iter(self.snapshots.lock().clone()).boxed()
    }
}

pub fn frame(texts: &[&str]) -> DataFrame {
    DataFrame::new(vec![Field::strings("text", texts.iter().copied())])
}

/// Registry over scripted datasources.
///
/// While held, lookups wait until [`TestRegistry::release`] is called.
#[derive(Default)]
pub struct TestRegistry {
    datasources: HashMap<String, Arc<ScriptedDataSource>>,
    held: Option<watch::Sender<bool>>,
    pub lookups: AtomicUsize,
}

impl TestRegistry {
    pub fn with(mut self, datasource: Arc<ScriptedDataSource>) -> Self {
        self.datasources.insert(datasource.uid.clone(), datasource);
        self
    }

    pub fn held(mut self) -> Self {
        self.held = Some(watch::Sender::new(false));
        self
    }

    pub fn release(&self) {
        if let Some(held) = &self.held {
            held.send_replace(true);
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSourceRegistry for TestRegistry {
    async fn get(
        &self,
        reference: &DataSourceRef,
    ) -> Result<Arc<dyn DataSourceApi>, DataSourceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(held) = &self.held {
            let _ = held.subscribe().wait_for(|open| *open).await;
        }
        let uid = reference.uid.clone().unwrap_or_default();
        self.datasources
            .get(&uid)
            .map(|ds| Arc::clone(ds) as Arc<dyn DataSourceApi>)
            .ok_or(DataSourceError::NotFound(uid))
    }
}

pub struct Fixture {
    pub registry: Arc<TestRegistry>,
    pub time_range: Arc<TestTimeRange>,
    pub interpolator: Arc<TableInterpolator>,
}

impl Fixture {
    pub fn new(registry: TestRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            time_range: Arc::new(TestTimeRange::new()),
            interpolator: Arc::new(TableInterpolator::default()),
        }
    }

    pub fn with_interpolator(mut self, interpolator: TableInterpolator) -> Self {
        self.interpolator = Arc::new(interpolator);
        self
    }

    pub fn services(&self) -> VariableServices {
        VariableServices {
            datasources: self.registry.clone(),
            time_range: self.time_range.clone(),
            interpolator: self.interpolator.clone(),
            clock: Arc::new(FixedClock),
        }
    }

    pub fn variable(&self, state: QueryVariableState) -> Arc<QueryVariable> {
        Arc::new(QueryVariable::new(state, self.services()))
    }
}
