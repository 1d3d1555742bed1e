//! Settable dashboard time range.

use chrono::{DateTime, Duration, Utc};
use dashvar_application::ports::TimeRangeSource;
use dashvar_domain::TimeRange;
use tokio::sync::watch;

/// Dashboard time range backed by a watch channel.
///
/// Every [`WatchTimeRange::set`] notifies all subscribers, including when
/// the range did not change.
#[derive(Debug)]
pub struct WatchTimeRange {
    sender: watch::Sender<TimeRange>,
}

impl WatchTimeRange {
    /// Creates a source holding `range`.
    #[must_use]
    pub fn new(range: TimeRange) -> Self {
        Self {
            sender: watch::Sender::new(range),
        }
    }

    /// Creates a source holding the default range ending at `now`.
    #[must_use]
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self::new(TimeRange::default_at(now))
    }

    /// Replaces the range.
    pub fn set(&self, range: TimeRange) {
        tracing::debug!(from = %range.from, to = %range.to, "time range set");
        self.sender.send_replace(range);
    }

    /// Moves the range to the last `span` before `now`.
    pub fn set_last(&self, span: Duration, now: DateTime<Utc>) {
        self.set(TimeRange::last(span, now));
    }
}

impl TimeRangeSource for WatchTimeRange {
    fn current(&self) -> TimeRange {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<TimeRange> {
        self.sender.subscribe()
    }
}
