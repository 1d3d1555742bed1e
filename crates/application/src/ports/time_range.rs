//! Time range port

use dashvar_domain::TimeRange;
use tokio::sync::watch;

/// Port exposing the dashboard's current time range.
pub trait TimeRangeSource: Send + Sync {
    /// Returns the current time range.
    fn current(&self) -> TimeRange;

    /// Subscribes to time range changes.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> watch::Receiver<TimeRange>;
}
