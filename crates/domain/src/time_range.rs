//! Dashboard time ranges.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Span of the default range used by queries that are not bound to the
/// dashboard time range.
pub const DEFAULT_RANGE_HOURS: i64 = 6;

/// The time range as the user expressed it (e.g. `now-6h` .. `now`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimeRange {
    /// Raw start expression.
    pub from: String,
    /// Raw end expression.
    pub to: String,
}

/// An absolute time range together with its raw expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Range start.
    pub from: DateTime<Utc>,
    /// Range end.
    pub to: DateTime<Utc>,
    /// Raw expression the range was derived from.
    pub raw: RawTimeRange,
}

impl TimeRange {
    /// Creates an absolute range; the raw form is the RFC 3339 timestamps.
    #[must_use]
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            raw: RawTimeRange {
                from: from.to_rfc3339(),
                to: to.to_rfc3339(),
            },
            from,
            to,
        }
    }

    /// The default dashboard range, `now-6h` to `now`, anchored at `now`.
    #[must_use]
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            from: now - Duration::hours(DEFAULT_RANGE_HOURS),
            to: now,
            raw: RawTimeRange {
                from: format!("now-{DEFAULT_RANGE_HOURS}h"),
                to: "now".to_string(),
            },
        }
    }

    /// A relative range covering the last `span` before `now`.
    #[must_use]
    pub fn last(span: Duration, now: DateTime<Utc>) -> Self {
        Self {
            from: now - span,
            to: now,
            raw: RawTimeRange {
                from: format!("now-{}m", span.num_minutes()),
                to: "now".to_string(),
            },
        }
    }

    /// Length of the range.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.to - self.from
    }
}
