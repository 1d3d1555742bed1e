//! Adapters for the clock and time range ports.

mod system_clock;
mod watch_time_range;

pub use system_clock::SystemClock;
pub use watch_time_range::WatchTimeRange;
