mod report;
mod stats;

use std::time::{Duration, Instant};

pub use report::{
    NoopReporter, ReportCollector, ReportConfig, Reporter, ScenarioResult, SummaryReportCollector,
};
pub use stats::{harmonic_mean, median, sample_stddev, SampleSet, StatsError, ThroughputStats};

/// Number of bytes in one MiB, the unit used for every transfer size and rate.
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Timing for a single transfer.
///
/// The clock starts when the record is created so create it immediately before starting the
/// transfer and call [TransferRecord::finish] as soon as the transfer returns. Turn the elapsed
/// time into a rate with [rate_mib_per_s].
#[derive(Debug, Clone)]
pub struct TransferRecord {
    started: Instant,
    elapsed: Option<Duration>,
}

impl TransferRecord {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Stop the clock. Calling this more than once keeps the first measurement.
    pub fn finish(&mut self) -> Duration {
        *self.elapsed.get_or_insert_with(|| self.started.elapsed())
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// Convert a transfer of `size_mib` that took `elapsed` into a rate in MiB/s.
pub fn rate_mib_per_s(size_mib: u64, elapsed: Duration) -> f64 {
    size_mib as f64 / elapsed.as_secs_f64()
}
