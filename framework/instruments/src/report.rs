mod summary_report;

use crate::stats::ThroughputStats;

pub use summary_report::SummaryReportCollector;

/// The outcome of running one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    /// The padded label that starts the summary line, e.g. `sink   100MiB (write RAM)  `.
    pub label: String,
    pub size_mib: u64,
    pub stats: ThroughputStats,
    /// Rates in MiB/s, in run order.
    pub samples: Vec<f64>,
}

impl ScenarioResult {
    pub fn new(
        label: impl Into<String>,
        size_mib: u64,
        stats: ThroughputStats,
        samples: Vec<f64>,
    ) -> Self {
        Self {
            label: label.into(),
            size_mib,
            stats,
            samples,
        }
    }

    /// The one line summary printed for each scenario as soon as it completes.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} runs: median {:.2} MiB/s, mean {:.2} MiB/s, stddev: {:.2} MiB/s",
            self.label,
            self.stats.runs,
            self.stats.median,
            self.stats.harmonic_mean,
            self.stats.stddev,
        )
    }
}

pub trait ReportCollector {
    fn add_result(&mut self, result: &ScenarioResult);

    fn finalize(&self);
}

/// Discards every result. Useful for tests and for runs that only want the summary file.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ReportCollector for NoopReporter {
    fn add_result(&mut self, _result: &ScenarioResult) {}

    fn finalize(&self) {}
}

/// Selects which collectors a [Reporter] forwards results to.
#[derive(Debug, Default, Clone)]
pub struct ReportConfig {
    enable_summary: bool,
}

impl ReportConfig {
    /// Print a line per scenario and a table of all scenarios at the end of the run.
    pub fn enable_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors: Vec<Box<dyn ReportCollector>> = Vec::new();
        if self.enable_summary {
            collectors.push(Box::new(SummaryReportCollector::new()));
        }
        if collectors.is_empty() {
            log::debug!("No reporters enabled, results will only be kept in memory");
            collectors.push(Box::new(NoopReporter));
        }

        Reporter { collectors }
    }
}

/// Fans results out to the configured collectors.
pub struct Reporter {
    collectors: Vec<Box<dyn ReportCollector>>,
}

impl Reporter {
    pub fn add_result(&mut self, result: &ScenarioResult) {
        for collector in self.collectors.iter_mut() {
            collector.add_result(result);
        }
    }

    pub fn finalize(&self) {
        for collector in &self.collectors {
            collector.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_result(label: &str) -> ScenarioResult {
        let samples = vec![30.0, 10.0, 20.0];
        let stats = ThroughputStats::from_samples(&samples).unwrap();
        ScenarioResult::new(label, 100, stats, samples)
    }

    #[test]
    fn summary_line_format() {
        let result = sample_result("sink   100MiB (write RAM)  ");

        assert_eq!(
            result.summary_line(),
            "sink   100MiB (write RAM)  : 3 runs: median 20.00 MiB/s, mean 16.36 MiB/s, stddev: 10.00 MiB/s"
        );
    }

    #[test]
    fn default_config_falls_back_to_noop() {
        let mut reporter = ReportConfig::default().init();
        assert_eq!(reporter.collectors.len(), 1);

        reporter.add_result(&sample_result("noop"));
        reporter.finalize();
    }

    #[test]
    fn summary_config_has_one_collector() {
        let reporter = ReportConfig::default().enable_summary().init();
        assert_eq!(reporter.collectors.len(), 1);
    }
}
