mod throughput_table;

use crate::report::summary_report::throughput_table::ThroughputRow;
use crate::report::{ReportCollector, ScenarioResult};
use tabled::settings::Style;
use tabled::Table;

/// Prints a line for each scenario as it completes, then a table of every scenario, in MiB/s, at
/// the end of the run.
#[derive(Debug, Default)]
pub struct SummaryReportCollector {
    results: Vec<ScenarioResult>,
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub(crate) fn summary_table(&self) -> String {
        let rows = self
            .results
            .iter()
            .map(|result| ThroughputRow {
                scenario: result.label.trim_end().to_string(),
                size_mib: result.size_mib,
                runs: result.stats.runs,
                median: result.stats.median,
                harmonic_mean: result.stats.harmonic_mean,
                stddev: result.stats.stddev,
                min: result.stats.min,
                max: result.stats.max,
            })
            .collect::<Vec<_>>();

        let mut table = Table::new(rows);
        table.with(Style::modern());

        table.to_string()
    }
}

impl ReportCollector for SummaryReportCollector {
    fn add_result(&mut self, result: &ScenarioResult) {
        println!("{}", result.summary_line());
        self.results.push(result.clone());
    }

    fn finalize(&self) {
        if self.results.is_empty() {
            return;
        }

        println!("\nSummary of transfers (MiB/s)");
        println!("{}", self.summary_table());
    }
}
