use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::collections::HashMap;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Summary of a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The name of the benchmark that was run
    pub benchmark_name: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// Serial number of the device the transfers ran against
    pub device_serial: String,
    /// The number of timed runs of each scenario
    pub runs_per_scenario: usize,
    /// The transfer size used by every scenario, in MiB
    pub transfer_size_mib: u64,
    /// Results for each scenario that completed, in the order they ran
    pub scenarios: Vec<ScenarioSummary>,
    /// Environment variables set for the run
    ///
    /// This won't capture all environment variables. Just the ones that affect how the benchmark
    /// finds `adb` and the device.
    pub env: HashMap<String, String>,
    /// The version of ADB Bench that was used for this run
    pub adb_bench_version: String,
}

/// Statistics for one scenario, all rates in MiB/s
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    /// Short scenario name, such as `sink` or `pull`
    pub name: String,
    pub median: f64,
    pub harmonic_mean: f64,
    pub stddev: f64,
    /// Every measured rate, in run order
    pub samples: Vec<f64>,
}

impl RunSummary {
    /// Create a new run summary
    pub fn new(
        run_id: String,
        benchmark_name: String,
        started_at: i64,
        device_serial: String,
        runs_per_scenario: usize,
        transfer_size_mib: u64,
        adb_bench_version: String,
    ) -> Self {
        Self {
            run_id,
            benchmark_name,
            started_at,
            device_serial,
            runs_per_scenario,
            transfer_size_mib,
            scenarios: Vec::new(),
            env: HashMap::with_capacity(0),
            adb_bench_version,
        }
    }

    /// Add the result of a completed scenario
    pub fn add_scenario(&mut self, scenario: ScenarioSummary) {
        self.scenarios.push(scenario);
    }

    /// Add an environment variable
    pub fn add_env(&mut self, key: String, value: String) {
        self.env.insert(key, value);
    }

    /// Compute a fingerprint for this run summary
    ///
    /// The fingerprint is intended to identify the configuration used for the run so that results
    /// from comparable runs can be grouped. It uses the
    ///     - Benchmark name
    ///     - Device serial
    ///     - Runs per scenario and transfer size
    ///     - Names of the scenarios that ran
    ///     - Selected environment variables
    ///     - ADB Bench version
    ///
    /// The fingerprint is computed using [sha3::Sha3_256].
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.benchmark_name.as_bytes());
        Digest::update(&mut hasher, self.device_serial.as_bytes());
        Digest::update(&mut hasher, (self.runs_per_scenario as u64).to_le_bytes());
        Digest::update(&mut hasher, self.transfer_size_mib.to_le_bytes());
        self.scenarios.iter().for_each(|scenario| {
            Digest::update(&mut hasher, scenario.name.as_bytes());
        });
        self.env
            .iter()
            .sorted_by_key(|(k, _)| k.to_owned())
            .for_each(|(k, v)| {
                Digest::update(&mut hasher, k.as_bytes());
                Digest::update(&mut hasher, v.as_bytes());
            });
        Digest::update(&mut hasher, self.adb_bench_version.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: RunSummary, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all("\n".as_bytes())?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, &run_summary)?;
    Ok(())
}

/// Load a run summary from a reader
pub fn load_run_summary<R: Read>(reader: R) -> anyhow::Result<RunSummary> {
    let reader = std::io::BufReader::new(reader);
    let run_summary: RunSummary = serde_json::from_reader(reader)?;
    Ok(run_summary)
}

/// Load run summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_summary].
pub fn load_summary_runs(path: PathBuf) -> anyhow::Result<Vec<RunSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let run: RunSummary = serde_json::from_str(&line)?;
        runs.push(run);
    }
    Ok(runs)
}
