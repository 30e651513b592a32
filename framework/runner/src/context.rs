use std::collections::HashMap;
use std::fmt::Debug;

use crate::cli::BenchCli;
use crate::types::TransferSize;

pub trait UserValuesConstraint: Default + Debug + 'static {}

/// State shared by every hook in a benchmark run.
///
/// `RV` is a value type chosen by the benchmark, for example to hold a device handle opened in the
/// setup hook and temporary files created by scenario setup hooks.
#[derive(Debug)]
pub struct RunnerContext<RV: UserValuesConstraint> {
    cli: BenchCli,
    runs: usize,
    transfer_size: TransferSize,
    target_id: Option<String>,
    env: HashMap<String, String>,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(cli: BenchCli, runs: usize, transfer_size: TransferSize) -> Self {
        Self {
            cli,
            runs,
            transfer_size,
            target_id: None,
            env: HashMap::with_capacity(0),
            value: Default::default(),
        }
    }

    /// The command line the benchmark was started with, for options such as the device serial
    /// that only the hooks know how to use.
    pub fn cli(&self) -> &BenchCli {
        &self.cli
    }

    /// The number of timed runs of each scenario.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// The size of every transfer in this run.
    pub fn transfer_size(&self) -> TransferSize {
        self.transfer_size
    }

    /// Identify the device under test. This is recorded in the run summary.
    pub fn set_target_id(&mut self, target_id: impl Into<String>) {
        self.target_id = Some(target_id.into());
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    /// Record the value of an environment variable in the run summary, if it is set.
    pub fn capture_env(&mut self, key: &str) {
        if let Ok(value) = std::env::var(key) {
            self.env.insert(key.to_string(), value);
        }
    }

    pub(crate) fn captured_env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}
