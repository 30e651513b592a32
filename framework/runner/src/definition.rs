use anyhow::bail;

use crate::cli::{BenchCli, ReporterOpt};
use crate::context::{RunnerContext, UserValuesConstraint};
use crate::types::{BenchResult, TransferSize};

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type TransferHook<RV> = fn(&mut RunnerContext<RV>, TransferSize) -> HookResult;

/// Used when neither the CLI nor the definition sets the number of runs.
const FALLBACK_RUNS: usize = 10;
/// Used when neither the CLI nor the definition sets the transfer size.
const FALLBACK_SIZE_MIB: u64 = 100;

/// One transfer path to measure.
///
/// The transfer hook is the only part that is timed. Use the setup hook to prepare data for it and
/// the teardown hook to clean up, both are run once per scenario rather than once per run.
pub struct TransferScenario<RV: UserValuesConstraint> {
    name: String,
    description: String,
    setup_fn: Option<TransferHook<RV>>,
    transfer_fn: TransferHook<RV>,
    teardown_fn: Option<TransferHook<RV>>,
}

impl<RV: UserValuesConstraint> TransferScenario<RV> {
    /// Create a scenario with a short `name`, used to select it on the command line, and a
    /// `description` of what is being measured, such as "write RAM".
    pub fn new(name: &str, description: &str, transfer_fn: TransferHook<RV>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            setup_fn: None,
            transfer_fn,
            teardown_fn: None,
        }
    }

    pub fn use_setup(mut self, setup_fn: TransferHook<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// The teardown hook also runs when a transfer fails. Errors from it are logged, not returned.
    pub fn use_teardown(mut self, teardown_fn: TransferHook<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fixed width label that starts the scenario's summary line, so that the numbers of
    /// consecutive scenarios line up, e.g. `sink   100MiB (write RAM)  `.
    pub fn label(&self, size: TransferSize) -> String {
        format!(
            "{:<6} {} {:<13}",
            self.name,
            size,
            format!("({})", self.description)
        )
    }

    pub(crate) fn setup_fn(&self) -> Option<TransferHook<RV>> {
        self.setup_fn
    }

    pub(crate) fn transfer_fn(&self) -> TransferHook<RV> {
        self.transfer_fn
    }

    pub(crate) fn teardown_fn(&self) -> Option<TransferHook<RV>> {
        self.teardown_fn
    }
}

/// The builder for a benchmark definition.
///
/// This must be used at the start of a benchmark to define the scenarios that you want to run.
pub struct BenchmarkDefinitionBuilder<RV: UserValuesConstraint> {
    /// The name of the benchmark.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: BenchCli,
    /// Runs per scenario if not set on the CLI.
    default_runs: Option<usize>,
    /// Transfer size if not set on the CLI.
    default_size_mib: Option<u64>,
    /// Global setup hook, run once before any scenario. This is where to connect to the device.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// Global teardown hook, run once after all scenarios, even if one of them failed.
    teardown_fn: Option<GlobalHookMut<RV>>,
    /// Scenarios in the order they will run.
    scenarios: Vec<TransferScenario<RV>>,
}

pub(crate) struct BenchmarkDefinition<RV: UserValuesConstraint> {
    pub(crate) name: String,
    pub(crate) cli: BenchCli,
    pub(crate) runs: usize,
    pub(crate) transfer_size: TransferSize,
    pub(crate) reporter: ReporterOpt,
    pub(crate) no_progress: bool,
    pub(crate) summary_file: Option<std::path::PathBuf>,
    pub(crate) setup_fn: Option<GlobalHookMut<RV>>,
    pub(crate) teardown_fn: Option<GlobalHookMut<RV>>,
    pub(crate) scenarios: Vec<TransferScenario<RV>>,
}

impl<RV: UserValuesConstraint> BenchmarkDefinitionBuilder<RV> {
    /// Initialise a new benchmark definition from the benchmark name and parsed command line
    /// arguments. See [BenchmarkDefinitionBuilder::name] for more information about the name.
    pub fn new(name: &str, cli: BenchCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            default_runs: None,
            default_size_mib: None,
            setup_fn: None,
            teardown_fn: None,
            scenarios: Vec::new(),
        }
    }

    /// Initialise logging, parse the command line and create a new benchmark definition.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, crate::init::init())
    }

    /// The parsed command line arguments.
    pub fn cli(&self) -> &BenchCli {
        &self.cli
    }

    pub fn with_default_runs(mut self, runs: usize) -> Self {
        self.default_runs = Some(runs);
        self
    }

    pub fn with_default_size_mib(mut self, size_mib: u64) -> Self {
        self.default_size_mib = Some(size_mib);
        self
    }

    /// Set the global setup hook [BenchmarkDefinitionBuilder::setup_fn] for this benchmark.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut<RV>) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the global teardown hook [BenchmarkDefinitionBuilder::teardown_fn] for this benchmark.
    pub fn use_teardown(mut self, teardown_fn: GlobalHookMut<RV>) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    /// Add a scenario. Scenarios run in the order they are added.
    pub fn add_scenario(mut self, scenario: TransferScenario<RV>) -> Self {
        if self.scenarios.iter().any(|s| s.name == scenario.name) {
            panic!("Scenario [{}] is already defined", scenario.name);
        }

        self.scenarios.push(scenario);
        self
    }

    pub(crate) fn build(self) -> BenchResult<BenchmarkDefinition<RV>> {
        let runs = self
            .cli
            .runs
            .or(self.default_runs)
            .unwrap_or(FALLBACK_RUNS);
        if runs < 2 {
            bail!("At least 2 runs per scenario are required to compute statistics, got {runs}");
        }

        let size_mib = self
            .cli
            .size_mib
            .or(self.default_size_mib)
            .unwrap_or(FALLBACK_SIZE_MIB);
        if size_mib == 0 {
            bail!("Transfer size must be at least 1 MiB");
        }
        if size_mib > TransferSize::MAX_MIB {
            bail!(
                "Transfer size of {size_mib} MiB is too large, the maximum is {} MiB",
                TransferSize::MAX_MIB
            );
        }

        for selected in &self.cli.scenario {
            if !self.scenarios.iter().any(|s| &s.name == selected) {
                bail!(
                    "Unknown scenario '{selected}', expected one of: {}",
                    self.scenarios
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        let selected = &self.cli.scenario;
        let scenarios = self
            .scenarios
            .into_iter()
            .filter(|s| selected.is_empty() || selected.contains(&s.name))
            .collect();

        Ok(BenchmarkDefinition {
            name: self.name,
            runs,
            transfer_size: TransferSize::from_mib(size_mib),
            reporter: self.cli.reporter,
            no_progress: self.cli.no_progress,
            summary_file: self.cli.summary_file.clone(),
            cli: self.cli,
            setup_fn: self.setup_fn,
            teardown_fn: self.teardown_fn,
            scenarios,
        })
    }
}
