mod cli;
mod context;
mod definition;
mod init;
mod progress;
mod run;
mod types;

pub mod prelude {
    pub use crate::cli::{BenchCli, GovernorOpt, ReporterOpt};
    pub use crate::context::{RunnerContext, UserValuesConstraint};
    pub use crate::definition::{
        BenchmarkDefinitionBuilder, GlobalHookMut, HookResult, TransferHook, TransferScenario,
    };
    pub use crate::init::init;
    pub use crate::progress::ScenarioProgress;
    pub use crate::run::{measure_throughput, run};
    pub use crate::types::{BenchResult, TransferSize};

    pub use adb_bench_instruments::{ScenarioResult, ThroughputStats};
}
