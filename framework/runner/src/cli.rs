use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(about, long_about = None)]
pub struct BenchCli {
    /// The number of timed runs of each scenario. Must be at least 2 so that a standard deviation
    /// can be computed.
    #[clap(long)]
    pub runs: Option<usize>,

    /// The size of each transfer in MiB
    #[clap(long)]
    pub size_mib: Option<u64>,

    /// Serial of the device to benchmark. Defaults to `ANDROID_SERIAL`, or the only connected
    /// device if that isn't set either.
    #[clap(short, long)]
    pub serial: Option<String>,

    /// Only run the named scenario. Specify the flag multiple times to run several, for example
    /// `--scenario sink --scenario source`.
    ///
    /// Scenarios always run in their defined order. All scenarios run if this is not set.
    #[clap(long)]
    pub scenario: Vec<String>,

    /// CPU frequency policy to apply on the device before measuring.
    #[clap(long, value_enum, default_value_t = GovernorOpt::Unlock)]
    pub cpu_governor: GovernorOpt,

    /// How results are reported.
    #[clap(long, value_enum, default_value_t = ReporterOpt::Console)]
    pub reporter: ReporterOpt,

    /// Append a JSON summary of the run to this file, one run per line.
    #[clap(long)]
    pub summary_file: Option<PathBuf>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GovernorOpt {
    /// Restore the kernel's dynamic frequency governor
    #[default]
    Unlock,
    /// Pin every core to its minimum frequency
    LockMin,
    /// Pin every core to its maximum frequency
    LockMax,
    /// Leave the frequency governor alone
    None,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReporterOpt {
    /// Print a line for each scenario and a summary table at the end of the run
    #[default]
    Console,
    /// Print nothing
    Noop,
}
