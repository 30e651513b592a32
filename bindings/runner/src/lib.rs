mod bin_path;
mod build_env;
mod common;
mod runner_context;

pub mod prelude {
    /// Setup, transfer and teardown hooks for device scenarios.
    ///
    /// This is a good place to start if you are getting started writing scenarios.
    pub use crate::common::*;

    pub use crate::bin_path::{adb_path, ADB_BENCH_ADB_PATH_ENV, ANDROID_HOST_OUT_ENV};
    pub use crate::build_env::{check_build_env, program_name, ANDROID_BUILD_TOP_ENV};
    pub use crate::runner_context::DeviceRunnerContext;

    /// Re-export of the `adb_bench_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your scenarios.
    pub use adb_bench_runner::prelude::*;

    /// Re-export of the adb client for convenience.
    pub use adb_bench_client::prelude::*;
}
