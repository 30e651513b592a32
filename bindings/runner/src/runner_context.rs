use adb_bench_client::prelude::AdbDevice;
use adb_bench_runner::prelude::UserValuesConstraint;
use tempfile::NamedTempFile;

#[derive(Default, Debug)]
pub struct DeviceRunnerContext {
    /// Set by [crate::prelude::connect_device].
    pub device: Option<AdbDevice>,
    /// Host side file of the scenario that is running, if it needs one.
    ///
    /// Replaced by each scenario setup and removed when the value is dropped.
    pub local_file: Option<NamedTempFile>,
}

impl UserValuesConstraint for DeviceRunnerContext {}
