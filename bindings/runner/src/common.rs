use std::io::{Seek, SeekFrom};

use adb_bench_client::prelude::{AdbDevice, CpuGovernor};
use adb_bench_runner::prelude::{
    BenchResult, GovernorOpt, HookResult, RunnerContext, TransferSize,
};
use anyhow::Context;
use tempfile::NamedTempFile;

use crate::bin_path::{adb_path, ADB_BENCH_ADB_PATH_ENV, ANDROID_HOST_OUT_ENV};
use crate::build_env::ANDROID_BUILD_TOP_ENV;
use crate::runner_context::DeviceRunnerContext;

/// Device file written by the `push` scenario.
pub const PUSH_REMOTE_PATH: &str = "/data/local/tmp/adb_benchmark_push_tmp";
/// Device file created for, and read by, the `pull` scenario.
pub const PULL_REMOTE_PATH: &str = "/data/local/tmp/adb_benchmark_pull_temp";

/// Used by `adb` itself when no serial is given.
pub const ANDROID_SERIAL_ENV: &str = "ANDROID_SERIAL";

/// Environment variables recorded in the run summary.
const CAPTURED_ENV: [&str; 4] = [
    ANDROID_BUILD_TOP_ENV,
    ANDROID_HOST_OUT_ENV,
    ANDROID_SERIAL_ENV,
    ADB_BENCH_ADB_PATH_ENV,
];

type DeviceContext = RunnerContext<DeviceRunnerContext>;

/// Connect to the device under test and apply the CPU governor policy chosen on the command line.
///
/// Use this as the global setup hook. After it has run, [device] returns the connected device.
///
/// Method:
/// - Finds `adb`, see [crate::prelude::adb_path].
/// - Picks the device from `--serial`, then `ANDROID_SERIAL`, then the only ready device.
/// - Records the serial and the relevant environment in the run summary.
/// - Applies `--cpu-governor` to the device.
pub fn connect_device(ctx: &mut DeviceContext) -> HookResult {
    let adb = adb_path()?;
    log::debug!("Using adb at {}", adb.display());

    let serial = ctx
        .cli()
        .serial
        .clone()
        .or_else(|| std::env::var(ANDROID_SERIAL_ENV).ok())
        .filter(|serial| !serial.is_empty());
    let device = AdbDevice::get_device(adb, serial.as_deref())
        .context("Unable to find the device to benchmark")?;

    ctx.set_target_id(device.serial());
    for key in CAPTURED_ENV {
        ctx.capture_env(key);
    }

    if let Some(governor) = cpu_governor(ctx.cli().cpu_governor) {
        governor.apply(&device)?;
    }

    ctx.get_mut().device = Some(device);
    Ok(())
}

/// Map the command line governor choice onto a device policy, `None` leaves the device alone.
pub fn cpu_governor(opt: GovernorOpt) -> Option<CpuGovernor> {
    match opt {
        GovernorOpt::Unlock => Some(CpuGovernor::Unlock),
        GovernorOpt::LockMin => Some(CpuGovernor::LockMin),
        GovernorOpt::LockMax => Some(CpuGovernor::LockMax),
        GovernorOpt::None => None,
    }
}

/// The device connected by [connect_device].
pub fn device(ctx: &DeviceContext) -> BenchResult<&AdbDevice> {
    ctx.get()
        .device
        .as_ref()
        .context("No device connected, use connect_device as the setup hook")
}

/// Create a host file of `size` zero bytes for the scenario to send.
pub fn create_local_zero_file(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    let file = NamedTempFile::new().context("Failed to create local transfer file")?;
    file.as_file()
        .set_len(size.bytes())
        .with_context(|| format!("Failed to size local transfer file to {size}"))?;
    log::debug!("Created {size} local file at {}", file.path().display());

    ctx.get_mut().local_file = Some(file);
    Ok(())
}

/// Create an empty host file for the scenario to receive into.
pub fn create_local_destination(ctx: &mut DeviceContext, _size: TransferSize) -> HookResult {
    let file = NamedTempFile::new().context("Failed to create local destination file")?;
    ctx.get_mut().local_file = Some(file);
    Ok(())
}

/// Drop the scenario's host file, which deletes it.
pub fn remove_local_file(ctx: &mut DeviceContext, _size: TransferSize) -> HookResult {
    if let Some(file) = ctx.get_mut().local_file.take() {
        file.close().context("Failed to remove local transfer file")?;
    }
    Ok(())
}

fn local_file(ctx: &mut DeviceContext) -> BenchResult<&mut NamedTempFile> {
    ctx.get_mut()
        .local_file
        .as_mut()
        .context("No local transfer file, the scenario setup hook did not create one")
}

/// Write `size` bytes into device RAM with `adb raw sink:`.
///
/// Needs [create_local_zero_file] as the scenario setup hook.
pub fn sink(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    let file = local_file(ctx)?;
    file.as_file_mut()
        .seek(SeekFrom::Start(0))
        .context("Failed to rewind local transfer file")?;
    let input = file
        .as_file()
        .try_clone()
        .context("Failed to reopen local transfer file")?;

    device(ctx)?.raw_sink(size.bytes(), input)
}

/// Read `size` bytes out of device RAM with `adb raw source:`.
pub fn source(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    device(ctx)?.raw_source(size.bytes())
}

/// Copy the local zero file to device flash with `adb push -Z`.
///
/// Needs [create_local_zero_file] as the scenario setup hook.
pub fn push(ctx: &mut DeviceContext, _size: TransferSize) -> HookResult {
    let local = local_file(ctx)?.path().to_path_buf();
    device(ctx)?.push(&local, PUSH_REMOTE_PATH, &["-Z"])
}

/// Remove the pushed file from the device and the local file from the host.
pub fn remove_push_files(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    remove_remote_file(ctx, PUSH_REMOTE_PATH)?;
    remove_local_file(ctx, size)
}

/// Fill [PULL_REMOTE_PATH] on the device with `size` zero bytes and create a host file to pull it
/// into.
///
/// A failed setup skips the scenario teardown, so a partly written device file is removed here.
pub fn create_remote_pull_file(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    // Local first, nothing has been written to the device if this fails.
    create_local_destination(ctx, size)?;

    let created = device(ctx)?.shell([
        "dd".to_string(),
        "if=/dev/zero".to_string(),
        format!("of={PULL_REMOTE_PATH}"),
        "bs=1m".to_string(),
        format!("count={}", size.mib()),
    ]);
    if let Err(e) = created {
        if let Err(cleanup) = remove_remote_file(ctx, PULL_REMOTE_PATH) {
            log::warn!("Failed to clean up after pull setup: {cleanup:?}");
        }
        return Err(e.context(format!("Failed to create {size} file on the device")));
    }

    Ok(())
}

/// Copy [PULL_REMOTE_PATH] from device flash to the host with `adb pull`.
///
/// Needs [create_remote_pull_file] as the scenario setup hook.
pub fn pull(ctx: &mut DeviceContext, _size: TransferSize) -> HookResult {
    let local = local_file(ctx)?.path().to_path_buf();
    device(ctx)?.pull(PULL_REMOTE_PATH, &local, &[])
}

/// Remove the pulled file from the device and the local copy from the host.
pub fn remove_pull_files(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    remove_remote_file(ctx, PULL_REMOTE_PATH)?;
    remove_local_file(ctx, size)
}

/// Run `dd` on the device, streaming `size` zero bytes back to the host.
pub fn dd(ctx: &mut DeviceContext, size: TransferSize) -> HookResult {
    device(ctx)?.shell_discard_output([
        "dd".to_string(),
        "if=/dev/zero".to_string(),
        "bs=1m".to_string(),
        format!("count={}", size.mib()),
    ])
}

fn remove_remote_file(ctx: &DeviceContext, path: &str) -> HookResult {
    let output = device(ctx)?.shell_nocheck(["rm", "-f", path])?;
    if !output.status.success() {
        log::warn!("Failed to remove {path} from the device: {}", output.stderr.trim());
    }
    Ok(())
}
