#![cfg(unix)]

use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use adb_bench_device_runner::prelude::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

const DEVICES: &str = "printf 'List of devices attached\\nSERIAL1\\tdevice\\nSERIAL2\\tdevice\\n\\n'";

/// Writes an `adb` stand-in that records its arguments before running `body`, and points the
/// runner at it.
fn install_fake_adb(dir: &TempDir, body: &str) -> PathBuf {
    let adb_path = dir.path().join("adb");
    let log_path = dir.path().join("calls.log");
    let script = format!(
        "#!/bin/sh\necho \"$*\" >> '{}'\nif [ \"$1\" = devices ]; then {DEVICES}; exit 0; fi\n{}\n",
        log_path.display(),
        body
    );
    std::fs::write(&adb_path, script).expect("failed to write fake adb");
    let mut perms = std::fs::metadata(&adb_path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&adb_path, perms).unwrap();

    std::env::set_var(ADB_BENCH_ADB_PATH_ENV, &adb_path);
    log_path
}

fn calls(log_path: &Path) -> Vec<String> {
    std::fs::read_to_string(log_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn sample_cli_cfg() -> BenchCli {
    BenchCli {
        runs: Some(2),
        size_mib: Some(1),
        serial: Some("SERIAL2".to_string()),
        cpu_governor: GovernorOpt::None,
        reporter: ReporterOpt::Noop,
        no_progress: true,
        ..Default::default()
    }
}

fn benchmark(cli: BenchCli) -> BenchmarkDefinitionBuilder<DeviceRunnerContext> {
    BenchmarkDefinitionBuilder::<DeviceRunnerContext>::new("device_throughput", cli)
        .use_setup(connect_device)
        .add_scenario(
            TransferScenario::new("sink", "write RAM", sink)
                .use_setup(create_local_zero_file)
                .use_teardown(remove_local_file),
        )
        .add_scenario(TransferScenario::new("source", "read RAM", source))
        .add_scenario(
            TransferScenario::new("push", "write flash", push)
                .use_setup(create_local_zero_file)
                .use_teardown(remove_push_files),
        )
        .add_scenario(
            TransferScenario::new("pull", "read flash", pull)
                .use_setup(create_remote_pull_file)
                .use_teardown(remove_pull_files),
        )
        .add_scenario(TransferScenario::new("dd", "write flash", dd))
}

#[test]
#[serial]
fn every_scenario_drives_the_selected_device() {
    let dir = TempDir::new().unwrap();
    let log_path = install_fake_adb(&dir, "exit 0");

    let results = run(benchmark(sample_cli_cfg())).unwrap();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    let labels = results.iter().map(|r| r.label.as_str()).collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            "sink   1MiB (write RAM)  ",
            "source 1MiB (read RAM)   ",
            "push   1MiB (write flash)",
            "pull   1MiB (read flash) ",
            "dd     1MiB (write flash)",
        ]
    );

    // The local paths are random, so only their position is checked.
    let calls = calls(&log_path);
    let push_calls = calls
        .iter()
        .filter(|c| c.starts_with("-s SERIAL2 push -Z "))
        .collect::<Vec<_>>();
    assert_eq!(push_calls.len(), 2);
    assert!(push_calls
        .iter()
        .all(|c| c.ends_with(" /data/local/tmp/adb_benchmark_push_tmp")));
    let pull_calls = calls
        .iter()
        .filter(|c| c.starts_with("-s SERIAL2 pull /data/local/tmp/adb_benchmark_pull_temp "))
        .count();
    assert_eq!(pull_calls, 2);

    let fixed_calls = calls
        .iter()
        .filter(|c| !c.contains(" push ") && !c.contains(" pull "))
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(
        fixed_calls,
        vec![
            "devices",
            "-s SERIAL2 raw sink:1048576",
            "-s SERIAL2 raw sink:1048576",
            "-s SERIAL2 raw source:1048576",
            "-s SERIAL2 raw source:1048576",
            "-s SERIAL2 shell rm -f /data/local/tmp/adb_benchmark_push_tmp",
            "-s SERIAL2 shell dd if=/dev/zero of=/data/local/tmp/adb_benchmark_pull_temp bs=1m count=1",
            "-s SERIAL2 shell rm -f /data/local/tmp/adb_benchmark_pull_temp",
            "-s SERIAL2 shell dd if=/dev/zero bs=1m count=1",
            "-s SERIAL2 shell dd if=/dev/zero bs=1m count=1",
        ]
    );
}

#[test]
#[serial]
fn sink_sends_the_whole_file_every_run() {
    let dir = TempDir::new().unwrap();
    let received = dir.path().join("received");
    let log_path = install_fake_adb(&dir, &format!("wc -c >> '{}'", received.display()));

    let cli = BenchCli {
        scenario: vec!["sink".to_string()],
        ..sample_cli_cfg()
    };
    run(benchmark(cli)).unwrap();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    let sizes = std::fs::read_to_string(&received)
        .unwrap()
        .lines()
        .map(|l| l.trim().parse::<u64>().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![1048576, 1048576]);
    assert_eq!(calls(&log_path).len(), 3);
}

#[test]
#[serial]
fn failed_pull_still_cleans_up_the_device() {
    let dir = TempDir::new().unwrap();
    let log_path = install_fake_adb(
        &dir,
        "if [ \"$3\" = pull ]; then echo 'adb: error: failed to stat remote object' >&2; exit 1; fi",
    );

    let cli = BenchCli {
        scenario: vec!["pull".to_string(), "dd".to_string()],
        ..sample_cli_cfg()
    };
    let err = run(benchmark(cli)).unwrap_err();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    assert_eq!(err.to_string(), "Transfer failed for scenario 'pull'");
    let error = err
        .downcast_ref::<AdbCommandError>()
        .expect("expected an adb command error");
    assert_eq!(error.stderr, "adb: error: failed to stat remote object");

    let calls = calls(&log_path);
    assert_eq!(
        calls.last().map(String::as_str),
        Some("-s SERIAL2 shell rm -f /data/local/tmp/adb_benchmark_pull_temp")
    );
    // The run stopped before dd.
    assert!(!calls.iter().any(|c| c.ends_with("shell dd if=/dev/zero bs=1m count=1")));
}

#[test]
#[serial]
fn failed_pull_setup_removes_the_partial_device_file() {
    let dir = TempDir::new().unwrap();
    let log_path = install_fake_adb(
        &dir,
        "case \"$*\" in *of=/data/local/tmp/adb_benchmark_pull_temp*) \
            echo 'dd: write error: No space left on device' >&2; exit 1;; esac",
    );

    let cli = BenchCli {
        scenario: vec!["pull".to_string()],
        ..sample_cli_cfg()
    };
    let err = run(benchmark(cli)).unwrap_err();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    assert_eq!(err.to_string(), "Setup failed for scenario 'pull'");
    assert!(format!("{err:#}").contains("Failed to create 1MiB file on the device"));

    let calls = calls(&log_path);
    assert_eq!(
        calls.last().map(String::as_str),
        Some("-s SERIAL2 shell rm -f /data/local/tmp/adb_benchmark_pull_temp")
    );
    assert!(!calls.iter().any(|c| c.contains(" pull ")));
}

#[test]
#[serial]
fn unknown_serial_is_rejected() {
    let dir = TempDir::new().unwrap();
    let log_path = install_fake_adb(&dir, "exit 0");

    let cli = BenchCli {
        serial: Some("SERIAL9".to_string()),
        ..sample_cli_cfg()
    };
    let err = run(benchmark(cli)).unwrap_err();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    assert_eq!(
        err.downcast_ref::<DeviceDiscoveryError>(),
        Some(&DeviceDiscoveryError::NotFound {
            serial: "SERIAL9".to_string()
        })
    );
    assert_eq!(calls(&log_path), vec!["devices"]);
}

#[test]
#[serial]
fn governor_is_applied_before_measuring() {
    let dir = TempDir::new().unwrap();
    let log_path = install_fake_adb(&dir, "exit 0");

    let cli = BenchCli {
        scenario: vec!["source".to_string()],
        cpu_governor: GovernorOpt::LockMax,
        ..sample_cli_cfg()
    };
    run(benchmark(cli)).unwrap();
    std::env::remove_var(ADB_BENCH_ADB_PATH_ENV);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let governor_at = log.find("scaling_max_freq").expect("governor script not run");
    let source_at = log.find("raw source:").expect("source not run");
    assert!(governor_at < source_at);
}
