use adb_bench_runner::prelude::BenchResult;
use anyhow::bail;
use anyhow::Context;
use std::env;
use std::path::PathBuf;

/// Environment variable to override the path to the `adb` binary used to reach the device.
pub const ADB_BENCH_ADB_PATH_ENV: &str = "ADB_BENCH_ADB_PATH";

/// Set by `lunch` to the host output directory of the Android build tree.
pub const ANDROID_HOST_OUT_ENV: &str = "ANDROID_HOST_OUT";

/// Get the path to the `adb` binary.
///
/// If the [`ADB_BENCH_ADB_PATH_ENV`] environment variable is set, its value is used as the path to
/// the binary. Otherwise the `adb` built into [`ANDROID_HOST_OUT_ENV`] is preferred, so that the
/// host side matches the tree being measured, and finally `adb` is looked up on the system's PATH.
pub fn adb_path() -> BenchResult<PathBuf> {
    match env::var(ADB_BENCH_ADB_PATH_ENV).ok().as_deref() {
        Some("") => {
            bail!("'{ADB_BENCH_ADB_PATH_ENV}' set to empty string");
        }
        Some("adb") | None => {
            if let Some(host_out) = env::var_os(ANDROID_HOST_OUT_ENV) {
                let built_adb = PathBuf::from(host_out).join("bin").join("adb");
                if built_adb.exists() {
                    return Ok(built_adb);
                }
                log::debug!("No adb at {}", built_adb.display());
            }

            log::warn!("'{ADB_BENCH_ADB_PATH_ENV}' is not a path so looking in user's 'PATH'");
            which::which("adb").with_context(|| {
                format!(
                    "adb binary not found in PATH. Build adb in your tree or set '{ADB_BENCH_ADB_PATH_ENV}' to the correct path."
                )
            })
        }
        Some(path) => {
            let adb_path = PathBuf::from(path);
            if !adb_path.exists() {
                bail!(
                    "Path to adb binary overwritten with '{ADB_BENCH_ADB_PATH_ENV}={path}' but that path doesn't exist",
                    path = adb_path.display()
                );
            }
            Ok(adb_path)
        }
    }
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt as _;

    use serial_test::serial;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    #[cfg(unix)]
    fn executable(dir: &TempDir, rel: &str) -> PathBuf {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "#!/bin/sh\n").expect("failed to create adb file");
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_should_not_get_adb_path_if_not_exist() {
        env::set_var(ADB_BENCH_ADB_PATH_ENV, "/non/existent/path/to/adb");
        let result = adb_path();
        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_should_not_accept_empty_adb_path() {
        env::set_var(ADB_BENCH_ADB_PATH_ENV, "");
        let result = adb_path();
        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_should_get_adb_path_from_env() {
        let temp = NamedTempFile::new().expect("failed to create temp file");
        let test_path = temp.path().to_str().expect("failed to get temp file path");
        env::set_var(ADB_BENCH_ADB_PATH_ENV, test_path);
        let result = adb_path();
        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        assert_eq!(result.expect("failed to get adb path"), PathBuf::from(test_path));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_should_prefer_host_out_adb() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let built_adb = executable(&temp, "out/host/linux-x86/bin/adb");

        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        env::set_var(ANDROID_HOST_OUT_ENV, temp.path().join("out/host/linux-x86"));
        let result = adb_path();
        env::remove_var(ANDROID_HOST_OUT_ENV);

        assert_eq!(result.expect("failed to get adb path"), built_adb);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_should_get_default_adb_path() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let adb_file_path = executable(&temp, "adb");

        // put the temp dir on PATH, and only that
        let old_path = env::var_os("PATH");
        env::set_var("PATH", temp.path());

        // remove the overrides to test default behavior
        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        env::remove_var(ANDROID_HOST_OUT_ENV);

        let result = adb_path();
        if let Some(old_path) = old_path {
            env::set_var("PATH", old_path);
        }

        assert_eq!(result.expect("failed to get adb path"), adb_file_path);
    }

    #[test]
    #[serial]
    fn test_should_not_get_default_adb_path() {
        // unset PATH
        let old_path = env::var_os("PATH");
        env::remove_var("PATH");

        env::remove_var(ADB_BENCH_ADB_PATH_ENV);
        env::remove_var(ANDROID_HOST_OUT_ENV);

        let result = adb_path();
        if let Some(old_path) = old_path {
            env::set_var("PATH", old_path);
        }

        println!("{result:?}",);
        assert!(result.is_err());
    }
}
