use std::env;

/// Set by `source build/envsetup.sh` and `lunch` to the root of the Android source tree.
pub const ANDROID_BUILD_TOP_ENV: &str = "ANDROID_BUILD_TOP";

/// Check that the shell has been set up for an Android build tree.
///
/// Returns the message to show the user when it hasn't. `program` is the name the benchmark was
/// invoked as.
pub fn check_build_env(program: &str) -> Result<(), String> {
    match env::var_os(ANDROID_BUILD_TOP_ENV) {
        Some(top) if !top.is_empty() => {
            log::debug!("Using Android build tree at {}", top.to_string_lossy());
            Ok(())
        }
        _ => Err(format!("Run source/lunch before running {program}")),
    }
}

/// The name this program was invoked as, for messages.
pub fn program_name() -> String {
    env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
