use std::fmt;

use adb_bench_instruments::BYTES_PER_MIB;

/// Recommended error type for your benchmark `main` function and any shared code that you write
/// for hooks. This type is compatible with the [crate::definition::HookResult] type so you can use
/// `?` to propagate errors.
pub type BenchResult<T> = anyhow::Result<T>;

/// The amount of data moved by one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransferSize {
    mib: u64,
}

impl TransferSize {
    /// The largest size whose byte count fits in a `u64`.
    pub const MAX_MIB: u64 = u64::MAX / BYTES_PER_MIB;

    pub fn from_mib(mib: u64) -> Self {
        Self { mib }
    }

    pub fn mib(&self) -> u64 {
        self.mib
    }

    /// Saturates above [TransferSize::MAX_MIB]. Benchmark definitions reject such sizes.
    pub fn bytes(&self) -> u64 {
        self.mib.saturating_mul(BYTES_PER_MIB)
    }
}

impl fmt::Display for TransferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}MiB", self.mib)
    }
}
