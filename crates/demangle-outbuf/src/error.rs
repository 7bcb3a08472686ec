use alloc::collections::TryReserveError;

use thiserror::Error;

/// Failure to set up an [`OutputBuffer`](crate::OutputBuffer).
///
/// Only the initial allocation is fallible. Once a buffer exists, growing it
/// either succeeds or aborts the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The initial block could not be allocated.
    #[error("failed to allocate a {size}-byte output buffer")]
    Allocation {
        /// Requested size in bytes.
        size: usize,
        /// Reason reported by the allocator.
        #[source]
        source: TryReserveError,
    },
}
