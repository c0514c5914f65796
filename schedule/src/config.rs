//! Search configuration.
//!
//! Supports explicit construction through a bon builder and environment
//! variable fallbacks.

use bon::bon;

/// Candidates between two progress events of the refinement stage.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 4096;

/// Configuration for one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Refinement workers.
    /// Default: std::thread::available_parallelism().
    /// Clamped to the number of candidates at search time.
    pub thread_count: usize,
    /// Fail instead of continuing when no loop elimination fits on-chip memory.
    pub strict_memory: bool,
    /// Refinement candidates between progress events.
    pub progress_interval: u64,
}

/// Get default thread count from system (used by Default and builder).
fn default_thread_count() -> usize {
    std::thread::available_parallelism().map(|p| p.get()).unwrap_or(8)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thread_count: default_thread_count(),
            strict_memory: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[bon]
impl SearchConfig {
    /// Create a search configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = default_thread_count())] thread_count: usize,
        #[builder(default = false)] strict_memory: bool,
        #[builder(default = DEFAULT_PROGRESS_INTERVAL)] progress_interval: u64,
    ) -> Self {
        Self { thread_count: thread_count.max(1), strict_memory, progress_interval: progress_interval.max(1) }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TESSEL_THREADS` - Refinement worker count (default: available_parallelism)
    /// * `TESSEL_STRICT_MEMORY` - Reject loops whose elimination overflows on-chip memory
    pub fn from_env() -> Self {
        let thread_count = std::env::var("TESSEL_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(default_thread_count);
        let strict_memory = std::env::var("TESSEL_STRICT_MEMORY").is_ok();

        Self { thread_count, strict_memory, ..Default::default() }
    }
}
