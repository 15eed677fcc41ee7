//! Configuration for applying patches

/// How a target checksum mismatch is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetCheck {
    /// The mismatch is an error and no target is returned
    #[default]
    Strict,
    /// The mismatch is logged and the computed target is returned, flagged unverified
    Advisory,
}

/// Options for [`crate::PatchFile::apply`] and friends
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Largest target size that will be allocated, in bytes
    pub max_target_size: u64,
    /// Treatment of target checksum mismatches
    pub target_check: TargetCheck,
    /// Batch size at which batch application goes parallel
    pub parallel_threshold: usize,
    /// Memory-map input files instead of reading them
    pub use_mmap: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            max_target_size: 256 * 1024 * 1024,
            target_check: TargetCheck::Strict,
            parallel_threshold: 2,
            use_mmap: cfg!(feature = "mmap"),
        }
    }
}

impl ApplyConfig {
    /// Set the largest target size that will be allocated
    pub fn with_max_target_size(mut self, bytes: u64) -> Self {
        self.max_target_size = bytes;
        self
    }

    /// Set the treatment of target checksum mismatches
    pub fn with_target_check(mut self, check: TargetCheck) -> Self {
        self.target_check = check;
        self
    }

    /// Set the batch size at which batch application goes parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Choose between memory mapping and reading input files
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap && cfg!(feature = "mmap");
        self
    }

    pub fn is_advisory(&self) -> bool {
        self.target_check == TargetCheck::Advisory
    }
}
