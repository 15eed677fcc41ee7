//! Applying many patches to one source
//!
//! Patches are immutable and every application owns its cursors and output,
//! so independent applications run in parallel without coordination.

use rayon::prelude::*;
use tracing::debug;

use crate::apply::ApplyOutput;
use crate::config::ApplyConfig;
use crate::error::Result;
use crate::file::PatchFile;

/// Apply each patch to `source`, in parallel once the batch reaches
/// `config.parallel_threshold`. Results keep the order of `patches`.
pub fn apply_batch(
    patches: &[PatchFile],
    source: &[u8],
    config: &ApplyConfig,
) -> Vec<Result<ApplyOutput>> {
    let parallel = patches.len() >= config.parallel_threshold;
    debug!(patches = patches.len(), parallel, "applying batch");

    if parallel {
        patches
            .par_iter()
            .map(|patch| patch.apply(source, config))
            .collect()
    } else {
        patches
            .iter()
            .map(|patch| patch.apply(source, config))
            .collect()
    }
}
