//! Post-search finalization and persistence.
//!
//! [`compile`] turns a layer into a finalized loop nest ready for code
//! generation. [`write_dumps`] and [`load_prescheduled`] store and restore that
//! nest so a later run can skip the search.

use std::fs;
use std::path::Path;

use snafu::ResultExt;
use tessel_ir::{CnnLoop, ConvLayer, Stationary, StructureDump, TilingDump};
use tracing::info;

use crate::error::{IoSnafu, Result};
use crate::scheduler::Scheduler;

/// A searched and finalized loop nest.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub cnn_loop: CnnLoop,
    pub stationary: Stationary,
    pub edp: f64,
}

/// Tag the off-chip order from the tiling, fix the on-chip order and move
/// fully tiled axes inner-most.
pub fn finalize(mut cnn_loop: CnnLoop) -> Result<CnnLoop> {
    let varset = *cnn_loop.variable_set();
    cnn_loop.off_structure_mut().tag_stationary(varset.off(), varset.on());
    cnn_loop.set_on_structure(Scheduler::fix_on_loop_structure());
    cnn_loop.move_fully_tiled_to_inner_most()?;
    cnn_loop.check_valid()?;
    Ok(cnn_loop)
}

/// Search and finalize the loop nest of `layer`.
#[tracing::instrument(skip_all, fields(in_w = layer.in_w, in_h = layer.in_h, in_c = layer.in_c, out_c = layer.out_c))]
pub fn compile(layer: &ConvLayer, scheduler: &Scheduler) -> Result<Compiled> {
    let cnn_loop = CnnLoop::from_layer(layer)?;
    let result = scheduler.search_best_loop_case(&cnn_loop)?;
    let cnn_loop = finalize(result.cnn_loop)?;
    info!(order = ?cnn_loop.off_structure().axes(), stationary = ?cnn_loop.off_structure().stationary(), "compiled layer");
    Ok(Compiled { cnn_loop, stationary: result.stationary, edp: result.edp })
}

/// Write the tiling dump and the loop-structure dump of `cnn_loop`.
pub fn write_dumps(cnn_loop: &CnnLoop, tiling_path: &Path, structure_path: &Path) -> Result<()> {
    fs::write(tiling_path, TilingDump::from_loop(cnn_loop).to_string()).context(IoSnafu { path: tiling_path })?;
    fs::write(structure_path, StructureDump::from_loop(cnn_loop).to_string())
        .context(IoSnafu { path: structure_path })?;
    Ok(())
}

/// Rebuild a finalized loop for `layer` from parsed dumps.
///
/// The layer supplies the off-chip level; the dumps supply the on-chip and
/// parallel levels and both loop orders. Off-chip flags are re-derived.
pub fn apply_prescheduled(layer: &ConvLayer, tiling: TilingDump, structures: StructureDump) -> Result<CnnLoop> {
    let mut cnn_loop = CnnLoop::from_layer(layer)?;
    let varset = cnn_loop.variable_set_mut();
    varset.set_on(tiling.on);
    varset.set_parallel(tiling.parallel);
    let varset = *varset;

    let mut off_structure = structures.off;
    off_structure.tag_stationary(varset.off(), varset.on());
    cnn_loop.set_off_structure(off_structure);
    cnn_loop.set_on_structure(structures.on);
    cnn_loop.check_valid()?;
    Ok(cnn_loop)
}

/// Load a loop for `layer` from the files written by [`write_dumps`].
pub fn load_prescheduled(layer: &ConvLayer, tiling_path: &Path, structure_path: &Path) -> Result<CnnLoop> {
    let tiling = fs::read_to_string(tiling_path).context(IoSnafu { path: tiling_path })?.parse::<TilingDump>()?;
    let structures =
        fs::read_to_string(structure_path).context(IoSnafu { path: structure_path })?.parse::<StructureDump>()?;
    apply_prescheduled(layer, tiling, structures)
}
