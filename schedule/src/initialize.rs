//! Stage A: seed the on-chip tile from the PE-array shape.

use strum::VariantArray;
use tessel_ir::{CnnLoop, Dim, VariableSet, tile_input_len, tile_output_len};
use tracing::debug;

use crate::architecture::{Architecture, PeDim};
use crate::unroll::make_parl_loop_variables;

/// Seed tile sizes so that every PE has work in the first pass.
///
/// The kernel is kept whole, channels start at 1 and the output map starts as
/// a full-width stripe one row high. Each PE dimension then hands its length
/// to the extents mapped onto it, in mapping order, and an output or input
/// extent drags its counterpart along through stride and kernel. The parallel
/// level is recomputed for the seeded tile.
#[tracing::instrument(skip_all, fields(pe_dims = ?arch.pe_dims))]
pub fn loop_initializing(varset: &VariableSet, arch: &Architecture) -> VariableSet {
    let off = *varset.off();
    let stride = off.stride;
    let mut on = off;

    on.in_c = 1;
    on.out_c = 1;
    on.out_h = 1;
    on.in_h = tile_input_len(1, off.k_h, stride).min(off.in_h);

    for &pe_dim in PeDim::VARIANTS {
        let mut remaining = arch.pe_len(pe_dim);
        for &dim in arch.mapping(pe_dim) {
            let tile = match dim {
                Dim::KernelWidth | Dim::KernelHeight => continue,
                Dim::InputChannel | Dim::OutputChannel => remaining.min(off.get(dim)),
                Dim::OutputWidth => {
                    let tile = remaining.min(off.out_w);
                    on.in_w = tile_input_len(tile, on.k_w, stride).min(off.in_w);
                    tile
                }
                Dim::OutputHeight => {
                    let tile = remaining.min(off.out_h);
                    on.in_h = tile_input_len(tile, on.k_h, stride).min(off.in_h);
                    tile
                }
                Dim::InputWidth => {
                    let tile = remaining.min(off.in_w);
                    on.out_w = tile_output_len(tile, on.k_w, stride).min(off.out_w);
                    tile
                }
                Dim::InputHeight => {
                    let tile = remaining.min(off.in_h);
                    on.out_h = tile_output_len(tile, on.k_h, stride).min(off.out_h);
                    tile
                }
            };
            on.set(dim, tile);
            remaining /= tile;
        }
    }

    on.in_w = on.in_w.max(on.k_w).min(off.in_w);
    on.in_h = on.in_h.max(on.k_h).min(off.in_h);

    debug!(
        tile.in_w = on.in_w,
        tile.in_h = on.in_h,
        tile.in_c = on.in_c,
        tile.out_w = on.out_w,
        tile.out_h = on.out_h,
        tile.out_c = on.out_c,
        "seeded on-chip tile"
    );

    VariableSet::new(off, on, make_parl_loop_variables(&on, arch))
}

/// [`loop_initializing`] applied to a whole loop, keeping its structures.
pub fn initialize_loop(cnn_loop: &CnnLoop, arch: &Architecture) -> CnnLoop {
    let mut seeded = cnn_loop.clone();
    seeded.set_variable_set(loop_initializing(cnn_loop.variable_set(), arch));
    seeded
}
