//! Distribution of the PE array over the extents mapped onto it.

use strum::VariantArray;
use tessel_ir::{Variables, tile_output_len};

use crate::architecture::{Architecture, PeDim};
use crate::math::{gcd, prime_factorization};

/// Per-cycle unroll factors for the on-chip tile `on`.
///
/// Each PE dimension is handed out to its mapped extents in order: first the
/// largest share dividing both tile and remaining PE length, then leftover
/// prime factors while the tile still holds that many unrolled steps.
/// Unmapped extents stay at 1. The input unroll covers at least the kernel
/// unroll, and an output unroll left at 1 follows from the input unroll.
/// The kernel in that input/output relation is the unroll-level kernel, not the tile's.
pub fn make_parl_loop_variables(on: &Variables, arch: &Architecture) -> Variables {
    let mut parallel = Variables::unit(on.stride, on.pad_w, on.pad_h);

    for &pe_dim in PeDim::VARIANTS {
        let mapping = arch.mapping(pe_dim);
        let mut pe_len = arch.pe_len(pe_dim);

        for &dim in mapping {
            let share = gcd(on.get(dim), pe_len);
            parallel.set(dim, share);
            pe_len /= share;
        }

        for &dim in mapping {
            for factor in prime_factorization(pe_len) {
                let unroll = parallel.get(dim);
                if on.get(dim) / unroll >= factor {
                    parallel.set(dim, unroll * factor);
                    pe_len /= factor;
                }
            }
        }
    }

    parallel.in_w = parallel.in_w.max(parallel.k_w).min(on.in_w);
    parallel.in_h = parallel.in_h.max(parallel.k_h).min(on.in_h);
    if parallel.out_w == 1 {
        parallel.out_w = tile_output_len(parallel.in_w, parallel.k_w, on.stride).min(on.out_w);
    }
    if parallel.out_h == 1 {
        parallel.out_h = tile_output_len(parallel.in_h, parallel.k_h, on.stride).min(on.out_h);
    }
    parallel
}
