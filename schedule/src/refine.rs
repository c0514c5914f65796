//! Stage D: exhaustive refinement of the free tile extents.
//!
//! The six free extents (kernel width and height, output width and height,
//! input and output channels) each range from their seeded tile up to the full
//! layer. The product space is numbered by a mixed-radix integer `it` in
//! `1..=total`, kernel width being the fastest digit, so a contiguous range
//! of `it` is a self-contained unit of work.

use std::ops::RangeInclusive;

use parking_lot::Mutex;
use tessel_ir::{CnnLoop, Dim, Stationary, VariableSet, tile_input_len};
use tracing::trace;

use crate::architecture::Architecture;
use crate::cost::{edp, is_memory_size_overflow};
use crate::unroll::make_parl_loop_variables;

/// Free extents in radix order, fastest first.
pub const FREE_DIMS: [Dim; 6] =
    [Dim::KernelWidth, Dim::KernelHeight, Dim::OutputWidth, Dim::OutputHeight, Dim::InputChannel, Dim::OutputChannel];

// ============================================================================
// CANDIDATE SPACE
// ============================================================================

/// Mixed-radix numbering of the tiles reachable from a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSpace {
    seed: VariableSet,
    radices: [u64; FREE_DIMS.len()],
}

impl CandidateSpace {
    /// Space between the seed tile of `varset` and its full layer.
    pub fn new(varset: &VariableSet) -> Self {
        let (off, on) = (varset.off(), varset.on());
        let radices = FREE_DIMS.map(|dim| (off.get(dim) - on.get(dim) + 1).max(1) as u64);
        Self { seed: *varset, radices }
    }

    pub fn radices(&self) -> [u64; FREE_DIMS.len()] {
        self.radices
    }

    pub fn total(&self) -> u64 {
        self.radices.iter().product()
    }

    /// Tile sizes of candidate `it`, `1 <= it <= total`.
    ///
    /// Input tile extents follow from the output tile, stride and the
    /// candidate's kernel tile, capped at the full input. The parallel level
    /// is left as seeded.
    pub fn decode(&self, it: u64) -> VariableSet {
        let mut varset = self.seed;
        let off = *varset.off();
        let on = varset.on_mut();

        let mut digits = it - 1;
        for (&dim, &radix) in FREE_DIMS.iter().zip(&self.radices) {
            on.set(dim, on.get(dim) + (digits % radix) as i64);
            digits /= radix;
        }
        on.in_w = tile_input_len(on.out_w, on.k_w, off.stride).min(off.in_w);
        on.in_h = tile_input_len(on.out_h, on.k_h, off.stride).min(off.in_h);
        varset
    }
}

/// Contiguous `it` ranges, one per worker.
///
/// With fewer candidates than workers every candidate gets its own range.
/// Otherwise ranges have equal length and the last one takes the remainder.
pub fn partition(total: u64, workers: usize) -> Vec<RangeInclusive<u64>> {
    let workers = (workers.max(1) as u64).min(total);
    if workers == 0 {
        return Vec::new();
    }
    let chunk = total / workers;
    (0..workers)
        .map(|t| {
            let start = t * chunk + 1;
            let end = if t + 1 == workers { total } else { (t + 1) * chunk };
            start..=end
        })
        .collect()
}

// ============================================================================
// WORKER
// ============================================================================

/// Candidate counter shared by all workers.
#[derive(Debug)]
pub struct Progress {
    evaluated: Mutex<u64>,
    total: u64,
    interval: u64,
}

impl Progress {
    pub fn new(total: u64, interval: u64) -> Self {
        Self { evaluated: Mutex::new(0), total, interval: interval.max(1) }
    }

    pub fn evaluated(&self) -> u64 {
        *self.evaluated.lock()
    }

    fn advance(&self, count: u64) {
        let mut evaluated = self.evaluated.lock();
        *evaluated += count;
        trace!(evaluated = *evaluated, total = self.total, "refinement progress");
    }
}

/// Best tiling found in one range.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub cnn_loop: CnnLoop,
    pub edp: f64,
    /// Position of the candidate in its [`CandidateSpace`].
    pub it: u64,
}

/// Evaluate every candidate in `range` and keep the lowest EDP.
///
/// Candidates overflowing on-chip memory are skipped. A later candidate
/// replaces the best only with a strictly smaller EDP, so among equal scores
/// the lowest `it` wins. `None` if nothing in the range fits.
pub fn search_range(
    seed: &CnnLoop,
    space: &CandidateSpace,
    range: RangeInclusive<u64>,
    arch: &Architecture,
    stationary: Stationary,
    progress: &Progress,
) -> Option<Candidate> {
    let mut best: Option<(VariableSet, f64, u64)> = None;
    let mut pending = 0;

    for it in range {
        pending += 1;
        if pending == progress.interval {
            progress.advance(pending);
            pending = 0;
        }

        let mut varset = space.decode(it);
        if is_memory_size_overflow(&varset, arch) {
            continue;
        }
        varset.set_parallel(make_parl_loop_variables(varset.on(), arch));

        let score = edp(&varset, arch, stationary);
        if best.as_ref().is_none_or(|&(_, best_score, _)| score < best_score) {
            best = Some((varset, score, it));
        }
    }
    if pending > 0 {
        progress.advance(pending);
    }

    best.map(|(varset, edp, it)| {
        let mut cnn_loop = seed.clone();
        cnn_loop.set_variable_set(varset);
        Candidate { cnn_loop, edp, it }
    })
}

/// Fold per-range bests in range order, keeping the earlier one on ties.
pub fn reduce(candidates: impl IntoIterator<Item = Option<Candidate>>) -> Option<Candidate> {
    candidates.into_iter().flatten().fold(None, |best, candidate| match best {
        Some(best) if best.edp <= candidate.edp => Some(best),
        _ => Some(candidate),
    })
}
