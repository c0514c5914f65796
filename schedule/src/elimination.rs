//! Stage B: make as many axes fully tiled as on-chip memory allows.

use tessel_ir::{Axis, CnnLoop, Stationary};
use tracing::{debug, warn};

use crate::architecture::Architecture;
use crate::cost::is_memory_size_overflow;

const TRIPLES: [[Axis; 3]; 4] = [
    [Axis::KernelMap, Axis::OutputMap, Axis::InputChannel],
    [Axis::KernelMap, Axis::OutputMap, Axis::OutputChannel],
    [Axis::KernelMap, Axis::InputChannel, Axis::OutputChannel],
    [Axis::OutputMap, Axis::InputChannel, Axis::OutputChannel],
];

const PAIRS: [[Axis; 2]; 6] = [
    [Axis::KernelMap, Axis::OutputMap],
    [Axis::KernelMap, Axis::InputChannel],
    [Axis::KernelMap, Axis::OutputChannel],
    [Axis::OutputMap, Axis::InputChannel],
    [Axis::OutputMap, Axis::OutputChannel],
    [Axis::InputChannel, Axis::OutputChannel],
];

/// Outcome of [`loop_elimination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elimination {
    /// Some set of axes could be fully tiled within on-chip memory.
    Fits(CnnLoop),
    /// Nothing fits; the input loop is handed back unchanged.
    Overflow(CnnLoop),
}

impl Elimination {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Fits(_))
    }

    pub fn cnn_loop(&self) -> &CnnLoop {
        match self {
            Self::Fits(cnn_loop) | Self::Overflow(cnn_loop) => cnn_loop,
        }
    }

    pub fn into_loop(self) -> CnnLoop {
        match self {
            Self::Fits(cnn_loop) | Self::Overflow(cnn_loop) => cnn_loop,
        }
    }
}

fn fully_tiled(cnn_loop: &CnnLoop, axes: &[Axis]) -> CnnLoop {
    let mut candidate = cnn_loop.clone();
    for &axis in axes {
        candidate.variable_set_mut().make_fully_tiled(axis);
    }
    candidate
}

fn output_stationary(mut cnn_loop: CnnLoop) -> CnnLoop {
    cnn_loop.off_structure_mut().set_stationary(Stationary::Output);
    cnn_loop
}

/// Loop iterations a pair of fully tiled axes removes.
fn pair_score(cnn_loop: &CnnLoop, pair: &[Axis; 2]) -> i64 {
    let off = cnn_loop.variable_set().off();
    pair.iter().map(|&axis| off.extent(axis)).product()
}

/// Greedy elimination of off-chip loops.
///
/// All four axes are tried first, then the four triples in a fixed order;
/// the first one that fits wins and takes the output-stationary order. If no
/// triple fits, the fitting pair removing the most iterations wins, the
/// earlier pair on a tie.
#[tracing::instrument(skip_all)]
pub fn loop_elimination(cnn_loop: &CnnLoop, arch: &Architecture) -> Elimination {
    let fits = |candidate: &CnnLoop| !is_memory_size_overflow(candidate.variable_set(), arch);

    let all = fully_tiled(cnn_loop, &[Axis::KernelMap, Axis::InputChannel, Axis::OutputMap, Axis::OutputChannel]);
    if fits(&all) {
        debug!("whole layer fits on-chip");
        return Elimination::Fits(output_stationary(all));
    }

    for triple in &TRIPLES {
        let candidate = fully_tiled(cnn_loop, triple);
        if fits(&candidate) {
            debug!(axes = ?triple, "fully tiled triple");
            return Elimination::Fits(output_stationary(candidate));
        }
    }

    let mut best: Option<(i64, CnnLoop)> = None;
    for pair in &PAIRS {
        let candidate = fully_tiled(cnn_loop, pair);
        if !fits(&candidate) {
            continue;
        }
        let score = pair_score(cnn_loop, pair);
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            debug!(axes = ?pair, score, "fully tiled pair");
            best = Some((score, candidate));
        }
    }

    match best {
        Some((_, candidate)) => Elimination::Fits(candidate),
        None => {
            warn!("no loop elimination fits on-chip memory, keeping seeded tile");
            Elimination::Overflow(cnn_loop.clone())
        }
    }
}
