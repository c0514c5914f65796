//! Memory feasibility and the energy-delay objective.
//!
//! Every candidate tiling is checked against the on-chip buffers with
//! [`is_memory_size_overflow`] and ranked by [`edp`]: off-chip traffic under
//! the chosen dataflow divided by the throughput the PE array can sustain.

use strum::VariantArray;
use tessel_ir::{Dim, Stationary, VariableSet, Variables};

use crate::architecture::{Architecture, PeDim};
use crate::math::ceil_div;

/// Scale applied to the final score.
pub const EDP_CORRECTION: f64 = 1000.0;

// ============================================================================
// MEMORY
// ============================================================================

/// Buffer capacity available to a tile of `tile_bytes` out of `full_bytes`.
///
/// A tile smaller than its operand is double-buffered and gets half the buffer.
fn usable_capacity(mem_size: i64, tile_bytes: i64, full_bytes: i64) -> i64 {
    if tile_bytes < full_bytes { mem_size / 2 } else { mem_size }
}

/// Whether any on-chip tile exceeds its usable buffer capacity.
pub fn is_memory_size_overflow(varset: &VariableSet, arch: &Architecture) -> bool {
    let (off, on) = (varset.off(), varset.on());
    let operands = [
        (on.input_bytes(), off.input_bytes(), arch.input_mem_size),
        (on.weight_bytes(), off.weight_bytes(), arch.weight_mem_size),
        (on.output_bytes(), off.output_bytes(), arch.output_mem_size),
    ];
    operands.into_iter().any(|(tile, full, mem)| tile > usable_capacity(mem, tile, full))
}

// ============================================================================
// DRAM TRAFFIC
// ============================================================================

fn tiles(off: &Variables, on: &Variables, dims: &[Dim]) -> i64 {
    dims.iter().map(|&dim| ceil_div(off.get(dim), on.get(dim))).product()
}

/// Times the input tile is fetched from off-chip memory.
pub fn input_reload(varset: &VariableSet, stationary: Stationary) -> i64 {
    match stationary {
        Stationary::Input => 1,
        _ => tiles(varset.off(), varset.on(), &[Dim::KernelWidth, Dim::KernelHeight, Dim::OutputChannel]),
    }
}

/// Times the weight tile is fetched from off-chip memory.
pub fn weight_reload(varset: &VariableSet, stationary: Stationary) -> i64 {
    match stationary {
        Stationary::Weight => 1,
        _ => tiles(varset.off(), varset.on(), &[Dim::OutputWidth, Dim::OutputHeight]),
    }
}

/// Times partial sums travel between on-chip and off-chip memory.
///
/// Every reduction step but the first reloads a partial sum and stores it
/// back.
pub fn output_reload(varset: &VariableSet, stationary: Stationary) -> i64 {
    match stationary {
        Stationary::Output => 1,
        _ => {
            let steps =
                tiles(varset.off(), varset.on(), &[Dim::KernelWidth, Dim::KernelHeight, Dim::InputChannel]);
            2 * (steps - 1)
        }
    }
}

/// Off-chip traffic of one tiling under one dataflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DramTraffic {
    pub input_reload: i64,
    pub weight_reload: i64,
    pub output_reload: i64,
    pub input_bytes: i64,
    pub weight_bytes: i64,
    pub output_bytes: i64,
}

impl DramTraffic {
    pub fn new(varset: &VariableSet, stationary: Stationary) -> Self {
        let off = varset.off();
        Self {
            input_reload: input_reload(varset, stationary),
            weight_reload: weight_reload(varset, stationary),
            output_reload: output_reload(varset, stationary),
            input_bytes: off.input_bytes(),
            weight_bytes: off.weight_bytes(),
            output_bytes: off.output_bytes(),
        }
    }

    pub fn input(&self) -> i64 {
        self.input_reload * self.input_bytes
    }

    pub fn weight(&self) -> i64 {
        self.weight_reload * self.weight_bytes
    }

    pub fn output(&self) -> i64 {
        self.output_reload * self.output_bytes
    }

    pub fn total(&self) -> i64 {
        self.input() + self.weight() + self.output()
    }
}

// ============================================================================
// OBJECTIVE
// ============================================================================

/// Multiply-accumulates in the whole layer.
pub fn num_ops(off: &Variables) -> i64 {
    [Dim::KernelWidth, Dim::KernelHeight, Dim::InputChannel, Dim::OutputWidth, Dim::OutputHeight, Dim::OutputChannel]
        .iter()
        .map(|&dim| off.get(dim))
        .product()
}

/// Fraction of PEs doing useful work, over every mapped extent.
///
/// An unroll that does not divide its tile leaves the last pass partially
/// idle.
pub fn pe_utilization(varset: &VariableSet, arch: &Architecture) -> f64 {
    let (on, parallel) = (varset.on(), varset.parallel());
    PeDim::VARIANTS
        .iter()
        .flat_map(|&pe_dim| arch.mapping(pe_dim))
        .map(|&dim| {
            let (tile, unroll) = (on.get(dim), parallel.get(dim));
            tile as f64 / (ceil_div(tile, unroll) * unroll) as f64
        })
        .product()
}

/// Energy-delay proxy of a tiling: off-chip bytes over achievable throughput.
///
/// Throughput is the smaller of the compute bound and the bandwidth bound.
/// Lower is better.
pub fn edp(varset: &VariableSet, arch: &Architecture, stationary: Stationary) -> f64 {
    let dram = DramTraffic::new(varset, stationary).total() as f64;
    let ops = num_ops(varset.off()) as f64;
    let compute = arch.frequency * arch.num_pes() as f64 * pe_utilization(varset, arch);
    let memory = ops * arch.bandwidth / dram;
    dram / compute.min(memory) / EDP_CORRECTION
}
