//! Stage C: choose the dataflow from the dominant off-chip loop.

use smallvec::SmallVec;
use strum::VariantArray;
use tessel_ir::{Axis, CnnLoop, Stationary, VariableSet};
use tracing::debug;

use crate::math::ceil_div;

/// Off-chip iterations of `axis` for the current tile.
pub fn iteration_count(varset: &VariableSet, axis: Axis) -> i64 {
    let (off, on) = (varset.off(), varset.on());
    axis.dims().iter().map(|&dim| ceil_div(off.get(dim), on.get(dim))).product()
}

/// Dataflow that keeps the operand reused across `axis` resident.
fn stationary_for(axis: Axis) -> Stationary {
    match axis {
        Axis::KernelMap | Axis::OutputChannel => Stationary::Input,
        Axis::InputChannel => Stationary::Output,
        Axis::OutputMap => Stationary::Weight,
    }
}

/// Apply the preset of the axis with the most off-chip iterations.
///
/// Ties go to the earlier axis in declaration order. When every axis runs a
/// single iteration the output-stationary order is kept.
#[tracing::instrument(skip_all)]
pub fn loop_interchange(cnn_loop: &CnnLoop) -> (CnnLoop, Stationary) {
    let varset = cnn_loop.variable_set();
    let mut counts: SmallVec<[(Axis, i64); 4]> =
        Axis::VARIANTS.iter().map(|&axis| (axis, iteration_count(varset, axis))).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let stationary = match counts.first() {
        Some(&(axis, count)) if count > 1 => stationary_for(axis),
        _ => Stationary::Output,
    };
    debug!(?counts, ?stationary, "interchanged off-chip loops");

    let mut interchanged = cnn_loop.clone();
    interchanged.off_structure_mut().set_stationary(stationary);
    (interchanged, stationary)
}
