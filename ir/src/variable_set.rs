use snafu::ensure;
use tracing::trace;

use crate::error::{Result, StrideMismatchSnafu};
use crate::layer::ConvLayer;
use crate::types::Axis;
use crate::variables::Variables;

/// The three levels of a loop nest.
///
/// - `off`: the full layer as it lives off-chip.
/// - `on`: the on-chip tile.
/// - `parallel`: the per-cycle unroll across the PE array.
///
/// Valid sets share one stride and satisfy `off >= on >= parallel` on every extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableSet {
    off: Variables,
    on: Variables,
    parallel: Variables,
}

impl VariableSet {
    pub fn new(off: Variables, on: Variables, parallel: Variables) -> Self {
        Self { off, on, parallel }
    }

    /// Untiled set: all three levels equal the full layer.
    pub fn from_layer(layer: &ConvLayer) -> Result<Self> {
        let full = layer.variables()?;
        Ok(Self { off: full, on: full, parallel: full })
    }

    pub fn off(&self) -> &Variables {
        &self.off
    }

    pub fn on(&self) -> &Variables {
        &self.on
    }

    pub fn parallel(&self) -> &Variables {
        &self.parallel
    }

    pub fn on_mut(&mut self) -> &mut Variables {
        &mut self.on
    }

    pub fn parallel_mut(&mut self) -> &mut Variables {
        &mut self.parallel
    }

    pub fn set_off(&mut self, off: Variables) {
        self.off = off;
    }

    pub fn set_on(&mut self, on: Variables) {
        self.on = on;
    }

    pub fn set_parallel(&mut self, parallel: Variables) {
        self.parallel = parallel;
    }

    /// Set the stride on every level.
    pub fn set_stride(&mut self, stride: i64) {
        self.off.stride = stride;
        self.on.stride = stride;
        self.parallel.stride = stride;
    }

    /// Set the padding on every level.
    pub fn set_padding(&mut self, pad_w: i64, pad_h: i64) {
        for level in [&mut self.off, &mut self.on, &mut self.parallel] {
            level.pad_w = pad_w;
            level.pad_h = pad_h;
        }
    }

    /// The common stride. Fails if the levels disagree.
    pub fn stride(&self) -> Result<i64> {
        let (off, on, parallel) = (self.off.stride, self.on.stride, self.parallel.stride);
        ensure!(off == on && on == parallel, StrideMismatchSnafu { off, on, parallel });
        Ok(off)
    }

    /// Whether the on-chip tile covers the whole layer along `axis`.
    pub fn is_fully_tiled(&self, axis: Axis) -> bool {
        axis.dims().iter().all(|&dim| self.off.get(dim) == self.on.get(dim))
    }

    /// Make `axis` fully tiled on-chip.
    ///
    /// A full output map also takes the full input map with it.
    pub fn make_fully_tiled(&mut self, axis: Axis) {
        for &dim in axis.dims() {
            self.on.set(dim, self.off.get(dim));
        }
        if axis == Axis::OutputMap {
            self.on.in_w = self.off.in_w;
            self.on.in_h = self.off.in_h;
        }
    }

    /// Exchange width and height of the on-chip and parallel levels.
    ///
    /// Refused (returns `false`) when the swapped tile would no longer fit in the layer.
    /// Kernel extents are left in place, so for a non-square kernel the swapped
    /// input tile is not re-derived from the swapped output tile.
    pub fn swap_tile_width_height(&mut self) -> bool {
        let fits = self.off.out_w >= self.on.out_h
            && self.off.out_h >= self.on.out_w
            && self.off.in_w >= self.on.in_h
            && self.off.in_h >= self.on.in_w;
        if fits {
            self.on.swap_width_height();
            self.parallel.swap_width_height();
        } else {
            trace!(tile.out_w = self.on.out_w, tile.out_h = self.on.out_h, "width/height swap refused");
        }
        fits
    }

    pub fn check_valid(&self) -> Result<()> {
        self.off.check_valid()?;
        self.on.check_valid()?;
        self.parallel.check_valid()?;
        self.stride()?;
        Variables::check_range(&self.off, &self.on)?;
        Variables::check_range(&self.on, &self.parallel)
    }
}
