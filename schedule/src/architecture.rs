//! Accelerator description consumed by the search.
//!
//! An [`Architecture`] is read-only for the duration of a scheduling run. It
//! carries the PE-array shape, the row/column mapping of layer extents onto
//! that shape, on-chip buffer capacities and the throughput figures used by
//! the cost model.

use bon::bon;
use smallvec::{SmallVec, smallvec};
use snafu::ensure;
use strum::VariantArray;
use tessel_ir::Dim;

use crate::error::{InvalidArchitectureSnafu, Result};

/// Physical dimension of the PE array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumCount, strum::VariantArray, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeDim {
    Row = 0,
    Column = 1,
}

impl PeDim {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Layer extents unrolled along one PE dimension, in unroll priority order.
pub type PeMapping = SmallVec<[Dim; 4]>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Architecture {
    /// Cycles per multiply-accumulate.
    pub mac_cycles: i64,
    /// Clock frequency in GHz.
    pub frequency: f64,
    /// Off-chip bandwidth in GB/s.
    pub bandwidth: f64,
    /// On-chip buffer capacities in bytes.
    pub input_mem_size: i64,
    pub weight_mem_size: i64,
    pub output_mem_size: i64,
    /// PE count along [`PeDim::Row`] and [`PeDim::Column`].
    pub pe_dims: [i64; 2],
    /// Extents mapped onto each PE dimension, indexed like `pe_dims`.
    pub pe_structure: [PeMapping; 2],
}

#[bon]
impl Architecture {
    #[builder]
    pub fn builder(
        #[builder(default = 1)] mac_cycles: i64,
        frequency: f64,
        bandwidth: f64,
        input_mem_size: i64,
        weight_mem_size: i64,
        output_mem_size: i64,
        pe_rows: i64,
        pe_columns: i64,
        #[builder(default, into)] row_mapping: PeMapping,
        #[builder(default, into)] column_mapping: PeMapping,
    ) -> Self {
        Self {
            mac_cycles,
            frequency,
            bandwidth,
            input_mem_size,
            weight_mem_size,
            output_mem_size,
            pe_dims: [pe_rows, pe_columns],
            pe_structure: [row_mapping, column_mapping],
        }
    }
}

impl Architecture {
    /// 8x8 SIMD array with output channels on rows and input channels on columns.
    pub fn simd_8x8() -> Self {
        Self {
            mac_cycles: 1,
            frequency: 0.2,
            bandwidth: 0.8,
            input_mem_size: 64 * 1024,
            weight_mem_size: 64 * 1024,
            output_mem_size: 64 * 1024,
            pe_dims: [8, 8],
            pe_structure: [smallvec![Dim::OutputChannel], smallvec![Dim::InputChannel]],
        }
    }

    pub fn pe_len(&self, dim: PeDim) -> i64 {
        self.pe_dims[dim.index()]
    }

    pub fn mapping(&self, dim: PeDim) -> &[Dim] {
        &self.pe_structure[dim.index()]
    }

    pub fn num_pes(&self) -> i64 {
        self.pe_dims.iter().product()
    }

    pub fn check_valid(&self) -> Result<()> {
        for &pe_dim in PeDim::VARIANTS {
            let len = self.pe_len(pe_dim);
            ensure!(len > 0, InvalidArchitectureSnafu { reason: format!("{} length must be positive, got {len}", pe_dim.as_ref()) });
        }
        for (name, size) in
            [("input", self.input_mem_size), ("weight", self.weight_mem_size), ("output", self.output_mem_size)]
        {
            ensure!(size > 0, InvalidArchitectureSnafu { reason: format!("{name} memory must be positive, got {size}") });
        }
        ensure!(self.mac_cycles > 0, InvalidArchitectureSnafu { reason: "mac cycles must be positive" });
        ensure!(self.frequency > 0.0, InvalidArchitectureSnafu { reason: "frequency must be positive" });
        ensure!(self.bandwidth > 0.0, InvalidArchitectureSnafu { reason: "bandwidth must be positive" });

        let mapped: SmallVec<[Dim; 8]> = self.pe_structure.iter().flatten().copied().collect();
        for (i, dim) in mapped.iter().enumerate() {
            ensure!(
                !mapped[i + 1..].contains(dim),
                InvalidArchitectureSnafu { reason: format!("{dim} is mapped onto the PE array more than once") }
            );
        }
        Ok(())
    }
}
