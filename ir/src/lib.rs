//! Loop-nest data model for convolution tiling.
//!
//! A convolution layer mapped onto a PE array is described by three nest
//! levels (off-chip layer, on-chip tile, per-cycle unroll) and the loop order
//! at each level interface. The search passes in `tessel-schedule` read and
//! rewrite these types.
//!
//! # Module Organization
//!
//! - [`types`] - Axis, position, stationary dataflow and extent enums
//! - [`variables`] - One nest level and its derived sizes
//! - [`layer`] - Layer parameters and extent conversions
//! - [`variable_set`] - Three levels with containment invariants
//! - [`structure`] - Axis/position bijection, presets and stationary tagging
//! - [`cnn_loop`] - The aggregate passed between search candidates
//! - [`dump`] - Text persistence of scheduled nests
//! - [`error`] - Error types and result handling

pub mod cnn_loop;
pub mod dump;
pub mod error;
pub mod layer;
pub mod structure;
pub mod types;
pub mod variable_set;
pub mod variables;


pub use cnn_loop::CnnLoop;
pub use dump::{StructureDump, TilingDump};
pub use error::{Error, Result};
pub use layer::{ConvLayer, input_len, output_len, tile_input_len, tile_output_len};
pub use structure::Structure;
pub use types::{Axis, Dim, Position, Stationary};
pub use variable_set::VariableSet;
pub use variables::{ELEMENT_BYTES, NON_VALID, Variables};
