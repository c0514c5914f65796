use snafu::Snafu;

use crate::types::{Axis, Dim, Position};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid loop-nest configuration.
///
/// Every variant describes a broken invariant of the data model: a field left
/// unset, a tile larger than its layer, a non-bijective loop order, or a dump
/// that does not describe a loop nest.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A field still holds the `NON_VALID` sentinel (or any out-of-range value).
    #[snafu(display("{field} is not valid: {value}"))]
    NonValidField { field: &'static str, value: i64 },

    /// Lower level exceeds the level above it.
    #[snafu(display("containment violated on {dim}: upper {upper} < lower {lower}"))]
    RangeViolation { dim: Dim, upper: i64, lower: i64 },

    /// Stride differs between loop levels.
    #[snafu(display("stride mismatch across levels: off {off}, on {on}, parallel {parallel}"))]
    StrideMismatch { off: i64, on: i64, parallel: i64 },

    /// Two positions refer to the same axis, or a position points back to a different axis.
    #[snafu(display("position {position:?} is bound to {axis:?} but {axis:?} is bound to {back:?}"))]
    PositionConflict { position: Position, axis: Axis, back: Position },

    /// An axis is bound to a position that holds a different axis.
    #[snafu(display("axis {axis:?} is bound to {position:?} but {position:?} holds {back:?}"))]
    AxisConflict { axis: Axis, position: Position, back: Axis },

    #[snafu(display("axis ordinal {ordinal} is out of range"))]
    InvalidAxisOrdinal { ordinal: usize },

    #[snafu(display("position ordinal {ordinal} is out of range"))]
    InvalidPositionOrdinal { ordinal: usize },

    #[snafu(display("unknown label {label:?}"))]
    UnknownLabel { label: String },

    #[snafu(display("malformed dump: {reason}"))]
    MalformedDump { reason: String },
}
