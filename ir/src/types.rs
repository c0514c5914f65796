//! Enumerations shared by the whole loop-nest model.
//!
//! - [`Axis`]: the four logical loops of a convolution tiling.
//! - [`Position`]: the four nest positions an axis can occupy.
//! - [`Stationary`]: which operand stays resident while the others stream.
//! - [`Dim`]: the eight concrete extents an [`Axis`] is made of.

use std::fmt;

use snafu::OptionExt;

use crate::error::{InvalidAxisOrdinalSnafu, InvalidPositionOrdinalSnafu, Result, UnknownLabelSnafu};

/// Logical loop axis of a convolution.
///
/// Width and height of the kernel map and the output map are tiled and
/// unrolled together, so they form a single axis each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Axis {
    /// Kernel width x height.
    KernelMap = 0,
    InputChannel = 1,
    /// Output width x height.
    OutputMap = 2,
    OutputChannel = 3,
}

impl Axis {
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Result<Self> {
        u8::try_from(ordinal).ok().and_then(Self::from_repr).context(InvalidAxisOrdinalSnafu { ordinal })
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::KernelMap => "Kernel_Map",
            Self::InputChannel => "Input_Channel",
            Self::OutputMap => "Output_Map",
            Self::OutputChannel => "Output_Channel",
        }
    }

    /// Parse a dump label. Matching ignores ASCII case.
    pub fn from_label(label: &str) -> Result<Self> {
        <Self as strum::VariantArray>::VARIANTS
            .iter()
            .copied()
            .find(|axis| axis.label().eq_ignore_ascii_case(label))
            .context(UnknownLabelSnafu { label })
    }

    /// Concrete extents that make up this axis.
    pub const fn dims(self) -> &'static [Dim] {
        match self {
            Self::KernelMap => &[Dim::KernelWidth, Dim::KernelHeight],
            Self::InputChannel => &[Dim::InputChannel],
            Self::OutputMap => &[Dim::OutputWidth, Dim::OutputHeight],
            Self::OutputChannel => &[Dim::OutputChannel],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Nest position, ordered from inner-most to outer-most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Position {
    InnerMost = 0,
    SecondInnerMost = 1,
    ThirdInnerMost = 2,
    OuterMost = 3,
}

impl Position {
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Result<Self> {
        u8::try_from(ordinal).ok().and_then(Self::from_repr).context(InvalidPositionOrdinalSnafu { ordinal })
    }

    /// The adjacent position one step closer to inner-most, if any.
    pub fn inner(self) -> Option<Self> {
        self.ordinal().checked_sub(1).and_then(|ordinal| Self::from_ordinal(ordinal).ok())
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InnerMost => "Inner_Most",
            Self::SecondInnerMost => "Second_Inner_Most",
            Self::ThirdInnerMost => "Third_Inner_Most",
            Self::OuterMost => "Outer_Most",
        }
    }

    /// Parse a dump label. A trailing `:` is accepted and case is ignored.
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.strip_suffix(':').unwrap_or(label);
        <Self as strum::VariantArray>::VARIANTS
            .iter()
            .copied()
            .find(|position| position.label().eq_ignore_ascii_case(trimmed))
            .context(UnknownLabelSnafu { label })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stationary dataflow: the operand kept resident across the inner loops.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray)]
#[derive(enumset::EnumSetType)]
#[enumset(no_ops)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stationary {
    Input,
    Weight,
    Output,
}

impl fmt::Display for Stationary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input stationary"),
            Self::Weight => f.write_str("weight stationary"),
            Self::Output => f.write_str("output stationary"),
        }
    }
}

/// One concrete extent of a convolution.
///
/// This is also the vocabulary of PE-array mappings: an accelerator maps a
/// list of `Dim`s onto each physical dimension of its PE array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::EnumString, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dim {
    #[strum(serialize = "KW")]
    KernelWidth,
    #[strum(serialize = "KH")]
    KernelHeight,
    #[strum(serialize = "IC")]
    InputChannel,
    #[strum(serialize = "OW")]
    OutputWidth,
    #[strum(serialize = "OH")]
    OutputHeight,
    #[strum(serialize = "OC")]
    OutputChannel,
    #[strum(serialize = "IW")]
    InputWidth,
    #[strum(serialize = "IH")]
    InputHeight,
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
