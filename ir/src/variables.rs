//! One level of a convolution loop nest.
//!
//! [`Variables`] holds the seven convolution extents plus stride and padding.
//! The same type describes the full layer, an on-chip tile, and a PE unroll;
//! [`VariableSet`](crate::VariableSet) ties three of them together.

use std::fmt;
use std::str::FromStr;

use snafu::{OptionExt, ensure};

use crate::error::{Error, MalformedDumpSnafu, NonValidFieldSnafu, RangeViolationSnafu, Result};
use crate::types::{Axis, Dim};

/// Sentinel for a field that has not been set.
pub const NON_VALID: i64 = -1;

/// Size in bytes of one tensor element (`f32`).
pub const ELEMENT_BYTES: i64 = std::mem::size_of::<f32>() as i64;

/// Dump labels in field order.
const LABELS: [&str; 11] = [
    "Stride:",
    "Input_width:",
    "Input_height:",
    "Input_channel:",
    "Padding_width:",
    "Padding_height:",
    "Kernel_width:",
    "Kernel_height:",
    "Output_width:",
    "Output_height:",
    "Output_channel:",
];

/// Extents of one loop level.
///
/// Fields default to [`NON_VALID`]; [`check_valid`](Self::check_valid) must
/// pass before any derived size is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variables {
    pub stride: i64,
    pub pad_w: i64,
    pub pad_h: i64,
    pub in_w: i64,
    pub in_h: i64,
    pub in_c: i64,
    pub k_w: i64,
    pub k_h: i64,
    pub out_w: i64,
    pub out_h: i64,
    pub out_c: i64,
}

impl Default for Variables {
    fn default() -> Self {
        Self {
            stride: NON_VALID,
            pad_w: NON_VALID,
            pad_h: NON_VALID,
            in_w: NON_VALID,
            in_h: NON_VALID,
            in_c: NON_VALID,
            k_w: NON_VALID,
            k_h: NON_VALID,
            out_w: NON_VALID,
            out_h: NON_VALID,
            out_c: NON_VALID,
        }
    }
}

impl Variables {
    /// A level with every extent set to 1, keeping stride and padding.
    ///
    /// This is the starting point of an unroll before any PE-array mapping.
    pub fn unit(stride: i64, pad_w: i64, pad_h: i64) -> Self {
        Self { stride, pad_w, pad_h, in_w: 1, in_h: 1, in_c: 1, k_w: 1, k_h: 1, out_w: 1, out_h: 1, out_c: 1 }
    }

    pub fn get(&self, dim: Dim) -> i64 {
        match dim {
            Dim::KernelWidth => self.k_w,
            Dim::KernelHeight => self.k_h,
            Dim::InputChannel => self.in_c,
            Dim::OutputWidth => self.out_w,
            Dim::OutputHeight => self.out_h,
            Dim::OutputChannel => self.out_c,
            Dim::InputWidth => self.in_w,
            Dim::InputHeight => self.in_h,
        }
    }

    pub fn set(&mut self, dim: Dim, value: i64) {
        *self.get_mut(dim) = value;
    }

    fn get_mut(&mut self, dim: Dim) -> &mut i64 {
        match dim {
            Dim::KernelWidth => &mut self.k_w,
            Dim::KernelHeight => &mut self.k_h,
            Dim::InputChannel => &mut self.in_c,
            Dim::OutputWidth => &mut self.out_w,
            Dim::OutputHeight => &mut self.out_h,
            Dim::OutputChannel => &mut self.out_c,
            Dim::InputWidth => &mut self.in_w,
            Dim::InputHeight => &mut self.in_h,
        }
    }

    /// Product of the extents making up `axis`.
    pub fn extent(&self, axis: Axis) -> i64 {
        axis.dims().iter().map(|&dim| self.get(dim)).product()
    }

    /// Number of input elements (`in_w * in_h * in_c`).
    pub fn input_size(&self) -> i64 {
        self.in_w * self.in_h * self.in_c
    }

    /// Number of weight elements (`k_w * k_h * in_c * out_c`).
    pub fn weight_size(&self) -> i64 {
        self.k_w * self.k_h * self.in_c * self.out_c
    }

    /// Number of output elements (`out_w * out_h * out_c`).
    pub fn output_size(&self) -> i64 {
        self.out_w * self.out_h * self.out_c
    }

    pub fn input_bytes(&self) -> i64 {
        self.input_size() * ELEMENT_BYTES
    }

    pub fn weight_bytes(&self) -> i64 {
        self.weight_size() * ELEMENT_BYTES
    }

    pub fn output_bytes(&self) -> i64 {
        self.output_size() * ELEMENT_BYTES
    }

    /// Exchange the width and height of both the input and the output map.
    pub fn swap_width_height(&mut self) {
        std::mem::swap(&mut self.in_w, &mut self.in_h);
        std::mem::swap(&mut self.out_w, &mut self.out_h);
    }

    fn values(&self) -> [i64; 11] {
        [
            self.stride,
            self.in_w,
            self.in_h,
            self.in_c,
            self.pad_w,
            self.pad_h,
            self.k_w,
            self.k_h,
            self.out_w,
            self.out_h,
            self.out_c,
        ]
    }

    fn from_values(v: [i64; 11]) -> Self {
        Self {
            stride: v[0],
            in_w: v[1],
            in_h: v[2],
            in_c: v[3],
            pad_w: v[4],
            pad_h: v[5],
            k_w: v[6],
            k_h: v[7],
            out_w: v[8],
            out_h: v[9],
            out_c: v[10],
        }
    }

    /// Every field must be set: stride and padding `>= 0`, extents `> 0`.
    pub fn check_valid(&self) -> Result<()> {
        for (label, value) in LABELS.into_iter().zip(self.values()) {
            let field = label.trim_end_matches(':');
            let min = if matches!(field, "Stride" | "Padding_width" | "Padding_height") { 0 } else { 1 };
            ensure!(value >= min, NonValidFieldSnafu { field, value });
        }
        Ok(())
    }

    /// Containment check between two adjacent levels: `upper >= lower` on every extent.
    pub fn check_range(upper: &Self, lower: &Self) -> Result<()> {
        for &dim in <Dim as strum::VariantArray>::VARIANTS {
            let (upper, lower) = (upper.get(dim), lower.get(dim));
            ensure!(upper >= lower, RangeViolationSnafu { dim, upper, lower });
        }
        Ok(())
    }

    /// Read eleven label/value pairs from a token stream.
    ///
    /// Label text is not checked, only its presence, so dumps written with
    /// other label spellings still load.
    pub fn parse_tokens<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Self> {
        let mut values = [NON_VALID; 11];
        for (slot, expected) in values.iter_mut().zip(LABELS) {
            tokens.next().context(MalformedDumpSnafu { reason: format!("missing label {expected}") })?;
            let raw = tokens.next().context(MalformedDumpSnafu { reason: format!("missing value for {expected}") })?;
            let value: i64 = raw
                .parse()
                .ok()
                .context(MalformedDumpSnafu { reason: format!("{expected} {raw:?} is not an integer") })?;
            ensure!(value > NON_VALID, NonValidFieldSnafu { field: expected.trim_end_matches(':'), value });
            *slot = value;
        }
        Ok(Self::from_values(values))
    }
}

impl fmt::Display for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in LABELS.into_iter().zip(self.values()) {
            writeln!(f, "{label} {value}")?;
        }
        Ok(())
    }
}

impl FromStr for Variables {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let vars = Self::parse_tokens(&mut tokens)?;
        ensure!(tokens.next().is_none(), MalformedDumpSnafu { reason: "trailing tokens after variables" });
        Ok(vars)
    }
}

