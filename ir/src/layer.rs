//! Convolution layer parameters and extent conversions.
//!
//! Stride, kernel and padding are always passed explicitly.

use bon::bon;
use snafu::ensure;

use crate::error::{NonValidFieldSnafu, Result};
use crate::variables::Variables;

/// Output extent of a padded convolution over a full layer.
///
/// An input narrower than the kernel yields a single output.
pub fn output_len(input: i64, kernel: i64, stride: i64, pad: i64) -> i64 {
    if input < kernel { 1 } else { (input + 2 * pad - kernel) / stride.max(1) + 1 }
}

/// Input extent needed to produce `output` positions of a padded convolution.
pub fn input_len(output: i64, kernel: i64, stride: i64, pad: i64) -> i64 {
    if output < 1 { kernel } else { (output - 1) * stride + kernel - 2 * pad }
}

/// Input extent of a tile producing `output` positions.
///
/// Tiles are cut from the padded input, so padding does not appear here.
pub fn tile_input_len(output: i64, kernel: i64, stride: i64) -> i64 {
    if output < 1 { kernel } else { (output - 1) * stride + kernel }
}

/// Output positions produced by an input tile of extent `input`.
pub fn tile_output_len(input: i64, kernel: i64, stride: i64) -> i64 {
    if input < kernel { 1 } else { (input - kernel) / stride.max(1) + 1 }
}

/// Parameters of one convolution layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvLayer {
    pub in_w: i64,
    pub in_h: i64,
    pub in_c: i64,
    pub k_w: i64,
    pub k_h: i64,
    pub out_c: i64,
    pub stride: i64,
    pub pad_w: i64,
    pub pad_h: i64,
}

#[bon]
impl ConvLayer {
    /// Describe a layer with builder pattern. Stride defaults to 1, padding to 0.
    #[builder]
    pub fn builder(
        in_w: i64,
        in_h: i64,
        in_c: i64,
        k_w: i64,
        k_h: i64,
        out_c: i64,
        #[builder(default = 1)] stride: i64,
        #[builder(default = 0)] pad_w: i64,
        #[builder(default = 0)] pad_h: i64,
    ) -> Self {
        Self { in_w, in_h, in_c, k_w, k_h, out_c, stride, pad_w, pad_h }
    }

    pub fn out_w(&self) -> i64 {
        output_len(self.in_w, self.k_w, self.stride, self.pad_w)
    }

    pub fn out_h(&self) -> i64 {
        output_len(self.in_h, self.k_h, self.stride, self.pad_h)
    }

    /// Full-layer variables. Fails on unset fields or a zero stride.
    pub fn variables(&self) -> Result<Variables> {
        ensure!(self.stride > 0, NonValidFieldSnafu { field: "Stride", value: self.stride });
        let vars = Variables {
            stride: self.stride,
            pad_w: self.pad_w,
            pad_h: self.pad_h,
            in_w: self.in_w,
            in_h: self.in_h,
            in_c: self.in_c,
            k_w: self.k_w,
            k_h: self.k_h,
            out_w: self.out_w(),
            out_h: self.out_h(),
            out_c: self.out_c,
        };
        vars.check_valid()?;
        Ok(vars)
    }
}
