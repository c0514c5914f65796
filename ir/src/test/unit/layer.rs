use test_case::test_case;

use crate::error::Error;
use crate::layer::{ConvLayer, input_len, output_len, tile_input_len, tile_output_len};

#[test_case(32, 3, 1, 1, 32; "same_padding")]
#[test_case(32, 3, 1, 0, 30; "valid_padding")]
#[test_case(224, 7, 2, 3, 112; "strided")]
#[test_case(2, 3, 1, 1, 1; "input_smaller_than_kernel")]
fn test_output_len(input: i64, kernel: i64, stride: i64, pad: i64, expected: i64) {
    assert_eq!(output_len(input, kernel, stride, pad), expected);
}

#[test]
fn test_input_len_inverts_output_len() {
    assert_eq!(input_len(30, 3, 1, 0), 32);
    assert_eq!(input_len(32, 3, 1, 1), 32);
    assert_eq!(input_len(0, 3, 1, 1), 3);
}

#[test]
fn test_tile_lengths() {
    assert_eq!(tile_input_len(8, 3, 1), 10);
    assert_eq!(tile_input_len(4, 3, 2), 9);
    assert_eq!(tile_input_len(1, 5, 2), 5);
    assert_eq!(tile_output_len(10, 3, 1), 8);
    assert_eq!(tile_output_len(9, 3, 2), 4);
    assert_eq!(tile_output_len(2, 3, 1), 1);
}

#[test]
fn test_builder_defaults() {
    let layer = ConvLayer::builder().in_w(32).in_h(32).in_c(3).k_w(3).k_h(3).out_c(16).build();
    assert_eq!(layer.stride, 1);
    assert_eq!((layer.pad_w, layer.pad_h), (0, 0));
    assert_eq!((layer.out_w(), layer.out_h()), (30, 30));
}

#[test]
fn test_variables_from_padded_layer() {
    let layer = ConvLayer::builder().in_w(32).in_h(32).in_c(3).k_w(3).k_h(3).out_c(16).pad_w(1).pad_h(1).build();
    let vars = layer.variables().unwrap();
    assert_eq!((vars.out_w, vars.out_h, vars.out_c), (32, 32, 16));
    assert_eq!((vars.in_w, vars.in_h, vars.in_c), (32, 32, 3));
}

#[test]
fn test_zero_stride_rejected() {
    let layer = ConvLayer::builder().in_w(8).in_h(8).in_c(1).k_w(1).k_h(1).out_c(1).stride(0).build();
    assert_eq!(layer.variables(), Err(Error::NonValidField { field: "Stride", value: 0 }));
}

#[test]
fn test_zero_channels_rejected() {
    let layer = ConvLayer::builder().in_w(8).in_h(8).in_c(0).k_w(1).k_h(1).out_c(1).build();
    assert!(matches!(layer.variables(), Err(Error::NonValidField { field: "Input_channel", .. })));
}
