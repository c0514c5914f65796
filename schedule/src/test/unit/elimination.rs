use tessel_ir::{Axis, CnnLoop, Position, Stationary};

use crate::architecture::Architecture;
use crate::elimination::{Elimination, loop_elimination};
use crate::test::helpers::{full_fit_layer, pe_2x2, square_layer, unit_tiled};

const BIG: i64 = 1 << 20;

fn fully_tiled(cnn_loop: &CnnLoop) -> Vec<Axis> {
    [Axis::KernelMap, Axis::InputChannel, Axis::OutputMap, Axis::OutputChannel]
        .into_iter()
        .filter(|&axis| cnn_loop.variable_set().is_fully_tiled(axis))
        .collect()
}

fn buffers(input: i64, weight: i64, output: i64) -> Architecture {
    let mut arch = pe_2x2(BIG);
    arch.input_mem_size = input;
    arch.weight_mem_size = weight;
    arch.output_mem_size = output;
    arch
}

#[test]
fn test_whole_layer_fits() {
    let cnn_loop = unit_tiled(&full_fit_layer());
    let Elimination::Fits(eliminated) = loop_elimination(&cnn_loop, &pe_2x2(BIG)) else {
        panic!("whole layer should fit");
    };
    assert_eq!(eliminated.variable_set().on(), eliminated.variable_set().off());
    assert!(eliminated.off_structure().is_stationary(Stationary::Output));
    assert_eq!(eliminated.off_structure().axis_at(Position::InnerMost), Axis::KernelMap);
}

#[test]
fn test_first_fitting_triple_wins() {
    // 100 input bytes: the 128-byte input, and any tile of the full output map, overflow.
    let cnn_loop = unit_tiled(&full_fit_layer());
    let elimination = loop_elimination(&cnn_loop, &buffers(100, BIG, BIG));
    assert!(elimination.is_feasible());
    let eliminated = elimination.into_loop();
    assert_eq!(fully_tiled(&eliminated), [Axis::KernelMap, Axis::InputChannel, Axis::OutputChannel]);
    assert!(eliminated.off_structure().is_stationary(Stationary::Output));
}

#[test]
fn test_pair_when_no_triple_fits() {
    let cnn_loop = unit_tiled(&full_fit_layer());
    let elimination = loop_elimination(&cnn_loop, &buffers(100, 100, BIG));
    let Elimination::Fits(eliminated) = elimination else {
        panic!("channel pair should fit");
    };
    assert_eq!(fully_tiled(&eliminated), [Axis::InputChannel, Axis::OutputChannel]);
    // Pairs keep the incoming loop order.
    assert!(eliminated.off_structure().stationary().is_empty());
}

#[test]
fn test_pair_limited_by_output_buffer() {
    // 5x5x2 input, 3x3 kernel, 2 output channels: only the kernel map and
    // input channel pair keeps the output tile within 5 bytes.
    let cnn_loop = unit_tiled(&square_layer(5, 2, 3, 2));
    let elimination = loop_elimination(&cnn_loop, &buffers(BIG, 144, 10));
    assert!(elimination.is_feasible());
    assert_eq!(fully_tiled(elimination.cnn_loop()), [Axis::KernelMap, Axis::InputChannel]);
}

#[test]
fn test_overflow_returns_input_loop() {
    let cnn_loop = unit_tiled(&full_fit_layer());
    let elimination = loop_elimination(&cnn_loop, &pe_2x2(4));
    assert!(!elimination.is_feasible());
    assert!(matches!(&elimination, Elimination::Overflow(_)));
    assert_eq!(elimination.into_loop(), cnn_loop);
}

#[test]
fn test_parallel_level_untouched() {
    let cnn_loop = unit_tiled(&full_fit_layer());
    let eliminated = loop_elimination(&cnn_loop, &pe_2x2(BIG)).into_loop();
    assert_eq!(eliminated.variable_set().parallel(), cnn_loop.variable_set().parallel());
    eliminated.variable_set().check_valid().unwrap();
}
