use tessel_ir::{CnnLoop, Error, Stationary, Structure};

use crate::config::SearchConfig;
use crate::cost::DramTraffic;
use crate::error::ScheduleError;
use crate::scheduler::Scheduler;
use crate::test::helpers::{full_fit_layer, pe_2x2, scheduler, square_layer, untiled};

#[test]
fn test_rejects_invalid_architecture() {
    let mut arch = pe_2x2(1024);
    arch.bandwidth = -1.0;
    assert!(matches!(Scheduler::new(arch, SearchConfig::default()), Err(ScheduleError::InvalidArchitecture { .. })));
}

#[test]
fn test_rejects_invalid_loop() {
    let result = scheduler(pe_2x2(1024), 1).search_best_loop_case(&CnnLoop::default());
    assert!(matches!(
        result,
        Err(ScheduleError::InvalidConfiguration { source: Error::NonValidField { .. } })
    ));
}

#[test]
fn test_full_fit_single_candidate() {
    let result = scheduler(pe_2x2(1 << 20), 4).search_best_loop_case(&untiled(&full_fit_layer())).unwrap();
    assert_eq!(result.candidates, 1);
    assert!(result.eliminated);
    assert_eq!(result.stationary, Stationary::Output);

    let varset = result.cnn_loop.variable_set();
    assert_eq!(varset.on(), varset.off());
    assert_eq!(DramTraffic::new(varset, result.stationary).total(), 128 + 144 + 32);
    assert!((result.edp - 304.0 * 304.0 / 144.0 / 1000.0).abs() < 1e-12);
}

#[test]
fn test_overflowing_elimination_still_refines() {
    // 512-byte buffers: no axis can be fully tiled, the seed itself fits.
    let cnn_loop = untiled(&square_layer(6, 4, 3, 4));
    let result = scheduler(pe_2x2(512), 2).search_best_loop_case(&cnn_loop).unwrap();
    assert!(!result.eliminated);
    assert_eq!(result.stationary, Stationary::Weight);
    assert_eq!(result.candidates, 36);
    result.cnn_loop.check_valid().unwrap();
    assert_eq!(result.cnn_loop.off_structure().axes(), Structure::preset(Stationary::Weight).axes());
}

#[test]
fn test_strict_memory_rejects_overflow() {
    let config = SearchConfig::builder().thread_count(2).strict_memory(true).build();
    let scheduler = Scheduler::new(pe_2x2(512), config).unwrap();
    let result = scheduler.search_best_loop_case(&untiled(&square_layer(6, 4, 3, 4)));
    assert!(matches!(result, Err(ScheduleError::MemoryOverflow)));
}

#[test]
fn test_no_feasible_tiling() {
    let result = scheduler(pe_2x2(4), 2).search_best_loop_case(&untiled(&full_fit_layer()));
    assert!(matches!(result, Err(ScheduleError::NoFeasibleTiling { .. })));
}

#[test]
fn test_worker_count_does_not_change_result() {
    let cnn_loop = untiled(&square_layer(6, 4, 3, 4));
    let single = scheduler(pe_2x2(512), 1).search_best_loop_case(&cnn_loop).unwrap();
    for threads in [2, 3, 8, 64] {
        let parallel = scheduler(pe_2x2(512), threads).search_best_loop_case(&cnn_loop).unwrap();
        assert_eq!(parallel, single);
    }
}

#[test]
fn test_output_map_is_wider_than_tall() {
    let cnn_loop = untiled(&square_layer(6, 4, 3, 4));
    let result = scheduler(pe_2x2(512), 2).search_best_loop_case(&cnn_loop).unwrap();
    let on = result.cnn_loop.variable_set().on();
    assert!(on.out_w >= on.out_h);
}

#[test]
fn test_fixed_on_chip_structure() {
    let structure = Scheduler::fix_on_loop_structure();
    assert_eq!(structure, Structure::preset(Stationary::Output));
    assert!(structure.is_stationary(Stationary::Output));
}

#[test]
fn test_buffers_sized_exactly_to_layer() {
    let cnn_loop = untiled(&square_layer(32, 3, 3, 16));
    let off = *cnn_loop.variable_set().off();
    let mut arch = pe_2x2(0);
    arch.input_mem_size = off.input_bytes();
    arch.weight_mem_size = off.weight_bytes();
    arch.output_mem_size = off.output_bytes();

    let result = scheduler(arch, 2).search_best_loop_case(&cnn_loop).unwrap();
    assert_eq!(result.candidates, 1);
    assert!(result.eliminated);
    assert_eq!(result.stationary, Stationary::Output);

    let varset = result.cnn_loop.variable_set();
    assert_eq!(varset.on(), varset.off());
    let traffic = DramTraffic::new(varset, result.stationary);
    assert_eq!(traffic.total(), off.input_bytes() + off.weight_bytes() + off.output_bytes());
}
