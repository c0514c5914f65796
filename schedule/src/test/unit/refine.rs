use std::ops::RangeInclusive;

use tessel_ir::{CnnLoop, Stationary, VariableSet};
use test_case::test_case;

use crate::cost::{edp, is_memory_size_overflow};
use crate::refine::{Candidate, CandidateSpace, Progress, partition, reduce, search_range};
use crate::test::helpers::{full_fit_layer, pe_2x2, square_layer, untiled};
use crate::unroll::make_parl_loop_variables;

/// 6x6x4 input, 3x3 kernel, 4 output channels (4x4 output) seeded at a 2x1
/// kernel, 3x4 output, 4 input and 2 output channels.
fn seeded() -> CnnLoop {
    let mut cnn_loop = untiled(&square_layer(6, 4, 3, 4));
    let on = cnn_loop.variable_set_mut().on_mut();
    on.k_w = 2;
    on.k_h = 1;
    on.out_w = 3;
    on.out_h = 4;
    on.in_c = 4;
    on.out_c = 2;
    cnn_loop
}

fn space() -> CandidateSpace {
    CandidateSpace::new(seeded().variable_set())
}

#[test]
fn test_radices() {
    let space = space();
    assert_eq!(space.radices(), [2, 3, 2, 1, 1, 3]);
    assert_eq!(space.total(), 36);
}

#[test]
fn test_first_candidate_is_seed() {
    let on = *space().decode(1).on();
    assert_eq!((on.k_w, on.k_h, on.out_w, on.out_h, on.in_c, on.out_c), (2, 1, 3, 4, 4, 2));
    assert_eq!((on.in_w, on.in_h), (4, 4));
}

#[test]
fn test_last_candidate_is_full_layer() {
    let varset = space().decode(36);
    assert_eq!(varset.on(), varset.off());
}

#[test_case(2, (3, 1, 2); "kernel width is the fastest digit")]
#[test_case(3, (2, 2, 2); "kernel height next")]
#[test_case(13, (2, 1, 3); "output channel is the slowest digit")]
fn test_decode_digits(it: u64, expected: (i64, i64, i64)) {
    let on = *space().decode(it).on();
    assert_eq!((on.k_w, on.k_h, on.out_c), expected);
}

#[test]
fn test_input_tile_follows_candidate_kernel() {
    let on = *space().decode(2).on();
    assert_eq!(on.in_w, 5);
    let on = *space().decode(3).on();
    assert_eq!(on.in_h, 5);
}

#[test]
fn test_decode_keeps_parallel() {
    let seed = seeded();
    assert_eq!(space().decode(17).parallel(), seed.variable_set().parallel());
}

#[test_case(10, 3, vec![1..=3, 4..=6, 7..=10]; "remainder on last worker")]
#[test_case(9, 3, vec![1..=3, 4..=6, 7..=9]; "even split")]
#[test_case(2, 5, vec![1..=1, 2..=2]; "more workers than candidates")]
#[test_case(7, 1, vec![1..=7]; "single worker")]
#[test_case(1, 0, vec![1..=1]; "zero workers means one")]
fn test_partition(total: u64, workers: usize, expected: Vec<RangeInclusive<u64>>) {
    assert_eq!(partition(total, workers), expected);
}

#[test]
fn test_partition_covers_every_candidate() {
    let ranges = partition(1000, 7);
    let covered: Vec<u64> = ranges.into_iter().flatten().collect();
    assert_eq!(covered, (1..=1000).collect::<Vec<_>>());
}

/// Lowest EDP over `1..=total`, first on ties, computed candidate by candidate.
fn brute_force(space: &CandidateSpace, stationary: Stationary, mem: i64) -> Option<(u64, f64)> {
    let arch = pe_2x2(mem);
    let mut best: Option<(u64, f64)> = None;
    for it in 1..=space.total() {
        let mut varset: VariableSet = space.decode(it);
        if is_memory_size_overflow(&varset, &arch) {
            continue;
        }
        varset.set_parallel(make_parl_loop_variables(varset.on(), &arch));
        let score = edp(&varset, &arch, stationary);
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((it, score));
        }
    }
    best
}

#[test_case(1 << 20; "everything fits")]
#[test_case(512; "some candidates overflow")]
fn test_search_range_matches_brute_force(mem: i64) {
    let (seed, space) = (seeded(), space());
    let progress = Progress::new(space.total(), 4);
    let best = search_range(&seed, &space, 1..=space.total(), &pe_2x2(mem), Stationary::Weight, &progress).unwrap();
    let (it, score) = brute_force(&space, Stationary::Weight, mem).unwrap();
    assert_eq!(best.it, it);
    assert_eq!(best.edp, score);
    assert_eq!(best.cnn_loop.variable_set().on(), space.decode(it).on());
    best.cnn_loop.check_valid().unwrap();
    assert_eq!(progress.evaluated(), space.total());
}

#[test]
fn test_split_ranges_agree_with_whole_range() {
    let (seed, space) = (seeded(), space());
    let arch = pe_2x2(512);
    let progress = Progress::new(space.total(), 1);
    let whole = search_range(&seed, &space, 1..=space.total(), &arch, Stationary::Output, &progress);
    let split = reduce(
        partition(space.total(), 5)
            .into_iter()
            .map(|range| search_range(&seed, &space, range, &arch, Stationary::Output, &progress)),
    );
    assert_eq!(whole, split);
    assert_eq!(progress.evaluated(), 2 * space.total());
}

#[test]
fn test_nothing_fits() {
    let cnn_loop = untiled(&full_fit_layer());
    let space = CandidateSpace::new(cnn_loop.variable_set());
    let progress = Progress::new(space.total(), 4096);
    assert_eq!(search_range(&cnn_loop, &space, 1..=space.total(), &pe_2x2(4), Stationary::Output, &progress), None);
    assert_eq!(progress.evaluated(), 1);
}

#[test]
fn test_reduce_keeps_earlier_on_tie() {
    let candidate = |edp: f64, it: u64| Some(Candidate { cnn_loop: CnnLoop::default(), edp, it });
    assert_eq!(reduce([candidate(1.0, 5), candidate(1.0, 2)]).map(|c| c.it), Some(5));
    assert_eq!(reduce([None, candidate(2.0, 1), candidate(1.0, 9)]).map(|c| c.it), Some(9));
    assert_eq!(reduce([None, None]), None);
}
