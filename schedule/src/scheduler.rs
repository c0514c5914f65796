//! Stage driver.

use rayon::prelude::*;
use snafu::{OptionExt, ResultExt, ensure};
use tessel_ir::{CnnLoop, Stationary, Structure};
use tracing::{debug, info};

use crate::architecture::Architecture;
use crate::config::SearchConfig;
use crate::cost::edp;
use crate::elimination::loop_elimination;
use crate::error::{MemoryOverflowSnafu, NoFeasibleTilingSnafu, Result, ThreadPoolSnafu};
use crate::initialize::initialize_loop;
use crate::interchange::loop_interchange;
use crate::refine::{CandidateSpace, Progress, partition, reduce, search_range};

/// Result of [`Scheduler::search_best_loop_case`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub cnn_loop: CnnLoop,
    /// Dataflow chosen by loop interchange.
    pub stationary: Stationary,
    pub edp: f64,
    /// Size of the refinement space.
    pub candidates: u64,
    /// Whether loop elimination found a tiling within on-chip memory.
    pub eliminated: bool,
}

/// Runs the tiling search for one accelerator.
#[derive(Debug, Clone)]
pub struct Scheduler {
    arch: Architecture,
    config: SearchConfig,
}

impl Scheduler {
    pub fn new(arch: Architecture, config: SearchConfig) -> Result<Self> {
        arch.check_valid()?;
        debug!(
            pe_dims = ?arch.pe_dims,
            pe_structure = ?arch.pe_structure,
            input_mem = arch.input_mem_size,
            weight_mem = arch.weight_mem_size,
            output_mem = arch.output_mem_size,
            frequency = arch.frequency,
            bandwidth = arch.bandwidth,
            "scheduler architecture"
        );
        Ok(Self { arch, config })
    }

    pub fn architecture(&self) -> &Architecture {
        &self.arch
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Register-level loop order; not searched.
    pub fn fix_on_loop_structure() -> Structure {
        Structure::preset(Stationary::Output)
    }

    /// Search tiling and loop order for `cnn_loop`, whose levels start at the
    /// full layer.
    ///
    /// Runs seeding, elimination and interchange, then scores every
    /// refinement candidate on a dedicated pool and returns the lowest EDP.
    /// The result does not depend on the worker count.
    #[tracing::instrument(skip_all, fields(threads = self.config.thread_count))]
    pub fn search_best_loop_case(&self, cnn_loop: &CnnLoop) -> Result<SearchResult> {
        cnn_loop.check_valid()?;

        let seeded = initialize_loop(cnn_loop, &self.arch);
        let elimination = loop_elimination(&seeded, &self.arch);
        let eliminated = elimination.is_feasible();
        ensure!(eliminated || !self.config.strict_memory, MemoryOverflowSnafu);
        let (interchanged, stationary) = loop_interchange(&elimination.into_loop());

        let space = CandidateSpace::new(interchanged.variable_set());
        let total = space.total();
        let ranges = partition(total, self.config.thread_count);
        debug!(total, workers = ranges.len(), radices = ?space.radices(), "refining tiles");

        let pool = rayon::ThreadPoolBuilder::new().num_threads(ranges.len()).build().context(ThreadPoolSnafu)?;
        let progress = Progress::new(total, self.config.progress_interval);
        let bests: Vec<_> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| search_range(&interchanged, &space, range, &self.arch, stationary, &progress))
                .collect()
        });
        let best = reduce(bests).context(NoFeasibleTilingSnafu { candidates: total })?;

        let mut cnn_loop = best.cnn_loop;
        let mut score = best.edp;
        let on = *cnn_loop.variable_set().on();
        if on.out_w < on.out_h && cnn_loop.variable_set_mut().swap_tile_width_height() {
            score = edp(cnn_loop.variable_set(), &self.arch, stationary);
        }

        let on = cnn_loop.variable_set().on();
        info!(
            edp = score,
            ?stationary,
            tile.in_w = on.in_w,
            tile.in_h = on.in_h,
            tile.in_c = on.in_c,
            tile.k_w = on.k_w,
            tile.k_h = on.k_h,
            tile.out_w = on.out_w,
            tile.out_h = on.out_h,
            tile.out_c = on.out_c,
            "best tiling"
        );
        Ok(SearchResult { cnn_loop, stationary, edp: score, candidates: total, eliminated })
    }
}
