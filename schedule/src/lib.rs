//! Tiling and loop-order search for convolution layers on PE arrays.
//!
//! Given a layer seeded as a [`tessel_ir::CnnLoop`] and an [`Architecture`],
//! the [`Scheduler`] picks on-chip tile sizes, per-cycle unroll factors and an
//! off-chip loop order minimizing an energy-delay proxy.
//!
//! # Module Organization
//!
//! - [`architecture`] - PE array, buffers and throughput figures
//! - [`config`] - Search configuration with builder and environment fallbacks
//! - [`cost`] - Memory feasibility, DRAM traffic and the EDP objective
//! - [`unroll`] - PE-array distribution over mapped extents
//! - Search stages, run in order by [`scheduler`]:
//!   - [`initialize`] - Seed tiles from the PE-array shape
//!   - [`elimination`] - Fully tile axes while memory allows
//!   - [`interchange`] - Pick the dataflow from the dominant loop
//!   - [`refine`] - Parallel exhaustive search over free tile extents
//! - [`pipeline`] - Finalization, dumps and pre-scheduled loading
//! - [`math`] - GCD and prime factorization
//! - [`error`] - Error types and result handling

pub mod architecture;
pub mod config;
pub mod cost;
pub mod elimination;
pub mod error;
pub mod initialize;
pub mod interchange;
pub mod math;
pub mod pipeline;
pub mod refine;
pub mod scheduler;
pub mod unroll;


pub use architecture::{Architecture, PeDim, PeMapping};
pub use config::SearchConfig;
pub use cost::{DramTraffic, edp, is_memory_size_overflow};
pub use elimination::{Elimination, loop_elimination};
pub use error::{Result, ScheduleError};
pub use initialize::loop_initializing;
pub use interchange::loop_interchange;
pub use pipeline::{Compiled, compile, load_prescheduled, write_dumps};
pub use scheduler::{Scheduler, SearchResult};
pub use unroll::make_parl_loop_variables;
