use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ScheduleError {
    #[snafu(context(false), display("invalid loop configuration: {source}"))]
    InvalidConfiguration { source: tessel_ir::Error },

    #[snafu(display("invalid architecture: {reason}"))]
    InvalidArchitecture { reason: String },

    #[snafu(display("none of {candidates} refinement candidates fits on-chip memory"))]
    NoFeasibleTiling { candidates: u64 },

    #[snafu(display("no loop elimination fits on-chip memory"))]
    MemoryOverflow,

    #[snafu(display("failed to build search thread pool: {source}"))]
    ThreadPool { source: rayon::ThreadPoolBuildError },

    #[snafu(display("failed to access {}: {source}", path.display()))]
    Io { path: PathBuf, source: std::io::Error },
}
