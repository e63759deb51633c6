pub mod compare;
pub mod parallel;
pub mod runner;
pub mod worker_log;

pub mod prelude {
    pub use crate::compare::{
        CompareReport, CompareStats, Inconsistency, RunRecord, compare_dirs,
        write_inconsistencies,
    };
    pub use crate::parallel::{ParallelRunner, split_batches};
    pub use crate::runner::{EvalOutcome, EvalRunner, JOINT_MAX_TOKENS};
    pub use crate::worker_log::WorkerLog;
}
