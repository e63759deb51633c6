pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod model;
pub mod prompt;
pub mod record;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::EvalConfig;
    pub use crate::dataset::{DatasetItem, load_jsonl};
    pub use crate::error::{Result, RethinkError};
    pub use crate::extract::extract_answer;
    pub use crate::model::{CompletionModel, SamplingParams};
    pub use crate::prompt::{PromptTemplate, PromptType, build_joint_prompt};
    pub use crate::record::{EvalRecord, RunSummary, write_results};
}
