use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rethink_core::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
use rethink_core::prompt::PromptType;
use rethink_eval::compare::DEFAULT_INCONSISTENCY_FILE;
use rethink_llm::openai::{DEFAULT_API_BASE, DEFAULT_API_KEY};

#[derive(Parser, Debug)]
#[command(
    name = "rethink",
    version,
    about = "Joint-thinking evaluation harness for multiple-choice benchmarks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a dataset against one completion endpoint, item by item
    Eval {
        #[command(flatten)]
        args: EvalArgs,
    },
    /// Evaluate with k workers over contiguous dataset batches
    EvalParallel {
        #[command(flatten)]
        args: EvalArgs,

        /// Worker count
        #[arg(long, default_value_t = 4)]
        k: usize,
    },
    /// Compare two finished runs and report where they disagree
    Compare {
        /// Directory of per-category result files from the first run
        #[arg(value_name = "RUN1_DIR")]
        run1_dir: PathBuf,

        /// Directory of per-category result files from the second run
        #[arg(value_name = "RUN2_DIR")]
        run2_dir: PathBuf,

        /// Where to write the inconsistency records
        #[arg(long, default_value = DEFAULT_INCONSISTENCY_FILE)]
        output: PathBuf,
    },
}

/// Flags shared by both evaluation modes. Long names keep the underscore
/// style of the documented interface.
#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Model identifier as served by the endpoint
    #[arg(long)]
    pub model: String,

    /// Output JSONL path for per-item records plus the summary line
    #[arg(long = "save_path")]
    pub save_path: PathBuf,

    /// Benchmark dataset path
    #[arg(long = "data_path")]
    pub data_path: PathBuf,

    #[arg(long = "api_key", default_value = DEFAULT_API_KEY)]
    pub api_key: String,

    #[arg(long = "api_base", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Prompting strategy
    #[arg(long = "prompt_type", default_value = "direct")]
    pub prompt_type: PromptType,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    #[arg(long = "top_p", default_value_t = DEFAULT_TOP_P)]
    pub top_p: f64,

    #[arg(long = "max_tokens", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Dataset of candidate answers; required for the joint prompt type
    #[arg(long = "reference_ideas")]
    pub reference_ideas: Option<PathBuf>,
}
