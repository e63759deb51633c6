use std::sync::Arc;

use tracing::{debug, error, info};

use rethink_core::config::EvalConfig;
use rethink_core::dataset::DatasetItem;
use rethink_core::error::{Result, RethinkError};
use rethink_core::extract::extract_answer;
use rethink_core::model::{CompletionModel, SamplingParams};
use rethink_core::prompt::{PromptTemplate, build_joint_prompt};
use rethink_core::record::{EvalRecord, RunSummary};

/// Token budget for single-run joint evaluation. A joint trace re-derives
/// the answer from scratch when both candidates fail, so the budget sits far
/// above the configured batch default; a truncated trace loses its final
/// answer line.
pub const JOINT_MAX_TOKENS: u32 = 14000;

/// Accumulated outcome of an evaluation pass.
#[derive(Debug, Default)]
pub struct EvalOutcome {
    pub records: Vec<EvalRecord>,
    pub correct: usize,
    pub total: usize,
}

impl EvalOutcome {
    pub fn push(&mut self, record: EvalRecord) {
        if record.correct {
            self.correct += 1;
        }
        self.total += 1;
        self.records.push(record);
    }

    pub fn accuracy(&self) -> f64 {
        if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            accuracy: self.accuracy(),
            correct: self.correct,
            total: self.total,
        }
    }

    /// Fold per-batch outcomes into one, preserving batch order.
    pub fn merge(outcomes: impl IntoIterator<Item = EvalOutcome>) -> EvalOutcome {
        let mut merged = EvalOutcome::default();
        for outcome in outcomes {
            merged.correct += outcome.correct;
            merged.total += outcome.total;
            merged.records.extend(outcome.records);
        }
        merged
    }
}

pub(crate) fn ensure_joint(config: &EvalConfig) -> Result<()> {
    if !config.prompt_type.is_joint() {
        return Err(RethinkError::Config(format!(
            "unsupported prompt type for evaluation: {}",
            config.prompt_type
        )));
    }
    Ok(())
}

/// Evaluate one item: build the prompt, request a completion, extract the
/// letter, score it.
pub(crate) async fn evaluate_item(
    model: &dyn CompletionModel,
    template: &PromptTemplate,
    item: &DatasetItem,
    params: &SamplingParams,
) -> Result<EvalRecord> {
    let prompt = build_joint_prompt(template, item)?;
    let output = model.complete(&prompt, params).await?;
    let predicted = extract_answer(&output);
    let correct = predicted == Some(item.ground_truth_answer);

    Ok(EvalRecord {
        question_id: item.question_id,
        problem: item.question.clone(),
        model_output: output,
        options: item.options.clone(),
        predicted_answer: predicted,
        ground_truth_answer: item.ground_truth_answer,
        correct,
        slow_thinking_answer: None,
        fast_thinking_answer: None,
    })
}

/// Runs the joint-thinking evaluation one item at a time.
pub struct EvalRunner {
    model: Arc<dyn CompletionModel>,
    template: PromptTemplate,
    config: EvalConfig,
}

impl EvalRunner {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        template: PromptTemplate,
        config: EvalConfig,
    ) -> Self {
        Self {
            model,
            template,
            config,
        }
    }

    /// Evaluate every item in input order.
    ///
    /// A failing item is logged and dropped from both the correct count and
    /// the total, never aborting the pass. Only an unusable configuration is
    /// an error.
    pub async fn run(&self, items: &[DatasetItem]) -> Result<EvalOutcome> {
        ensure_joint(&self.config)?;

        let params = SamplingParams {
            temperature: self.config.temperature,
            max_tokens: JOINT_MAX_TOKENS,
        };

        let mut outcome = EvalOutcome::default();
        for item in items {
            match evaluate_item(self.model.as_ref(), &self.template, item, &params).await {
                Ok(record) => {
                    debug!(
                        question_id = record.question_id,
                        predicted = ?record.predicted_answer,
                        ground_truth = %record.ground_truth_answer,
                        correct = record.correct,
                        "item evaluated"
                    );
                    outcome.push(record);
                }
                Err(e) => {
                    error!(question_id = item.question_id, error = %e, "item failed, skipping");
                }
            }
        }

        info!(
            correct = outcome.correct,
            total = outcome.total,
            accuracy = outcome.accuracy(),
            "evaluation finished"
        );
        Ok(outcome)
    }
}
