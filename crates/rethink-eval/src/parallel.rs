use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use rethink_core::config::EvalConfig;
use rethink_core::dataset::DatasetItem;
use rethink_core::error::{Result, RethinkError};
use rethink_core::model::{CompletionModel, SamplingParams};
use rethink_core::prompt::PromptTemplate;

use crate::runner::{EvalOutcome, ensure_joint, evaluate_item};
use crate::worker_log::WorkerLog;

/// Split `items` into at most `k` contiguous batches of `ceil(n / k)` items.
///
/// The final batch absorbs the remainder and may be shorter; no batch is
/// empty. Zero workers or an empty input yield no batches.
pub fn split_batches<T>(items: Vec<T>, k: usize) -> Vec<Vec<T>> {
    if k == 0 || items.is_empty() {
        return Vec::new();
    }
    let batch_size = items.len().div_ceil(k);
    let mut batches = Vec::with_capacity(k.min(items.len()));
    let mut items = items.into_iter();
    loop {
        let batch: Vec<T> = items.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

/// Fans a dataset out over `workers` tokio tasks, one batch per task.
///
/// The factory builds a fresh client for each worker so no connection state
/// is shared. Results come back in submission order, so the merged records
/// match the input order regardless of which batch finishes first.
pub struct ParallelRunner<F>
where
    F: Fn(usize) -> Arc<dyn CompletionModel>,
{
    factory: F,
    workers: usize,
    log_dir: PathBuf,
}

impl<F> ParallelRunner<F>
where
    F: Fn(usize) -> Arc<dyn CompletionModel>,
{
    pub fn new(factory: F, workers: usize) -> Self {
        Self {
            factory,
            workers,
            log_dir: PathBuf::from("logs"),
        }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub async fn run(
        &self,
        items: Vec<DatasetItem>,
        template: &PromptTemplate,
        config: &EvalConfig,
    ) -> Result<EvalOutcome> {
        ensure_joint(config)?;
        if self.workers == 0 {
            return Err(RethinkError::Config(
                "worker count must be at least one".into(),
            ));
        }

        let total_items = items.len();
        let batches = split_batches(items, self.workers);
        info!(
            items = total_items,
            batches = batches.len(),
            "split dataset into batches"
        );

        let params = config.sampling_params();

        let mut handles = Vec::with_capacity(batches.len());
        for (id, batch) in batches.into_iter().enumerate() {
            let model = (self.factory)(id);
            let log = WorkerLog::create(&self.log_dir, model.model_name(), id)?;
            let template = template.clone();
            handles.push(tokio::spawn(worker(id, model, template, params, batch, log)));
        }

        // Await in submission order so merged records keep the input order.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    return Err(RethinkError::Other(format!("worker {id} panicked: {e}")));
                }
            }
        }

        let outcome = EvalOutcome::merge(outcomes);
        info!(
            correct = outcome.correct,
            total = outcome.total,
            accuracy = outcome.accuracy(),
            "parallel evaluation finished"
        );
        Ok(outcome)
    }
}

async fn worker(
    id: usize,
    model: Arc<dyn CompletionModel>,
    template: PromptTemplate,
    params: SamplingParams,
    batch: Vec<DatasetItem>,
    mut log: WorkerLog,
) -> EvalOutcome {
    log.info(&format!("Worker {id} starting: {} questions.", batch.len()));

    let mut outcome = EvalOutcome::default();
    let mut failed = 0usize;
    for item in &batch {
        match evaluate_item(model.as_ref(), &template, item, &params).await {
            Ok(mut record) => {
                record.slow_thinking_answer = item.predicted_answer1.clone();
                record.fast_thinking_answer = item.predicted_answer2.clone();
                log.info(&format!(
                    "Worker {id}: question_id {} predicted {}, ground truth {}.",
                    record.question_id,
                    record
                        .predicted_answer
                        .map_or_else(|| "none".to_string(), |c| c.to_string()),
                    record.ground_truth_answer
                ));
                outcome.push(record);
            }
            Err(e) => {
                failed += 1;
                log.error(&format!(
                    "Error in worker {id}, question_id {}: {e}",
                    item.question_id
                ));
                error!(worker = id, question_id = item.question_id, error = %e, "item failed, skipping");
            }
        }
    }

    log.info(&format!(
        "Worker {id} finished: {}/{} correct, {failed} failed.",
        outcome.correct, outcome.total
    ));
    outcome
}
