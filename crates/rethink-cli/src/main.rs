mod args;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rethink_core::config::EvalConfig;
use rethink_core::dataset::load_jsonl;
use rethink_core::error::RethinkError;
use rethink_core::model::CompletionModel;
use rethink_core::prompt::{DEFAULT_TEMPLATE_PATH, PromptTemplate};
use rethink_core::record::write_results;
use rethink_eval::compare::{compare_dirs, write_inconsistencies};
use rethink_eval::parallel::ParallelRunner;
use rethink_eval::runner::{EvalOutcome, EvalRunner};
use rethink_llm::OpenAICompletionModel;

use crate::args::{Cli, Commands, EvalArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rethink_core=info,rethink_llm=info,rethink_eval=info,rethink_cli=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Eval { args } => run_eval(args, None).await?,
        Commands::EvalParallel { args, k } => run_eval(args, Some(k)).await?,
        Commands::Compare {
            run1_dir,
            run2_dir,
            output,
        } => run_compare(&run1_dir, &run2_dir, &output)?,
    }
    Ok(())
}

async fn run_eval(args: EvalArgs, workers: Option<usize>) -> Result<(), RethinkError> {
    if !args.prompt_type.is_joint() {
        return Err(RethinkError::Config(format!(
            "unsupported prompt type for evaluation: {}",
            args.prompt_type
        )));
    }
    // The joint dataset carries the candidate answers; --data_path is kept
    // for interface parity with the other evaluation modes.
    let reference = args.reference_ideas.as_deref().ok_or_else(|| {
        RethinkError::Config(format!(
            "--reference_ideas is required for prompt type {}",
            args.prompt_type
        ))
    })?;
    let items = load_jsonl(reference)?;
    let template = PromptTemplate::load(Path::new(DEFAULT_TEMPLATE_PATH))?;
    tracing::info!(
        model = %args.model,
        items = items.len(),
        workers = ?workers,
        "starting joint evaluation"
    );

    let config = EvalConfig::new(&args.model)
        .with_prompt_type(args.prompt_type)
        .with_temperature(args.temperature)
        .with_top_p(args.top_p)
        .with_max_tokens(args.max_tokens);

    let outcome = match workers {
        None => {
            let model: Arc<dyn CompletionModel> = Arc::new(build_model(&args, &config));
            EvalRunner::new(model, template, config).run(&items).await?
        }
        Some(k) => {
            let factory = {
                let args = args.clone();
                let config = config.clone();
                move |_worker: usize| {
                    Arc::new(build_model(&args, &config)) as Arc<dyn CompletionModel>
                }
            };
            ParallelRunner::new(factory, k)
                .run(items, &template, &config)
                .await?
        }
    };

    write_results(&args.save_path, &outcome.records, &outcome.summary())?;
    print_outcome(&outcome, &args);
    Ok(())
}

fn build_model(args: &EvalArgs, config: &EvalConfig) -> OpenAICompletionModel {
    OpenAICompletionModel::new(
        args.api_key.clone(),
        args.api_base.clone(),
        config.model.clone(),
    )
    .with_timeout(Duration::from_secs(config.request_timeout_secs))
}

fn print_outcome(outcome: &EvalOutcome, args: &EvalArgs) {
    println!(
        "Accuracy: {:.2}% ({}/{})",
        outcome.accuracy() * 100.0,
        outcome.correct,
        outcome.total
    );
    println!("Results saved to {}", args.save_path.display());
}

fn run_compare(run1_dir: &Path, run2_dir: &Path, output: &Path) -> Result<(), RethinkError> {
    let report = compare_dirs(run1_dir, run2_dir)?;

    if report.inconsistencies.is_empty() {
        println!("All answers in both runs are consistent.");
    } else {
        write_inconsistencies(output, &report.inconsistencies)?;
        println!(
            "Found {} inconsistencies; saved to {}",
            report.inconsistencies.len(),
            output.display()
        );
    }

    println!("\nStatistics:");
    print!("{}", report.stats);
    Ok(())
}
