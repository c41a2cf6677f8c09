//! Score question answering runs against ground truth
//!
//! ```bash
//! agent-eval \
//!   --ground-truth datasets/wikidata_category_dataset_first20.json \
//!   --answers datasets/cove_simulation_first20.csv \
//!   --output results.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use agent_eval::{DatasetReport, Evaluator, Judge, dataset::load_datasets};
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-eval")]
#[command(about = "Evaluate list answers and judge answer quality with a model", long_about = None)]
struct EvalArgs {
    /// Ground truth JSON: an array of {question, answer}
    #[arg(long, default_value = "./datasets/wikidata_category_dataset_first20.json")]
    ground_truth: PathBuf,

    /// Model answers CSV with a Question column
    #[arg(long, default_value = "./datasets/cove_simulation_first20.csv")]
    answers: PathBuf,

    /// Judge model; the provider default when unset
    #[arg(long, env = "EVAL_MODEL")]
    model: Option<String>,

    /// Samples judged at the same time
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Compute only the list metrics, without a judge model
    #[arg(long)]
    skip_judge: bool,

    /// Also write the reports as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl EvalArgs {
    fn evaluator(&self) -> anyhow::Result<Evaluator> {
        if self.skip_judge {
            return Ok(Evaluator::lists_only());
        }
        let provider = OpenAIProvider::with_config(OpenAIConfig::from_env()?)
            .context("failed to create the judge model client")?;
        let judge = Judge::new(Arc::new(provider), self.model.clone().unwrap_or_default());
        Ok(Evaluator::new(judge, self.concurrency))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_env();
    agent_utils::init_tracing();

    let args = EvalArgs::parse();
    let datasets = load_datasets(&args.ground_truth, &args.answers)
        .context("failed to load the evaluation data")?;
    let evaluator = args.evaluator()?;

    let mut reports: Vec<DatasetReport> = Vec::with_capacity(datasets.len());
    for dataset in &datasets {
        println!("\n--- {} ({} samples) ---", dataset.name, dataset.samples.len());
        let report = evaluator.evaluate(dataset).await;
        println!("{}", report.to_table());
        println!("{}", report.summary());
        reports.push(report);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Results written");
    }

    Ok(())
}
