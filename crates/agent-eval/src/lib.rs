//! Evaluation of question answering runs
//!
//! Two deterministic list metrics ([`metrics::custom_precision`] and
//! [`metrics::custom_recall`]) and two model-judged ones
//! ([`Judge::answer_correctness`] and [`Judge::answer_accuracy`]) are computed
//! per sample, then averaged per dataset.
//!
//! ```no_run
//! use agent_eval::{Evaluator, dataset::load_datasets};
//! use std::path::Path;
//!
//! # async fn run() -> agent_eval::Result<()> {
//! let datasets = load_datasets(
//!     Path::new("datasets/wikidata_category_dataset_first20.json"),
//!     Path::new("datasets/cove_simulation_first20.csv"),
//! )?;
//! let evaluator = Evaluator::lists_only();
//! for dataset in &datasets {
//!     println!("{}", evaluator.evaluate(dataset).await.to_table());
//! }
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod error;
pub mod judge;
pub mod literal;
pub mod metrics;
pub mod report;

use std::collections::BTreeMap;

use futures::StreamExt;
use tracing::{info, warn};

pub use error::{EvalError, Result};
pub use judge::Judge;
pub use metrics::Metric;
pub use report::{DatasetReport, SampleScores};

use dataset::{Dataset, Sample};
use metrics::{custom_precision, custom_recall};

/// Scores datasets with a fixed set of metrics
pub struct Evaluator {
    judge: Option<Judge>,
    concurrency: usize,
}

impl Evaluator {
    /// All four metrics, with samples judged `concurrency` at a time
    pub fn new(judge: Judge, concurrency: usize) -> Self {
        Self {
            judge: Some(judge),
            concurrency: concurrency.max(1),
        }
    }

    /// Only the metrics that need no model
    pub fn lists_only() -> Self {
        Self {
            judge: None,
            concurrency: 1,
        }
    }

    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.judge.is_some() || !m.needs_judge())
            .collect()
    }

    /// Score every sample of `dataset`
    ///
    /// A failed judge call scores NaN for that sample and metric.
    pub async fn evaluate(&self, dataset: &Dataset) -> DatasetReport {
        info!(dataset = %dataset.name, samples = dataset.samples.len(), "Evaluating");
        let rows = futures::stream::iter(&dataset.samples)
            .map(|sample| self.score(sample))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        DatasetReport::new(dataset.name.clone(), &self.metrics(), rows)
    }

    async fn score(&self, sample: &Sample) -> SampleScores {
        let mut scores = BTreeMap::from([
            (
                Metric::CustomPrecision.name(),
                custom_precision(&sample.response, &sample.reference),
            ),
            (
                Metric::CustomRecall.name(),
                custom_recall(&sample.response, &sample.reference),
            ),
        ]);

        if let Some(judge) = &self.judge {
            let correctness = judge
                .answer_correctness(&sample.user_input, &sample.response, &sample.reference)
                .await;
            let accuracy = judge
                .answer_accuracy(&sample.user_input, &sample.response, &sample.reference)
                .await;
            for (metric, result) in [
                (Metric::AnswerCorrectness, correctness),
                (Metric::AnswerAccuracy, accuracy),
            ] {
                let score = result.unwrap_or_else(|e| {
                    warn!(metric = metric.name(), question = %sample.user_input, error = %e, "Judge failed");
                    f64::NAN
                });
                scores.insert(metric.name(), score);
            }
        }

        SampleScores {
            user_input: sample.user_input.clone(),
            scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::{
        CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason,
        TokenUsage,
    };
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            name: "CoVeAnswer".to_string(),
            samples: vec![
                Sample {
                    user_input: "Rivers of Paris?".to_string(),
                    reference: "['Seine', 'Bièvre']".to_string(),
                    response: "['Seine']".to_string(),
                },
                Sample {
                    user_input: "Empty?".to_string(),
                    reference: "[]".to_string(),
                    response: "[]".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_list_metrics_only() {
        let evaluator = Evaluator::lists_only();
        assert_eq!(
            evaluator.metrics(),
            [Metric::CustomPrecision, Metric::CustomRecall]
        );

        let report = evaluator.evaluate(&dataset()).await;
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].scores["custom_precision"], 1.0);
        assert_eq!(report.rows[0].scores["custom_recall"], 0.5);
        assert_eq!(report.rows[1].scores["custom_recall"], 1.0);
        assert_eq!(report.mean(Metric::CustomRecall), Some(0.75));
        assert!(!report.rows[0].scores.contains_key("answer_accuracy"));
    }

    #[tokio::test]
    async fn test_judge_failures_score_nan() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .returning(|request: CompletionRequest| {
                if request.max_tokens > 10 {
                    Err(LLMError::RequestFailed("timeout".to_string()))
                } else {
                    Ok(CompletionResponse {
                        message: Message::assistant("4"),
                        stop_reason: StopReason::EndTurn,
                        usage: TokenUsage::default(),
                    })
                }
            });

        let evaluator = Evaluator::new(Judge::new(Arc::new(provider), ""), 2);
        assert_eq!(evaluator.metrics().len(), 4);

        let report = evaluator.evaluate(&dataset()).await;
        assert!(report.rows[0].scores["answer_correctness"].is_nan());
        assert_eq!(report.rows[0].scores["answer_accuracy"], 1.0);
        assert!(report.mean(Metric::AnswerCorrectness).unwrap().is_nan());
        assert_eq!(report.mean(Metric::AnswerAccuracy), Some(1.0));
    }
}
