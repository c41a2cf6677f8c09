//! LLM-judged answer metrics

use std::sync::{Arc, LazyLock};

use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_utils::preview;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{EvalError, Result};
use crate::metrics::{blend_correctness, factual_f1, token_similarity};

const CORRECTNESS_SYSTEM: &str = "You compare an answer against a ground truth for a question. \
Break both into short standalone factual statements. Then classify them:\n\
- TP: statements of the answer that are supported by the ground truth\n\
- FP: statements of the answer that are not supported by the ground truth\n\
- FN: statements of the ground truth that the answer does not contain\n\
Reply with JSON only, in the form {\"TP\": [...], \"FP\": [...], \"FN\": [...]}.";

const ACCURACY_SYSTEM: &str = "You rate how well one answer matches another for a question. \
Reply 4 if the first answer is fully contained in and equivalent to the second in all terms, \
topics, numbers, metrics, dates and units. Reply 2 if it is partially contained and almost \
equivalent. Reply 0 if it is not contained, is inaccurate or does not answer the question. \
Do not explain. Reply with a single number: 4, 2 or 0.";

static RATING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([024])\b").expect("invalid rating regex"));

/// Statement classification returned by the correctness judge
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Verdict {
    #[serde(rename = "TP", default)]
    pub tp: Vec<serde_json::Value>,
    #[serde(rename = "FP", default)]
    pub fp: Vec<serde_json::Value>,
    #[serde(rename = "FN", default)]
    pub fn_: Vec<serde_json::Value>,
}

impl Verdict {
    pub fn f1(&self) -> f64 {
        factual_f1(self.tp.len(), self.fp.len(), self.fn_.len())
    }
}

/// Parse a verdict from a reply that may wrap the JSON in prose or fences
pub fn parse_verdict(reply: &str) -> Result<Verdict> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&reply[start..=end]).map_err(EvalError::Json)
        }
        _ => Err(EvalError::Verdict(preview(reply, 200))),
    }
}

/// A 0/2/4 rating normalised to [0, 1], if the reply holds one
pub fn parse_rating(reply: &str) -> Option<f64> {
    RATING
        .captures(reply)
        .and_then(|c| c[1].parse::<u8>().ok())
        .map(|r| f64::from(r) / 4.0)
}

/// Mean of the parsed ratings, NaN when neither parsed
pub fn combine_ratings(first: Option<f64>, second: Option<f64>) -> f64 {
    match (first, second) {
        (Some(a), Some(b)) => (a + b) / 2.0,
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => f64::NAN,
    }
}

/// Scores answers with a model
#[derive(Clone)]
pub struct Judge {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl Judge {
    /// `model` may be empty to use the provider's default
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn ask(&self, system: &str, prompt: String, max_tokens: usize) -> Result<String> {
        let request = CompletionRequest::builder(self.model.clone())
            .system(system)
            .add_message(Message::user(prompt))
            .max_tokens(max_tokens)
            .temperature(0.0)
            .build();
        let response = self.provider.complete(request).await?;
        let text = response.text().to_string();
        debug!(reply = %preview(&text, 300), "Judge replied");
        Ok(text)
    }

    /// Factual F1 of the response against the reference, blended with
    /// lexical similarity
    #[instrument(skip_all)]
    pub async fn answer_correctness(
        &self,
        question: &str,
        response: &str,
        reference: &str,
    ) -> Result<f64> {
        let prompt = format!(
            "Question: {question}\nAnswer: {response}\nGround truth: {reference}\n"
        );
        let reply = self.ask(CORRECTNESS_SYSTEM, prompt, 1024).await?;
        let verdict = parse_verdict(&reply)?;
        Ok(blend_correctness(
            verdict.f1(),
            token_similarity(response, reference),
        ))
    }

    /// Agreement rating taken both ways round and averaged
    ///
    /// Returns NaN when neither rating can be read.
    #[instrument(skip_all)]
    pub async fn answer_accuracy(
        &self,
        question: &str,
        response: &str,
        reference: &str,
    ) -> Result<f64> {
        let forward = format!(
            "Question: {question}\nFirst answer (user answer): {response}\nSecond answer (reference answer): {reference}\nThe rating is:"
        );
        let backward = format!(
            "Question: {question}\nFirst answer (reference answer): {reference}\nSecond answer (user answer): {response}\nThe rating is:"
        );

        let first = parse_rating(&self.ask(ACCURACY_SYSTEM, forward, 10).await?);
        let second = parse_rating(&self.ask(ACCURACY_SYSTEM, backward, 10).await?);
        if first.is_none() || second.is_none() {
            warn!(?first, ?second, "Judge gave an unreadable rating");
        }
        Ok(combine_ratings(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::{CompletionResponse, StopReason, TokenUsage};
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_verdict() {
        let verdict = parse_verdict(
            "```json\n{\"TP\": [\"Paris is the capital\"], \"FP\": [], \"FN\": [\"It is in France\"]}\n```",
        )
        .unwrap();
        assert_eq!(verdict.tp.len(), 1);
        assert_eq!(verdict.fn_.len(), 1);
        assert!(close(verdict.f1(), 2.0 / 3.0));

        assert!(parse_verdict("{\"TP\": []}").unwrap().fp.is_empty());
        assert!(parse_verdict("no json here").is_err());
        assert!(parse_verdict("{broken}").is_err());
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4"), Some(1.0));
        assert_eq!(parse_rating("The rating is: 2"), Some(0.5));
        assert_eq!(parse_rating(" 0\n"), Some(0.0));
        assert_eq!(parse_rating("3"), None);
        assert_eq!(parse_rating("24"), None);
        assert_eq!(parse_rating("excellent"), None);
    }

    #[test]
    fn test_combine_ratings() {
        assert!(close(combine_ratings(Some(1.0), Some(0.5)), 0.75));
        assert!(close(combine_ratings(None, Some(0.5)), 0.5));
        assert!(combine_ratings(None, None).is_nan());
    }

    #[tokio::test]
    async fn test_answer_correctness() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .with(function(|r: &CompletionRequest| {
                r.system.as_deref() == Some(CORRECTNESS_SYSTEM) && r.temperature == Some(0.0)
            }))
            .times(1)
            .returning(|_| Ok(reply("{\"TP\": [\"a\"], \"FP\": [], \"FN\": []}")));

        let judge = Judge::new(Arc::new(provider), "");
        let score = judge
            .answer_correctness("Capital of France?", "Paris", "Paris")
            .await
            .unwrap();
        assert!(close(score, 1.0));
    }

    #[tokio::test]
    async fn test_answer_accuracy_asks_both_ways() {
        let mut provider = MockProvider::new();
        let mut replies = vec!["2", "4"].into_iter();
        provider
            .expect_complete()
            .times(2)
            .returning(move |_| Ok(reply(replies.next().unwrap_or("0"))));

        let judge = Judge::new(Arc::new(provider), "judge-model");
        let score = judge
            .answer_accuracy("q", "Lyon", "Paris")
            .await
            .unwrap();
        assert!(close(score, 0.75));
    }

    #[tokio::test]
    async fn test_answer_accuracy_unreadable() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok(reply("I cannot rate this")));

        let judge = Judge::new(Arc::new(provider), "");
        assert!(judge.answer_accuracy("q", "a", "b").await.unwrap().is_nan());
    }
}
