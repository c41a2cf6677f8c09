//! Deterministic metrics
//!
//! `custom_precision` and `custom_recall` compare list answers as sets. Their
//! empty-input rules differ on purpose: precision looks at an empty
//! response, recall at an empty reference.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::literal::parse_set;

/// Metrics reported per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CustomPrecision,
    CustomRecall,
    AnswerCorrectness,
    AnswerAccuracy,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::CustomPrecision,
        Metric::CustomRecall,
        Metric::AnswerCorrectness,
        Metric::AnswerAccuracy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::CustomPrecision => "custom_precision",
            Metric::CustomRecall => "custom_recall",
            Metric::AnswerCorrectness => "answer_correctness",
            Metric::AnswerAccuracy => "answer_accuracy",
        }
    }

    /// Whether computing the metric needs a judge model
    pub fn needs_judge(self) -> bool {
        matches!(self, Metric::AnswerCorrectness | Metric::AnswerAccuracy)
    }
}

fn parse_pair(response: &str, reference: &str) -> Option<(HashSet<String>, HashSet<String>)> {
    match (parse_set(response), parse_set(reference)) {
        (Ok(response), Ok(reference)) => Some((response, reference)),
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "Response or reference is not a list literal");
            None
        }
    }
}

/// Share of response items that appear in the reference
///
/// Unparseable input scores 0. An empty response scores 1 only when the
/// reference is empty too.
pub fn custom_precision(response: &str, reference: &str) -> f64 {
    let Some((response, reference)) = parse_pair(response, reference) else {
        return 0.0;
    };
    if response.is_empty() {
        return if reference.is_empty() { 1.0 } else { 0.0 };
    }
    response.intersection(&reference).count() as f64 / response.len() as f64
}

/// Share of reference items that appear in the response
///
/// Unparseable input scores 0. An empty reference scores 1 only when the
/// response is empty too.
pub fn custom_recall(response: &str, reference: &str) -> f64 {
    let Some((response, reference)) = parse_pair(response, reference) else {
        return 0.0;
    };
    if reference.is_empty() {
        return if response.is_empty() { 1.0 } else { 0.0 };
    }
    response.intersection(&reference).count() as f64 / reference.len() as f64
}

/// F1 over statement verdicts
pub fn factual_f1(tp: usize, fp: usize, fn_: usize) -> f64 {
    let tp = tp as f64;
    let precision = if tp + fp as f64 > 0.0 {
        tp / (tp + fp as f64)
    } else {
        0.0
    };
    let recall = if tp + fn_ as f64 > 0.0 {
        tp / (tp + fn_ as f64)
    } else {
        0.0
    };
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Words of `text`, lowercased; CJK ideographs count one each
fn tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in text.chars() {
        if is_ideograph(c) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
        } else if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn is_ideograph(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}')
}

/// Token overlap F1 between two texts, in [0, 1]
///
/// Two texts without tokens are identical.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut remaining = b.clone();
    let mut common = 0usize;
    for token in &a {
        if let Some(pos) = remaining.iter().position(|t| t == token) {
            remaining.swap_remove(pos);
            common += 1;
        }
    }
    if common == 0 {
        return 0.0;
    }
    let precision = common as f64 / a.len() as f64;
    let recall = common as f64 / b.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Weight of the factual F1 in `answer_correctness`
pub const FACTUAL_WEIGHT: f64 = 0.75;

/// Blend of factual F1 and lexical similarity
pub fn blend_correctness(factual: f64, similarity: f64) -> f64 {
    FACTUAL_WEIGHT * factual + (1.0 - FACTUAL_WEIGHT) * similarity
}

/// Mean of the finite values, NaN when there are none
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_precision() {
        assert!(close(custom_precision("[]", "[]"), 1.0));
        assert!(close(custom_precision("[]", "['A']"), 0.0));
        assert!(close(custom_precision("['A','B']", "['A']"), 0.5));
        assert!(close(custom_precision("['A']", "['A','B']"), 1.0));
        // Empty reference with a non-empty response is plain arithmetic
        assert!(close(custom_precision("['A']", "[]"), 0.0));
    }

    #[test]
    fn test_recall() {
        assert!(close(custom_recall("['A']", "['A','B']"), 0.5));
        assert!(close(custom_recall("[]", "[]"), 1.0));
        assert!(close(custom_recall("['A']", "[]"), 0.0));
        // Empty response with a non-empty reference is plain arithmetic
        assert!(close(custom_recall("[]", "['A']"), 0.0));
    }

    #[test]
    fn test_malformed_scores_zero() {
        assert!(close(custom_recall("A, B", "['A']"), 0.0));
        assert!(close(custom_precision("['A']", "not a list"), 0.0));
        assert!(close(custom_precision("[]", "oops"), 0.0));
    }

    #[test]
    fn test_duplicates_count_once() {
        assert!(close(custom_precision("['A', 'A', 'C']", "['A', 'B']"), 0.5));
    }

    #[test]
    fn test_factual_f1() {
        assert!(close(factual_f1(2, 0, 0), 1.0));
        assert!(close(factual_f1(0, 0, 0), 0.0));
        assert!(close(factual_f1(1, 1, 1), 0.5));
        assert!(close(factual_f1(0, 3, 2), 0.0));
    }

    #[test]
    fn test_token_similarity() {
        assert!(close(token_similarity("Paris, France", "paris france"), 1.0));
        assert!(close(token_similarity("", ""), 1.0));
        assert!(close(token_similarity("a b", ""), 0.0));
        assert!(close(token_similarity("a b c d", "a b"), 2.0 / 3.0));
        assert!(close(token_similarity("北京市", "北京"), 0.8));
    }

    #[test]
    fn test_blend_and_mean() {
        assert!(close(blend_correctness(1.0, 0.0), 0.75));
        assert!(close(blend_correctness(0.5, 1.0), 0.625));
        assert!(close(nan_mean([1.0, f64::NAN, 0.0]), 0.5));
        assert!(nan_mean([f64::NAN]).is_nan());
        assert!(nan_mean(Vec::new()).is_nan());
    }
}
