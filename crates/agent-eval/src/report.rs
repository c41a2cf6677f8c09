//! Score tables and JSON output

use std::collections::BTreeMap;

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

use crate::metrics::{Metric, nan_mean};

/// Scores of one sample; metrics that were not computed are absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleScores {
    pub user_input: String,
    pub scores: BTreeMap<&'static str, f64>,
}

/// Scores of one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub metrics: Vec<&'static str>,
    pub rows: Vec<SampleScores>,
    /// Mean per metric over the rows that produced a number
    pub means: BTreeMap<&'static str, f64>,
}

impl DatasetReport {
    pub fn new(dataset: impl Into<String>, metrics: &[Metric], rows: Vec<SampleScores>) -> Self {
        let names: Vec<_> = metrics.iter().map(|m| m.name()).collect();
        let means = names
            .iter()
            .map(|&name| {
                let mean = nan_mean(rows.iter().filter_map(|r| r.scores.get(name).copied()));
                (name, mean)
            })
            .collect();
        Self {
            dataset: dataset.into(),
            metrics: names,
            rows,
            means,
        }
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means.get(metric.name()).copied()
    }

    /// Per-sample table with a closing row of means
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec!["user_input".to_string()];
        header.extend(self.metrics.iter().map(ToString::to_string));
        table.set_header(header);

        for row in &self.rows {
            let mut cells = vec![truncate(&row.user_input, 60)];
            cells.extend(
                self.metrics
                    .iter()
                    .map(|name| format_score(row.scores.get(name).copied())),
            );
            table.add_row(cells);
        }

        let mut footer = vec!["mean".to_string()];
        footer.extend(
            self.metrics
                .iter()
                .map(|name| format_score(self.means.get(name).copied())),
        );
        table.add_row(footer);
        table
    }

    /// One line summary in the form `{'custom_precision': 0.5000, ...}`
    pub fn summary(&self) -> String {
        let parts: Vec<_> = self
            .metrics
            .iter()
            .map(|name| format!("'{name}': {}", format_score(self.means.get(name).copied())))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_nan() => "nan".to_string(),
        Some(s) => format!("{s:.4}"),
        None => "-".to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    agent_utils::preview(text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(question: &str, precision: f64, accuracy: f64) -> SampleScores {
        SampleScores {
            user_input: question.to_string(),
            scores: BTreeMap::from([
                (Metric::CustomPrecision.name(), precision),
                (Metric::AnswerAccuracy.name(), accuracy),
            ]),
        }
    }

    #[test]
    fn test_means_skip_nan() {
        let report = DatasetReport::new(
            "CoVeAnswer",
            &[Metric::CustomPrecision, Metric::AnswerAccuracy],
            vec![row("a", 1.0, f64::NAN), row("b", 0.5, 0.5)],
        );
        assert_eq!(report.mean(Metric::CustomPrecision), Some(0.75));
        assert_eq!(report.mean(Metric::AnswerAccuracy), Some(0.5));
        assert_eq!(report.mean(Metric::CustomRecall), None);
        assert_eq!(
            report.summary(),
            "{'custom_precision': 0.7500, 'answer_accuracy': 0.5000}"
        );
    }

    #[test]
    fn test_table_lists_rows_and_mean() {
        let report = DatasetReport::new(
            "BaseModelAnswer(GPT-3)",
            &[Metric::CustomPrecision, Metric::AnswerAccuracy],
            vec![row("Which rivers flow through Paris?", 0.5, f64::NAN)],
        );
        let rendered = report.to_table().to_string();
        assert!(rendered.contains("custom_precision"));
        assert!(rendered.contains("Which rivers flow through Paris?"));
        assert!(rendered.contains("0.5000"));
        assert!(rendered.contains("nan"));
        assert!(rendered.contains("mean"));
    }

    #[test]
    fn test_json_output() {
        let report = DatasetReport::new(
            "CoVeAnswer",
            &[Metric::CustomPrecision],
            vec![row("a", 1.0, f64::NAN)],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dataset"], "CoVeAnswer");
        assert_eq!(json["means"]["custom_precision"], 1.0);
        // NaN has no JSON form and is written as null
        assert!(json["rows"][0]["scores"]["answer_accuracy"].is_null());
    }
}
