//! Loading and joining evaluation data
//!
//! Ground truth is a JSON array of `{question, answer}` records. Model
//! outputs are a CSV with a `Question` column and one column per answering
//! system. Rows are inner-joined on the question text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{EvalError, Result};
use crate::literal::python_str;

/// Answer columns evaluated as separate datasets
pub const RESPONSE_COLUMNS: [&str; 2] = ["BaseModelAnswer(GPT-3)", "CoVeAnswer"];

const QUESTION_FIELD: &str = "question";
const ANSWER_FIELD: &str = "answer";
const QUESTION_COLUMN: &str = "Question";

/// One question with its reference and the answer under test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub user_input: String,
    pub reference: String,
    pub response: String,
}

/// Samples answered by one system
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub samples: Vec<Sample>,
}

/// A ground-truth record
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub user_input: String,
    pub reference: String,
}

/// A model output row, keyed by column name
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub user_input: String,
    pub columns: HashMap<String, String>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EvalError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Parse ground truth JSON; non-string answers are kept as their Python repr
pub fn parse_references(json: &str) -> Result<Vec<Reference>> {
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_str(json)?;
    records
        .iter()
        .map(|record| {
            let field = |name: &str| {
                record
                    .get(name)
                    .map(python_str)
                    .ok_or_else(|| EvalError::MissingColumn {
                        column: name.to_string(),
                        source_name: "ground truth".to_string(),
                    })
            };
            Ok(Reference {
                user_input: field(QUESTION_FIELD)?,
                reference: field(ANSWER_FIELD)?,
            })
        })
        .collect()
}

/// Parse the model output CSV
pub fn parse_answers(csv_text: &str) -> Result<Vec<AnswerRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();

    let question = headers
        .iter()
        .position(|h| h.trim() == QUESTION_COLUMN)
        .ok_or_else(|| EvalError::MissingColumn {
            column: QUESTION_COLUMN.to_string(),
            source_name: "model answers".to_string(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let columns = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.trim().to_string(), v.to_string()))
            .collect();
        rows.push(AnswerRow {
            user_input: record.get(question).unwrap_or_default().to_string(),
            columns,
        });
    }
    Ok(rows)
}

/// Inner join on the question, one dataset per response column
///
/// Rows keep the ground truth order. A question answered in several CSV
/// rows yields one sample per row.
pub fn join(references: &[Reference], answers: &[AnswerRow]) -> Result<Vec<Dataset>> {
    if let Some(row) = answers.first() {
        for column in RESPONSE_COLUMNS {
            if !row.columns.contains_key(column) {
                return Err(EvalError::MissingColumn {
                    column: column.to_string(),
                    source_name: "model answers".to_string(),
                });
            }
        }
    }

    let mut by_question: HashMap<&str, Vec<&AnswerRow>> = HashMap::new();
    for row in answers {
        by_question.entry(row.user_input.as_str()).or_default().push(row);
    }

    let datasets = RESPONSE_COLUMNS
        .iter()
        .map(|column| {
            let samples = references
                .iter()
                .flat_map(|reference| {
                    by_question
                        .get(reference.user_input.as_str())
                        .into_iter()
                        .flatten()
                        .map(move |row| Sample {
                            user_input: reference.user_input.clone(),
                            reference: reference.reference.clone(),
                            response: row.columns.get(*column).cloned().unwrap_or_default(),
                        })
                })
                .collect();
            Dataset {
                name: (*column).to_string(),
                samples,
            }
        })
        .collect();
    Ok(datasets)
}

/// Load both files and build the datasets
pub fn load_datasets(ground_truth: &Path, answers: &Path) -> Result<Vec<Dataset>> {
    let references = parse_references(&read(ground_truth)?)?;
    let rows = parse_answers(&read(answers)?)?;
    let datasets = join(&references, &rows)?;
    info!(
        references = references.len(),
        answers = rows.len(),
        joined = datasets.first().map_or(0, |d| d.samples.len()),
        "Datasets loaded"
    );
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND_TRUTH: &str = r#"[
        {"question": "Which rivers flow through Paris?", "answer": ["Seine", "Bièvre"]},
        {"question": "Capital of Italy?", "answer": "Rome"},
        {"question": "Not answered", "answer": []}
    ]"#;

    const ANSWERS: &str = "\
Question,BaseModelAnswer(GPT-3),CoVeAnswer,Extra
Capital of Italy?,Rome,\"['Rome']\",x
Which rivers flow through Paris?,\"['Seine']\",\"['Seine', 'Bièvre']\",y
Unknown question,a,b,z
";

    #[test]
    fn test_references() {
        let references = parse_references(GROUND_TRUTH).unwrap();
        assert_eq!(references.len(), 3);
        assert_eq!(references[0].reference, "['Seine', 'Bièvre']");
        assert_eq!(references[1].reference, "Rome");
        assert_eq!(references[2].reference, "[]");

        assert!(matches!(
            parse_references(r#"[{"question": "q"}]"#),
            Err(EvalError::MissingColumn { column, .. }) if column == "answer"
        ));
        assert!(parse_references("{}").is_err());
    }

    #[test]
    fn test_join() {
        let references = parse_references(GROUND_TRUTH).unwrap();
        let answers = parse_answers(ANSWERS).unwrap();
        let datasets = join(&references, &answers).unwrap();

        assert_eq!(datasets.len(), 2);
        let base = &datasets[0];
        assert_eq!(base.name, "BaseModelAnswer(GPT-3)");
        assert_eq!(base.samples.len(), 2);
        assert_eq!(base.samples[0].user_input, "Which rivers flow through Paris?");
        assert_eq!(base.samples[0].response, "['Seine']");
        assert_eq!(base.samples[1].response, "Rome");

        let cove = &datasets[1];
        assert_eq!(cove.name, "CoVeAnswer");
        assert_eq!(cove.samples[0].response, "['Seine', 'Bièvre']");
    }

    #[test]
    fn test_duplicate_questions_multiply() {
        let references = parse_references(GROUND_TRUTH).unwrap();
        let answers = parse_answers(
            "Question,BaseModelAnswer(GPT-3),CoVeAnswer\nCapital of Italy?,Rome,Rome\nCapital of Italy?,Milan,Rome\n",
        )
        .unwrap();
        let datasets = join(&references, &answers).unwrap();
        let responses: Vec<_> = datasets[0].samples.iter().map(|s| s.response.as_str()).collect();
        assert_eq!(responses, ["Rome", "Milan"]);
    }

    #[test]
    fn test_missing_columns() {
        assert!(matches!(
            parse_answers("question,CoVeAnswer\nq,a\n"),
            Err(EvalError::MissingColumn { column, .. }) if column == "Question"
        ));

        let references = parse_references(GROUND_TRUTH).unwrap();
        let answers = parse_answers("Question,CoVeAnswer\nq,a\n").unwrap();
        assert!(matches!(
            join(&references, &answers),
            Err(EvalError::MissingColumn { column, .. }) if column == "BaseModelAnswer(GPT-3)"
        ));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("truth.json");
        let csv = dir.path().join("answers.csv");
        fs::write(&json, GROUND_TRUTH).unwrap();
        fs::write(&csv, ANSWERS).unwrap();

        let datasets = load_datasets(&json, &csv).unwrap();
        assert_eq!(datasets[1].samples.len(), 2);

        let missing = load_datasets(&dir.path().join("nope.json"), &csv);
        assert!(matches!(missing, Err(EvalError::Read { .. })));
    }
}
