use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// One multiple-choice question, one JSON object per dataset line.
///
/// The candidate-answer fields are present on joint-thinking datasets, where
/// each item carries the full answer texts produced by two earlier runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetItem {
    pub question_id: u64,
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    pub ground_truth_answer: char,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_answer1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_answer2: Option<String>,
}

/// Load a JSON-lines dataset. Every line must parse; a bad line fails the
/// load with its 1-based line number.
pub fn load_jsonl(path: &Path) -> Result<Vec<DatasetItem>> {
    let file = File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut items = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let item = serde_json::from_str(&line).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        items.push(item);
    }

    tracing::debug!(count = items.len(), path = %path.display(), "dataset loaded");
    Ok(items)
}
