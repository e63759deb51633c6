use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One evaluated item, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    pub question_id: u64,
    pub problem: String,
    pub model_output: String,
    pub options: Vec<String>,
    /// `null` when extraction found no letter.
    pub predicted_answer: Option<char>,
    pub ground_truth_answer: char,
    pub correct: bool,

    /// Candidate answers carried through by the batch path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_thinking_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_thinking_answer: Option<String>,
}

/// Aggregate line appended after the per-item records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a RunSummary,
}

/// Write per-item records plus the trailing summary object as JSON lines,
/// creating parent directories as needed.
pub fn write_results(path: &Path, records: &[EvalRecord], summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    serde_json::to_writer(&mut writer, &SummaryLine { summary })?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!(records = records.len(), path = %path.display(), "results written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    fn sample_records(n: usize) -> Vec<EvalRecord> {
        (0..n)
            .map(|i| EvalRecord {
                question_id: i as u64,
                problem: format!("problem {i}"),
                model_output: "the answer is A".into(),
                options: vec!["yes".into(), "no".into()],
                predicted_answer: Some('A'),
                ground_truth_answer: if i % 2 == 0 { 'A' } else { 'B' },
                correct: i % 2 == 0,
                slow_thinking_answer: None,
                fast_thinking_answer: None,
            })
            .collect()
    }

    #[test]
    fn record_serializes_null_prediction() {
        let mut record = sample_records(1).remove(0);
        record.predicted_answer = None;
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"predicted_answer\":null"));
    }

    #[test]
    fn record_omits_absent_candidate_fields() {
        let record = sample_records(1).remove(0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("slow_thinking_answer"));
        assert!(!json.contains("fast_thinking_answer"));
    }

    #[test]
    fn record_keeps_candidate_fields_when_present() {
        let mut record = sample_records(1).remove(0);
        record.slow_thinking_answer = Some("slow text".into());
        record.fast_thinking_answer = Some("fast text".into());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"slow_thinking_answer\":\"slow text\""));
        assert!(json.contains("\"fast_thinking_answer\":\"fast text\""));
    }

    #[test]
    fn write_results_lines_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let records = sample_records(3);
        let summary = RunSummary {
            accuracy: 2.0 / 3.0,
            correct: 2,
            total: 3,
        };

        write_results(&path, &records, &summary).unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 4);

        let first: EvalRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.question_id, 0);

        let last: serde_json::Value = serde_json::from_str(&lines[3]).unwrap();
        assert_eq!(last["summary"]["correct"], 2);
        assert_eq!(last["summary"]["total"], 3);
        let accuracy = last["summary"]["accuracy"].as_f64().unwrap();
        assert!((accuracy - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn write_results_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("out.jsonl");
        let summary = RunSummary {
            accuracy: 0.0,
            correct: 0,
            total: 0,
        };
        write_results(&path, &[], &summary).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_results_empty_still_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        let summary = RunSummary {
            accuracy: 0.0,
            correct: 0,
            total: 0,
        };
        write_results(&path, &[], &summary).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"summary\""));
    }
}
