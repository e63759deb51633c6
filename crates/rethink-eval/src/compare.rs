//! Offline comparison of two finished evaluation runs.
//!
//! Both runs must have produced the same set of per-category `.json` files,
//! each holding an array of per-item results in dataset order. Items whose
//! predicted letters differ between the runs become inconsistency records,
//! shaped so the joint-thinking evaluator can consume them directly as its
//! reference dataset.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use rethink_core::error::{CompareError, Result};

pub const DEFAULT_INCONSISTENCY_FILE: &str = "inconsistent_results.jsonl";

/// One per-item result as persisted by an upstream run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub question_id: u64,
    pub question: String,
    pub category: String,
    pub options: Vec<String>,
    /// Predicted letter, absent when extraction failed.
    pub pred: Option<char>,
    /// Ground-truth letter.
    pub answer: char,
    /// Index of the predicted option within `options`.
    pub answer_index: usize,
}

/// An item the two runs disagreed on. Serializes to the same shape the
/// joint-thinking evaluator reads, so the comparator's output file feeds
/// straight into the next stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub question_id: u64,
    pub question: String,
    pub category: String,
    pub options: Vec<String>,
    pub predicted_answer1: String,
    pub predicted_answer2: String,
    pub ground_truth_answer: char,
}

/// Agreement and correctness counters over all compared pairs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareStats {
    pub both_correct: usize,
    pub both_wrong: usize,
    pub only_first_correct: usize,
    pub only_second_correct: usize,
    pub both_correct_equivalent: usize,
    pub both_wrong_equivalent: usize,
}

impl CompareStats {
    fn record(&mut self, first_correct: bool, second_correct: bool, same_prediction: bool) {
        match (first_correct, second_correct) {
            (true, true) => {
                self.both_correct += 1;
                // A single fixed ground-truth letter per item means two
                // correct predictions are necessarily the same letter.
                self.both_correct_equivalent += 1;
            }
            (false, false) => {
                self.both_wrong += 1;
                if same_prediction {
                    self.both_wrong_equivalent += 1;
                }
            }
            (true, false) => self.only_first_correct += 1,
            (false, true) => self.only_second_correct += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.both_correct + self.both_wrong + self.only_first_correct + self.only_second_correct
    }

    pub fn first_accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.both_correct + self.only_first_correct) as f64 / total as f64,
        }
    }

    pub fn second_accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.both_correct + self.only_second_correct) as f64 / total as f64,
        }
    }
}

impl fmt::Display for CompareStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Both correct: {}", self.both_correct)?;
        writeln!(f, "Both wrong: {}", self.both_wrong)?;
        writeln!(f, "Run 1 correct, run 2 wrong: {}", self.only_first_correct)?;
        writeln!(f, "Run 1 wrong, run 2 correct: {}", self.only_second_correct)?;
        writeln!(
            f,
            "Both correct and equivalent: {}",
            self.both_correct_equivalent
        )?;
        writeln!(
            f,
            "Both wrong and equivalent: {}",
            self.both_wrong_equivalent
        )?;
        let total = self.total();
        if total > 0 {
            writeln!(f, "\nTotal compared: {total}")?;
            writeln!(
                f,
                "Run 1 accuracy: {}/{} = {:.2}%",
                self.both_correct + self.only_first_correct,
                total,
                self.first_accuracy() * 100.0
            )?;
            writeln!(
                f,
                "Run 2 accuracy: {}/{} = {:.2}%",
                self.both_correct + self.only_second_correct,
                total,
                self.second_accuracy() * 100.0
            )?;
        }
        Ok(())
    }
}

/// Everything one comparison pass produces.
#[derive(Debug, Default)]
pub struct CompareReport {
    pub stats: CompareStats,
    pub inconsistencies: Vec<Inconsistency>,
}

/// Compare two result directories pairwise by file name.
///
/// Mismatched file-name sets abort the whole comparison with a diagnostic
/// and an empty report. Within a matched pair, a JSON parse failure or a
/// length mismatch skips only that file. An out-of-range predicted index is
/// a hard error: it means the result files do not describe their own
/// options, and every downstream number would be suspect.
pub fn compare_dirs(dir1: &Path, dir2: &Path) -> Result<CompareReport> {
    let names1 = json_file_names(dir1)?;
    let names2 = json_file_names(dir2)?;

    let mut report = CompareReport::default();
    if names1 != names2 {
        error!(
            dir1 = %dir1.display(),
            dir2 = %dir2.display(),
            files1 = names1.len(),
            files2 = names2.len(),
            "result directories do not hold the same json files"
        );
        debug!(?names1, ?names2, "mismatched file sets");
        return Ok(report);
    }

    for name in &names1 {
        let path1 = dir1.join(name);
        let path2 = dir2.join(name);

        let run1 = match parse_run(&path1)? {
            Some(records) => records,
            None => continue,
        };
        let run2 = match parse_run(&path2)? {
            Some(records) => records,
            None => continue,
        };

        if run1.len() != run2.len() {
            warn!(
                file = %name,
                len1 = run1.len(),
                len2 = run2.len(),
                "result lists differ in length, skipping file"
            );
            continue;
        }

        compare_pair(&run1, &run2, &mut report)?;
    }

    info!(
        compared = report.stats.total(),
        inconsistent = report.inconsistencies.len(),
        "comparison finished"
    );
    Ok(report)
}

fn json_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Read one run file; a parse failure is the non-fatal skip tier.
fn parse_run(path: &Path) -> Result<Option<Vec<RunRecord>>> {
    let raw = fs::read_to_string(path)?;
    match serde_json::from_str(&raw) {
        Ok(records) => Ok(Some(records)),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "unparsable result file, skipping pair");
            Ok(None)
        }
    }
}

fn compare_pair(run1: &[RunRecord], run2: &[RunRecord], report: &mut CompareReport) -> Result<()> {
    for (item1, item2) in run1.iter().zip(run2) {
        // Both texts resolve against the first run's option list; the runs
        // evaluated the same dataset, so the lists are interchangeable.
        let text1 = option_text(item1, item1.answer_index)?;
        let text2 = option_text(item1, item2.answer_index)?;

        let first_correct = item1.pred == Some(item1.answer);
        let second_correct = item2.pred == Some(item1.answer);
        report
            .stats
            .record(first_correct, second_correct, item1.pred == item2.pred);

        if item1.pred != item2.pred {
            report.inconsistencies.push(Inconsistency {
                question_id: item1.question_id,
                question: item1.question.clone(),
                category: item1.category.clone(),
                options: item1.options.clone(),
                predicted_answer1: text1,
                predicted_answer2: text2,
                ground_truth_answer: item1.answer,
            });
        }
    }
    Ok(())
}

fn option_text(item: &RunRecord, index: usize) -> Result<String> {
    item.options
        .get(index)
        .cloned()
        .ok_or_else(|| {
            CompareError::AnswerIndexOutOfRange {
                question_id: item.question_id,
                index,
                len: item.options.len(),
            }
            .into()
        })
}

/// Persist inconsistencies as JSON lines. Writes nothing at all when the
/// runs fully agree, so the absence of the file is itself a signal.
pub fn write_inconsistencies(path: &Path, inconsistencies: &[Inconsistency]) -> Result<()> {
    if inconsistencies.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for item in inconsistencies {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!(
        count = inconsistencies.len(),
        path = %path.display(),
        "inconsistencies written"
    );
    Ok(())
}
