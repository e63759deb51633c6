//! Prompt construction for the joint-thinking evaluation.
//!
//! The prompt is raw text for a completion endpoint, not a chat message
//! list: the conversation markers are written literally so the model
//! continues an already-opened reasoning turn.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetItem;
use crate::error::{PromptError, Result, RethinkError};
use crate::extract::OPTION_LETTERS;

/// Where the chain-of-thought template lives relative to the working
/// directory.
pub const DEFAULT_TEMPLATE_PATH: &str = "cot_prompt_lib/initial_prompt.txt";

const SUBJECT_PLACEHOLDER: &str = "{$}";

const CONVERSATION_PREFIX: &str = "<｜begin▁of▁sentence｜><｜User｜>";

const ASSISTANT_THINK_OPEN: &str = "<｜Assistant｜>\n<think>\n";

/// Prompt styles accepted on the command line.
///
/// Only the joint style is evaluatable; the other two are recognized for
/// interface compatibility and rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptType {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "nothinking")]
    NoThinking,
    #[serde(rename = "JointThinking-thinking-middle-open")]
    JointThinkingMiddleOpen,
}

impl PromptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Direct => "direct",
            PromptType::NoThinking => "nothinking",
            PromptType::JointThinkingMiddleOpen => "JointThinking-thinking-middle-open",
        }
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, PromptType::JointThinkingMiddleOpen)
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = RethinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" => Ok(PromptType::Direct),
            "nothinking" => Ok(PromptType::NoThinking),
            "JointThinking-thinking-middle-open" => Ok(PromptType::JointThinkingMiddleOpen),
            other => Err(PromptError::UnsupportedType(other.to_string()).into()),
        }
    }
}

/// The chain-of-thought preamble, with a `{$}` placeholder for the subject
/// category.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    body: String,
}

impl PromptTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Read the template from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|source| PromptError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(body))
    }

    /// Substitute the subject into every placeholder occurrence.
    pub fn render(&self, subject: &str) -> String {
        self.body.replace(SUBJECT_PLACEHOLDER, subject)
    }
}

/// Build the full joint-thinking prompt for one item.
///
/// Layout: conversation prefix, rendered template, the question with its
/// lettered options, then a forced-open reasoning turn presenting the two
/// candidate answers as rival hypotheses to verify.
pub fn build_joint_prompt(template: &PromptTemplate, item: &DatasetItem) -> Result<String> {
    let slow = item
        .predicted_answer1
        .as_deref()
        .ok_or(PromptError::MissingCandidates {
            question_id: item.question_id,
        })?;
    let fast = item
        .predicted_answer2
        .as_deref()
        .ok_or(PromptError::MissingCandidates {
            question_id: item.question_id,
        })?;

    let mut prompt = String::from(CONVERSATION_PREFIX);
    prompt.push_str(&template.render(&item.category));
    prompt.push('\n');
    prompt.push_str("Question:\n");
    prompt.push_str(&item.question);
    prompt.push('\n');
    prompt.push_str("Options:\n");
    for (i, option) in item.options.iter().enumerate() {
        let letter = OPTION_LETTERS.get(i).ok_or(PromptError::TooManyOptions {
            question_id: item.question_id,
            count: item.options.len(),
            max: OPTION_LETTERS.len(),
        })?;
        prompt.push(*letter);
        prompt.push_str(". ");
        prompt.push_str(option);
        prompt.push('\n');
    }
    prompt.push_str(ASSISTANT_THINK_OPEN);
    prompt.push_str(&format!(
        "I think there are two candidate answers\n\n{slow}\n\nand\n\n{fast}\n\nfor this \
         question. One of them is correct or both are wrong. I need to first verify them. \
         If both are wrong, I need to rethink step by step and avoid making the same mistake \
         to select the correct letter choice."
    ));

    Ok(prompt)
}
