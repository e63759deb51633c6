use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the rethink library.
#[derive(Debug, Error)]
pub enum RethinkError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid record at {path}:{line}: {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read template {path}: {source}", path = .path.display())]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Question {question_id} is missing candidate answers")]
    MissingCandidates { question_id: u64 },

    #[error("Question {question_id} has {count} options, only {max} letters available")]
    TooManyOptions {
        question_id: u64,
        count: usize,
        max: usize,
    },

    #[error("Unsupported prompt type: {0}")]
    UnsupportedType(String),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Answer index {index} out of range for question {question_id} ({len} options)")]
    AnswerIndexOutOfRange {
        question_id: u64,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, RethinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::ApiRequest("timeout".into());
        assert_eq!(err.to_string(), "API request failed: timeout");
    }

    #[test]
    fn model_error_rate_limited_display() {
        let err = ModelError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "Rate limited: retry after Some(30)s");
    }

    #[test]
    fn dataset_error_display_carries_line() {
        let bad: serde_json::Error = serde_json::from_str::<u64>("x").unwrap_err();
        let err = DatasetError::Parse {
            path: PathBuf::from("data/items.jsonl"),
            line: 17,
            source: bad,
        };
        assert!(err.to_string().contains("data/items.jsonl:17"));
    }

    #[test]
    fn prompt_error_display() {
        let err = PromptError::MissingCandidates { question_id: 42 };
        assert_eq!(
            err.to_string(),
            "Question 42 is missing candidate answers"
        );
    }

    #[test]
    fn prompt_error_too_many_options_display() {
        let err = PromptError::TooManyOptions {
            question_id: 7,
            count: 20,
            max: 16,
        };
        assert!(err.to_string().contains("20 options"));
        assert!(err.to_string().contains("16 letters"));
    }

    #[test]
    fn compare_error_display() {
        let err = CompareError::AnswerIndexOutOfRange {
            question_id: 3,
            index: 9,
            len: 4,
        };
        assert!(err.to_string().contains("index 9"));
        assert!(err.to_string().contains("question 3"));
    }

    #[test]
    fn rethink_error_from_model_error() {
        let model_err = ModelError::Auth("bad key".into());
        let err: RethinkError = model_err.into();
        assert!(matches!(err, RethinkError::Model(ModelError::Auth(_))));
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn rethink_error_from_prompt_error() {
        let prompt_err = PromptError::UnsupportedType("freestyle".into());
        let err: RethinkError = prompt_err.into();
        assert!(matches!(
            err,
            RethinkError::Prompt(PromptError::UnsupportedType(_))
        ));
    }

    #[test]
    fn rethink_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RethinkError = io_err.into();
        assert!(matches!(err, RethinkError::Io(_)));
    }

    #[test]
    fn rethink_error_from_serde_error() {
        let bad: serde_json::Error = serde_json::from_str::<u64>("[").unwrap_err();
        let err: RethinkError = bad.into();
        assert!(matches!(err, RethinkError::Serialization(_)));
    }
}
