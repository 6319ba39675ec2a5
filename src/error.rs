use std::path::PathBuf;
use thiserror::Error;

use crate::domain::events::Stage;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing required file: {file} (looked in {})", .dir.display())]
    MissingInput { file: &'static str, dir: PathBuf },

    #[error("{file} has no '{column}' column in its header")]
    MissingColumn { file: String, column: &'static str },

    #[error("{stage} kept more than {limit} rows; raise build.max_rows_in_memory or stream this input")]
    RowLimitExceeded { stage: Stage, limit: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read TSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("{stage} stage failed: {message}")]
    Stage { stage: Stage, message: String },

    #[error("Extraction task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BuildError {
    pub fn stage(stage: Stage, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    /// True for failures detected before any extraction or output write.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::Config(_))
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crashed_task_is_not_blamed_on_a_stage() {
        let join_err = tokio::task::spawn_blocking(|| -> u32 { panic!("extractor crashed") })
            .await
            .unwrap_err();

        let err = BuildError::from(join_err);
        assert!(matches!(err, BuildError::Task(_)));
        assert!(err.to_string().starts_with("Extraction task did not complete"));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_missing_input_is_a_precondition() {
        let err = BuildError::MissingInput {
            file: "title.basics.tsv",
            dir: PathBuf::from("/data"),
        };
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Missing required file: title.basics.tsv (looked in /data)"
        );
    }
}
