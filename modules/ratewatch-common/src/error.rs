use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatewatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid rating grade: {0:?}")]
    InvalidGrade(String),

    #[error("Invalid outlook: {0:?}")]
    InvalidOutlook(String),
}
