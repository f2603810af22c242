use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsolidateError {
    #[error("No active project. Please open a project.")]
    NoActiveProject,
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;
