use thiserror::Error;

#[derive(Error, Debug)]
pub enum GolfBenchError {
    #[error("Invalid candidate set: {0}")]
    InvalidCandidateSet(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Sandbox error: {0}")]
    Sandbox(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GolfBenchError>;
