use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("no valid maze after {attempts} attempts; lower the wall probability")]
    ExhaustedRetries { attempts: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
