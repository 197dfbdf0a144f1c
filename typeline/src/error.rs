use derive_more::From;
use thiserror::Error;

/// Errors that end a typing session
#[derive(Debug, From, Error)]
pub enum Error {
    #[error("The text to type is empty")]
    #[from(skip)]
    EmptyInput,

    #[error("Failed to write to the terminal: {0}")]
    Io(std::io::Error),

    #[error("Failed to read from the terminal after {attempts} attempts: {source}")]
    #[from(skip)]
    Read {
        attempts: usize,
        source: std::io::Error,
    },
}
