use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("contents not processed: exceeds threshold of {limit} files")]
    ThresholdExceeded { limit: usize },

    /// Cooperative early stop. Not a failure; never recorded as an error entry.
    #[error("run cancelled")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("report error: {0}")]
    Report(#[from] csv::Error),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
