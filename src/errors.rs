use thiserror::Error;

/// Errors from feeding an event file through the book.
///
/// The book itself never fails; only reading and ordering the input can.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed event: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: timestamp {ts} is earlier than previous event at {prev}")]
    OutOfOrder { line: usize, prev: u64, ts: u64 },
}

pub type ReplayResult<T> = Result<T, ReplayError>;
