use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("invalid {network} address: {address}")]
    InvalidAddress { network: String, address: String },

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("address/amount length mismatch: {addrs} addresses vs {amounts} amounts")]
    LengthMismatch { addrs: usize, amounts: usize },

    #[error("duplicate address in submission: {0}")]
    DuplicateAddress(String),

    #[error("submission of {count} claims exceeds the cap of {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("chunk {chunk_index} failed after {prior_successes} committed chunks: {source}")]
    ChunkSubmissionFailed {
        chunk_index: usize,
        prior_successes: usize,
        #[source]
        source: Box<ClaimError>,
    },

    #[error("eligibility query failed: {source}")]
    EligibilityQueryFailed {
        #[source]
        source: Box<ClaimError>,
    },

    #[error("cleanup failed after deleting {cleaned_count} records: {source}")]
    CleanupPageFailed {
        cleaned_count: usize,
        #[source]
        source: Box<ClaimError>,
    },

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("write rejected by ledger: {0}")]
    WriteRejected(String),

    #[error("failed to decode ledger reply: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClaimError>;
