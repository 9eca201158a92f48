use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Entry point for claim-funding writes on the registry.
pub const FUND_CLAIMS_TARGET: &str = "airdrop::registry::fund_claims";

/// Read-only status query, executed as a simulation.
pub const QUERY_STATUS_TARGET: &str = "airdrop::registry::claim_status";

/// Batch deletion of stale claim records.
pub const DELETE_CLAIMS_TARGET: &str = "airdrop::registry::delete_claims";

/// A state-mutating call: opaque `module::function` target plus packed
/// arguments built by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    pub target: String,
    pub payload: Vec<u8>,
}

/// A simulated, non-mutating call. Same shape as a write; the ledger
/// executes it without committing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOp {
    pub target: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub digest: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// Server-side filters for paginated record queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFilter {
    /// Claim records in the registry that are stale and safe to delete.
    StaleClaims { registry_id: String },
}

/// One page of record addresses plus the continuation cursor.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub addresses: Vec<String>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// The remote system of record. Writes are final once accepted; reads are
/// simulated executions that never mutate state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a write and wait for finality.
    async fn execute_write(&self, op: WriteOp) -> Result<Receipt>;

    /// Execute a read-only call and return the raw reply bytes.
    async fn execute_read(&self, op: ReadOp) -> Result<Vec<u8>>;

    /// Fetch up to `limit` matching records starting at `cursor`.
    async fn query_page(
        &self,
        filter: PageFilter,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<RecordPage>;
}

#[async_trait]
impl<L: LedgerClient + ?Sized> LedgerClient for &L {
    async fn execute_write(&self, op: WriteOp) -> Result<Receipt> {
        (**self).execute_write(op).await
    }

    async fn execute_read(&self, op: ReadOp) -> Result<Vec<u8>> {
        (**self).execute_read(op).await
    }

    async fn query_page(
        &self,
        filter: PageFilter,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<RecordPage> {
        (**self).query_page(filter, cursor, limit).await
    }
}
