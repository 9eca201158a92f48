pub mod batch;
pub mod cleanup;
pub mod eligibility;
pub mod fee;
pub mod submit;

use serde::{Deserialize, Serialize};

/// One funding entry: a normalized foreign address and its allotted amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub address: String,
    pub amount: u64,
}

/// On-ledger state for one foreign address, derived by a read call. An
/// address the ledger has never seen decodes to all-default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimStatus {
    pub eligible: bool,
    pub claimed: bool,
    pub amount: u64,
}

/// Proof-of-ownership record the caller already holds; this crate never
/// creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    pub network_address: String,
    pub owner: String,
}

/// A link merged with its resolved claim status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibleLink {
    pub link: LinkRecord,
    pub status: ClaimStatus,
}
