//! Simulated ledger for dry runs and tests. Holds the claim registry in
//! memory and honors the same call targets and payload layouts as the real
//! collaborator, so every engine path runs unchanged against it.

use crate::claims::ClaimStatus;
use crate::error::{ClaimError, Result};
use crate::ledger::client::{
    LedgerClient, PageFilter, ReadOp, Receipt, RecordPage, WriteOp, DELETE_CLAIMS_TARGET,
    FUND_CLAIMS_TARGET, QUERY_STATUS_TARGET,
};
use crate::ledger::codec;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct RegistryState {
    /// address -> (allotted amount, already claimed)
    claims: HashMap<String, (u64, bool)>,
    /// Stale record addresses, in registry order.
    stale: Vec<String>,
    funded_total: u64,
    writes: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<RegistryState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a claim record directly, bypassing the funding path.
    pub async fn seed_claim(&self, address: &str, amount: u64, claimed: bool) {
        let mut state = self.state.lock().await;
        state.claims.insert(address.to_string(), (amount, claimed));
    }

    /// Seed stale records for the cleanup path.
    pub async fn seed_stale(&self, addresses: impl IntoIterator<Item = String>) {
        let mut state = self.state.lock().await;
        state.stale.extend(addresses);
    }

    pub async fn claim_count(&self) -> usize {
        self.state.lock().await.claims.len()
    }

    pub async fn stale_count(&self) -> usize {
        self.state.lock().await.stale.len()
    }

    pub async fn funded_total(&self) -> u64 {
        self.state.lock().await.funded_total
    }

    fn receipt(state: &mut RegistryState) -> Receipt {
        state.writes += 1;
        Receipt {
            digest: format!("sim-write-{}", state.writes),
            success: true,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn execute_write(&self, op: WriteOp) -> Result<Receipt> {
        let mut state = self.state.lock().await;
        match op.target.as_str() {
            FUND_CLAIMS_TARGET => {
                let (_registry, funding, claims) = codec::decode_fund_claims(&op.payload)?;
                debug!("simulated funding write: {} claims, {} units", claims.len(), funding);
                for claim in claims {
                    state.claims.insert(claim.address, (claim.amount, false));
                }
                state.funded_total += funding;
                Ok(Self::receipt(&mut state))
            }
            DELETE_CLAIMS_TARGET => {
                let (_registry, addresses) = codec::decode_address_list(&op.payload)?;
                debug!("simulated delete write: {} records", addresses.len());
                state.stale.retain(|a| !addresses.contains(a));
                for address in &addresses {
                    state.claims.remove(address);
                }
                Ok(Self::receipt(&mut state))
            }
            other => Err(ClaimError::Ledger(format!("unknown write target: {}", other))),
        }
    }

    async fn execute_read(&self, op: ReadOp) -> Result<Vec<u8>> {
        if op.target != QUERY_STATUS_TARGET {
            return Err(ClaimError::Ledger(format!("unknown read target: {}", op.target)));
        }
        let (_registry, _coin_type, address) = codec::decode_status_query(&op.payload)?;
        let state = self.state.lock().await;
        let status = match state.claims.get(&address) {
            Some(&(amount, claimed)) => ClaimStatus { eligible: true, claimed, amount },
            None => ClaimStatus::default(),
        };
        Ok(codec::encode_claim_status(&status))
    }

    async fn query_page(
        &self,
        filter: PageFilter,
        _cursor: Option<String>,
        limit: usize,
    ) -> Result<RecordPage> {
        let PageFilter::StaleClaims { .. } = filter;
        let state = self.state.lock().await;
        // The remaining record set determines the page: deletions between
        // fetches advance the front of the collection, cursor or not.
        let page: Vec<String> = state.stale.iter().take(limit).cloned().collect();
        let has_next_page = state.stale.len() > page.len();
        let next_cursor = page.last().cloned();
        Ok(RecordPage { addresses: page, next_cursor, has_next_page })
    }
}
