use crate::address::{self, Network};
use crate::claims::batch::{self, ProgressEvent};
use crate::claims::{ClaimStatus, EligibleLink, LinkRecord};
use crate::error::{ClaimError, Result};
use crate::ledger::client::{LedgerClient, ReadOp, QUERY_STATUS_TARGET};
use crate::ledger::codec;
use tracing::{debug, info};

/// Resolves claim status for foreign addresses via size-bounded parallel
/// read calls: sequential batches, concurrent reads within a batch,
/// positional results.
pub struct EligibilityResolver<L: LedgerClient> {
    ledger: L,
    registry_id: String,
    coin_type: String,
    network: Network,
    read_batch_size: usize,
}

impl<L: LedgerClient> EligibilityResolver<L> {
    pub fn new(
        ledger: L,
        registry_id: String,
        coin_type: String,
        network: Network,
        read_batch_size: usize,
    ) -> Self {
        Self { ledger, registry_id, coin_type, network, read_batch_size }
    }

    /// Resolve status for every address. `result[i]` always describes
    /// `addrs[i]`, whatever order the underlying reads finish in. The input
    /// need not be deduplicated. Any batch failure fails the whole call.
    pub async fn resolve_statuses(
        &self,
        addrs: &[String],
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<Vec<ClaimStatus>> {
        let normalized = addrs
            .iter()
            .map(|raw| address::normalize(self.network, raw))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "resolving eligibility for {} addresses in read batches of {}",
            normalized.len(),
            self.read_batch_size
        );

        let statuses = batch::run_serial_batches(
            &normalized,
            self.read_batch_size,
            |addr, _| {
                let ledger = &self.ledger;
                let registry_id = &self.registry_id;
                let coin_type = &self.coin_type;
                async move {
                    let payload = codec::encode_status_query(registry_id, coin_type, &addr)?;
                    let reply = ledger
                        .execute_read(ReadOp { target: QUERY_STATUS_TARGET.to_string(), payload })
                        .await?;
                    codec::decode_claim_status(&reply)
                }
            },
            |current, total| on_progress(ProgressEvent::ReadBatch { current, total }),
        )
        .await
        .map_err(|cause| ClaimError::EligibilityQueryFailed { source: Box::new(cause) })?;

        debug!(
            "resolved {} statuses ({} eligible)",
            statuses.len(),
            statuses.iter().filter(|s| s.eligible).count()
        );
        Ok(statuses)
    }

    /// Resolve the caller's ownership links: statuses merged positionally,
    /// filtered to eligible, unclaimed links sorted ahead of claimed ones
    /// (stable on remaining order).
    pub async fn resolve_links(
        &self,
        links: &[LinkRecord],
        on_progress: impl FnMut(ProgressEvent),
    ) -> Result<Vec<EligibleLink>> {
        let addrs: Vec<String> = links.iter().map(|l| l.network_address.clone()).collect();
        let statuses = self.resolve_statuses(&addrs, on_progress).await?;

        let mut eligible: Vec<EligibleLink> = links
            .iter()
            .cloned()
            .zip(statuses)
            .map(|(link, status)| EligibleLink { link, status })
            .filter(|e| e.status.eligible)
            .collect();
        eligible.sort_by_key(|e| e.status.claimed);

        Ok(eligible)
    }
}
