use crate::address::{self, Network};
use crate::claims::batch::{self, ProgressEvent};
use crate::claims::fee::FeeConfig;
use crate::claims::ClaimRecord;
use crate::config::MAX_SUBMISSION_ITEMS;
use crate::error::{ClaimError, Result};
use crate::ledger::client::{LedgerClient, Receipt, WriteOp, FUND_CLAIMS_TARGET};
use crate::ledger::codec;
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of a fully committed submission.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub receipts: Vec<Receipt>,
    pub chunks: usize,
    pub claim_total: u64,
    pub fee: u64,
}

/// Submits claim-funding writes to the registry, one chunk at a time.
///
/// Chunks are never submitted concurrently: they all mutate the same
/// admin-owned registry object and the ledger does not guarantee a safe
/// interleaving of concurrent mutations to one object.
pub struct SubmissionEngine<L: LedgerClient> {
    ledger: L,
    registry_id: String,
    sender: String,
    chunk_size: usize,
}

impl<L: LedgerClient> SubmissionEngine<L> {
    pub fn new(ledger: L, registry_id: String, sender: String, chunk_size: usize) -> Self {
        Self { ledger, registry_id, sender, chunk_size }
    }

    /// Fund claims for `addrs[i]` with `amounts[i]`.
    ///
    /// All pre-flight checks (length, cap, address validity, duplicates)
    /// run before any write is issued. The whole-submission fee is attached
    /// to chunk 0's funding; later chunks fund only their own claim sum.
    /// On failure of chunk `k`, chunks `0..k` stay committed (writes are
    /// final) and the error reports `k` and the prior success count.
    pub async fn submit_claims(
        &self,
        network: Network,
        addrs: &[String],
        amounts: &[u64],
        fee_config: FeeConfig,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<SubmissionOutcome> {
        if self.chunk_size == 0 {
            return Err(ClaimError::Config("chunk size must be positive".to_string()));
        }
        let claims = self.preflight(network, addrs, amounts)?;
        let fee = fee_config.fee_for(&claims);

        let claim_total: u128 = claims.iter().map(|c| c.amount as u128).sum();
        let obligation = claim_total + fee as u128;
        let claim_total = u64::try_from(claim_total).map_err(|_| {
            ClaimError::Config("claim total overflows the funding amount".to_string())
        })?;
        if u64::try_from(obligation).is_err() {
            return Err(ClaimError::Config(
                "claim total plus fee overflows the funding amount".to_string(),
            ));
        }

        let chunks = batch::chunk(&claims, self.chunk_size);
        info!(
            "submitting {} claims as {} chunks (sender: {}, fee: {} @ {} bps)",
            claims.len(),
            chunks.len(),
            self.sender,
            fee,
            fee_config.bps()
        );

        let mut receipts = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            on_progress(ProgressEvent::Chunk { current: index + 1, total: chunks.len() });

            let chunk_sum: u64 = chunk.iter().map(|c| c.amount).sum();
            let funding = if index == 0 { chunk_sum + fee } else { chunk_sum };

            let op = WriteOp {
                target: FUND_CLAIMS_TARGET.to_string(),
                payload: codec::encode_fund_claims(&self.registry_id, funding, chunk)?,
            };

            let receipt = self
                .execute_chunk(op)
                .await
                .map_err(|cause| {
                    warn!("chunk {} failed, {} chunks already committed", index, index);
                    ClaimError::ChunkSubmissionFailed {
                        chunk_index: index,
                        prior_successes: index,
                        source: Box::new(cause),
                    }
                })?;

            info!("chunk {}/{} committed: {}", index + 1, chunks.len(), receipt.digest);
            receipts.push(receipt);
        }

        Ok(SubmissionOutcome { chunks: receipts.len(), receipts, claim_total, fee })
    }

    fn preflight(
        &self,
        network: Network,
        addrs: &[String],
        amounts: &[u64],
    ) -> Result<Vec<ClaimRecord>> {
        if addrs.len() != amounts.len() {
            return Err(ClaimError::LengthMismatch { addrs: addrs.len(), amounts: amounts.len() });
        }
        if addrs.len() > MAX_SUBMISSION_ITEMS {
            return Err(ClaimError::TooManyItems { count: addrs.len(), max: MAX_SUBMISSION_ITEMS });
        }

        let mut seen = HashSet::with_capacity(addrs.len());
        let mut claims = Vec::with_capacity(addrs.len());
        for (raw, &amount) in addrs.iter().zip(amounts) {
            let normalized = address::normalize(network, raw)?;
            if !seen.insert(normalized.clone()) {
                return Err(ClaimError::DuplicateAddress(normalized));
            }
            claims.push(ClaimRecord { address: normalized, amount });
        }
        Ok(claims)
    }

    async fn execute_chunk(&self, op: WriteOp) -> Result<Receipt> {
        let receipt = self.ledger.execute_write(op).await?;
        if !receipt.success {
            return Err(ClaimError::WriteRejected(receipt.digest));
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::client::MockLedgerClient;
    use crate::ledger::InMemoryLedger;
    use chrono::Utc;
    use mockall::Sequence;

    const REGISTRY: &str = "0xregistry";

    fn eth_addr(i: usize) -> String {
        format!("0x{:040x}", i + 1)
    }

    fn ok_receipt(digest: &str) -> Receipt {
        Receipt { digest: digest.to_string(), success: true, timestamp: Utc::now() }
    }

    fn engine_with(ledger: MockLedgerClient, chunk_size: usize) -> SubmissionEngine<MockLedgerClient> {
        SubmissionEngine::new(ledger, REGISTRY.to_string(), "0xadmin".to_string(), chunk_size)
    }

    #[tokio::test]
    async fn test_length_mismatch_before_any_write() {
        // no expectations: any write would panic the mock
        let engine = engine_with(MockLedgerClient::new(), 2);
        let err = engine
            .submit_claims(Network::Ethereum, &[eth_addr(0)], &[1, 2], FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::LengthMismatch { addrs: 1, amounts: 2 }));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected() {
        // no expectations: any write would panic the mock
        let engine = engine_with(MockLedgerClient::new(), 0);
        let err = engine
            .submit_claims(Network::Ethereum, &[eth_addr(0)], &[1], FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Config(_)));
    }

    #[tokio::test]
    async fn test_too_many_items_is_preflight() {
        let addrs: Vec<String> = (0..MAX_SUBMISSION_ITEMS + 1).map(eth_addr).collect();
        let amounts = vec![1u64; addrs.len()];
        let engine = engine_with(MockLedgerClient::new(), 500);
        let err = engine
            .submit_claims(Network::Ethereum, &addrs, &amounts, FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::TooManyItems { .. }));
    }

    #[tokio::test]
    async fn test_case_variants_collide_as_duplicates() {
        let addrs = vec![
            "0xAB5801A7D398351B8BE11C439E05C5B3259AEC9B".to_string(),
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b".to_string(),
        ];
        let engine = engine_with(MockLedgerClient::new(), 2);
        let err = engine
            .submit_claims(Network::Ethereum, &addrs, &[1, 2], FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::DuplicateAddress(_)));
    }

    #[tokio::test]
    async fn test_failed_chunk_stops_submission() {
        let mut ledger = MockLedgerClient::new();
        let mut seq = Sequence::new();
        for i in 0..2 {
            ledger
                .expect_execute_write()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(ok_receipt(&format!("d{}", i))));
        }
        ledger
            .expect_execute_write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClaimError::Ledger("gateway timeout".to_string())));

        let addrs: Vec<String> = (0..6).map(eth_addr).collect();
        let amounts = vec![10u64; 6];
        let engine = engine_with(ledger, 2);

        let err = engine
            .submit_claims(Network::Ethereum, &addrs, &amounts, FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();

        match err {
            ClaimError::ChunkSubmissionFailed { chunk_index, prior_successes, .. } => {
                assert_eq!(chunk_index, 2);
                assert_eq!(prior_successes, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // the mock's times(1) expectations prove chunk 3 was never attempted
    }

    #[tokio::test]
    async fn test_rejected_receipt_fails_chunk() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_execute_write().times(1).returning(|_| {
            Ok(Receipt { digest: "d0".to_string(), success: false, timestamp: Utc::now() })
        });
        let engine = engine_with(ledger, 2);
        let err = engine
            .submit_claims(Network::Ethereum, &[eth_addr(0)], &[1], FeeConfig::new(0).unwrap(), |_| {})
            .await
            .unwrap_err();
        match err {
            ClaimError::ChunkSubmissionFailed { chunk_index: 0, prior_successes: 0, source } => {
                assert!(matches!(*source, ClaimError::WriteRejected(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fee_attaches_to_first_chunk_only() {
        let mut ledger = MockLedgerClient::new();
        let mut seq = Sequence::new();
        // 3 claims of 1_000_000 at 250 bps: fee = 75_000, chunk size 2
        ledger
            .expect_execute_write()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|op| {
                let (_, funding, claims) = codec::decode_fund_claims(&op.payload).unwrap();
                funding == 2_000_000 + 75_000 && claims.len() == 2
            })
            .returning(|_| Ok(ok_receipt("d0")));
        ledger
            .expect_execute_write()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|op| {
                let (_, funding, claims) = codec::decode_fund_claims(&op.payload).unwrap();
                funding == 1_000_000 && claims.len() == 1
            })
            .returning(|_| Ok(ok_receipt("d1")));

        let addrs: Vec<String> = (0..3).map(eth_addr).collect();
        let amounts = vec![1_000_000u64; 3];
        let engine = engine_with(ledger, 2);

        let mut events = Vec::new();
        let outcome = engine
            .submit_claims(Network::Ethereum, &addrs, &amounts, FeeConfig::new(250).unwrap(), |e| {
                events.push(e)
            })
            .await
            .unwrap();

        assert_eq!(outcome.chunks, 2);
        assert_eq!(outcome.fee, 75_000);
        assert_eq!(outcome.claim_total, 3_000_000);
        assert_eq!(
            events,
            vec![
                ProgressEvent::Chunk { current: 1, total: 2 },
                ProgressEvent::Chunk { current: 2, total: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_full_submission_against_simulated_ledger() {
        let ledger = InMemoryLedger::new();
        let addrs: Vec<String> = (0..5).map(eth_addr).collect();
        let amounts: Vec<u64> = (1..=5).map(|i| i * 100).collect();

        let engine = SubmissionEngine::new(
            &ledger,
            REGISTRY.to_string(),
            "0xadmin".to_string(),
            2,
        );
        let outcome = engine
            .submit_claims(Network::Ethereum, &addrs, &amounts, FeeConfig::new(100).unwrap(), |_| {})
            .await
            .unwrap();

        // 1500 total, 1% fee = 15
        assert_eq!(outcome.claim_total, 1_500);
        assert_eq!(outcome.fee, 15);
        assert_eq!(outcome.chunks, 3);
        assert_eq!(ledger.claim_count().await, 5);
        assert_eq!(ledger.funded_total().await, 1_515);
    }
}
