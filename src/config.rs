use serde::Deserialize;

/// Hard structural cap on claims accepted by a single submission call.
pub const MAX_SUBMISSION_ITEMS: usize = 10_000;

/// The ledger rejects writes that create more than this many new entries.
pub const MAX_NEW_ENTRIES_PER_TX: usize = 500;

/// Byte budget for a single write's packed arguments.
pub const MAX_PACKED_ARG_BYTES: usize = 131_072;

/// Encoded upper bound per claim entry: length-prefixed address plus u64 amount.
const CLAIM_ENTRY_BYTES: usize = 64;

/// Encoded upper bound per address in a delete write.
const DELETE_ENTRY_BYTES: usize = 48;

/// Chunk bound for claim-adding writes: whichever of the entry cap and the
/// packed-argument budget bites first.
pub fn claim_chunk_bound() -> usize {
    MAX_NEW_ENTRIES_PER_TX.min(MAX_PACKED_ARG_BYTES / CLAIM_ENTRY_BYTES)
}

/// Chunk bound for delete writes. Deletes create no entries, so only the
/// argument budget applies; this bound is larger than the claim bound.
pub fn delete_chunk_bound() -> usize {
    MAX_PACKED_ARG_BYTES / DELETE_ENTRY_BYTES
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub airdrop: AirdropConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Admin-owned registry object holding the claim records.
    pub registry_id: String,
    /// Coin type funding the claims.
    pub coin_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirdropConfig {
    pub sender: String,
    pub network: String,
    pub fee_bps: u16,
    pub chunk_size: Option<usize>,
    pub read_batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CleanupConfig {
    pub page_size: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("CLAIMDROP").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.airdrop.fee_bps > 10_000 {
            anyhow::bail!("fee_bps {} exceeds 10000", self.airdrop.fee_bps);
        }
        if self.airdrop.read_batch_size == 0 {
            anyhow::bail!("read_batch_size must be positive");
        }
        if self.airdrop.chunk_size == Some(0) {
            anyhow::bail!("chunk_size must be positive");
        }
        if self.cleanup.page_size == 0 {
            anyhow::bail!("cleanup page_size must be positive");
        }
        Ok(())
    }

    /// Effective chunk size for claim-adding writes. Overrides are clamped to
    /// the ledger bound rather than rejected.
    pub fn claim_chunk_size(&self) -> usize {
        self.airdrop
            .chunk_size
            .unwrap_or_else(claim_chunk_bound)
            .min(claim_chunk_bound())
    }

    /// Effective page size for cleanup. One delete write must cover a whole
    /// page, so the page size is clamped to the delete chunk bound.
    pub fn cleanup_page_size(&self) -> usize {
        self.cleanup.page_size.min(delete_chunk_bound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_bound_smaller_than_delete_bound() {
        assert!(claim_chunk_bound() < delete_chunk_bound());
        assert!(claim_chunk_bound() <= MAX_NEW_ENTRIES_PER_TX);
    }

    fn config_with_chunk_size(chunk_size: Option<usize>) -> Config {
        Config {
            ledger: LedgerConfig {
                registry_id: "0x1".to_string(),
                coin_type: "0x2::drop::DROP".to_string(),
            },
            airdrop: AirdropConfig {
                sender: "0xadmin".to_string(),
                network: "ethereum".to_string(),
                fee_bps: 250,
                chunk_size,
                read_batch_size: 50,
            },
            cleanup: CleanupConfig { page_size: 1_000 },
        }
    }

    #[test]
    fn test_chunk_size_override_is_clamped() {
        let config = config_with_chunk_size(Some(1_000_000));
        assert_eq!(config.claim_chunk_size(), claim_chunk_bound());
        assert_eq!(config.cleanup_page_size(), 1_000);
    }

    #[test]
    fn test_zero_chunk_size_fails_validation() {
        assert!(config_with_chunk_size(Some(0)).validate().is_err());
        assert!(config_with_chunk_size(None).validate().is_ok());
    }
}
