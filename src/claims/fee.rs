use crate::claims::ClaimRecord;
use crate::error::{ClaimError, Result};

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Immutable fee rate for one submission. 1 bps = 0.01%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeConfig {
    bps: u16,
}

impl FeeConfig {
    pub fn new(bps: u16) -> Result<Self> {
        if bps as u128 > BPS_DENOMINATOR {
            return Err(ClaimError::Config(format!("fee bps {} exceeds 10000", bps)));
        }
        Ok(Self { bps })
    }

    pub fn bps(&self) -> u16 {
        self.bps
    }

    /// `floor(sum(amounts) * bps / 10000)`, computed once over the whole
    /// submission. The sum is widened to u128 so the product cannot wrap.
    pub fn fee_for(&self, claims: &[ClaimRecord]) -> u64 {
        calculate_fee(claims, self.bps)
    }
}

pub fn calculate_fee(claims: &[ClaimRecord], bps: u16) -> u64 {
    let total: u128 = claims.iter().map(|c| c.amount as u128).sum();
    (total * bps as u128 / BPS_DENOMINATOR) as u64
}
