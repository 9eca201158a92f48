use crate::error::{ClaimError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Foreign networks whose addresses can be linked to claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Solana,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Ethereum => write!(f, "ethereum"),
            Network::Solana => write!(f, "solana"),
        }
    }
}

impl FromStr for Network {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" => Ok(Network::Ethereum),
            "solana" => Ok(Network::Solana),
            other => Err(ClaimError::UnsupportedNetwork(other.to_string())),
        }
    }
}

/// Validate and canonicalize a foreign address.
///
/// Ethereum addresses are `0x` plus 40 hex digits, canonicalized to
/// lowercase. Solana addresses are base58 strings of length 32-44 and are
/// returned unchanged (base58 is case-sensitive, so rewriting would not be
/// idempotent).
pub fn normalize(network: Network, raw: &str) -> Result<String> {
    match network {
        Network::Ethereum => normalize_ethereum(raw),
        Network::Solana => normalize_solana(raw),
    }
}

fn normalize_ethereum(raw: &str) -> Result<String> {
    let invalid = || ClaimError::InvalidAddress {
        network: Network::Ethereum.to_string(),
        address: raw.to_string(),
    };

    let hex = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")).ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}

fn normalize_solana(raw: &str) -> Result<String> {
    let invalid = || ClaimError::InvalidAddress {
        network: Network::Solana.to_string(),
        address: raw.to_string(),
    };

    if raw.len() < 32 || raw.len() > 44 {
        return Err(invalid());
    }
    bs58::decode(raw).into_vec().map_err(|_| invalid())?;

    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH: &str = "0xAb5801a7D398351b8bE11C439e05C5b3259aec9B";
    const SOL: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

    #[test]
    fn test_ethereum_lowercases() {
        let normalized = normalize(Network::Ethereum, ETH).unwrap();
        assert_eq!(normalized, "0xab5801a7d398351b8be11c439e05c5b3259aec9b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(Network::Ethereum, ETH).unwrap();
        let twice = normalize(Network::Ethereum, &once).unwrap();
        assert_eq!(once, twice);

        let once = normalize(Network::Solana, SOL).unwrap();
        let twice = normalize(Network::Solana, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ethereum_rejects_bad_input() {
        assert!(normalize(Network::Ethereum, "ab5801a7d398351b8be11c439e05c5b3259aec9b").is_err());
        assert!(normalize(Network::Ethereum, "0x1234").is_err());
        assert!(normalize(Network::Ethereum, "0xZZ5801a7d398351b8be11c439e05c5b3259aec9b").is_err());
    }

    #[test]
    fn test_solana_rejects_bad_input() {
        // 'l' and '0' are outside the base58 alphabet
        assert!(normalize(Network::Solana, "l0l0l0l0l0l0l0l0l0l0l0l0l0l0l0l0l0l0").is_err());
        assert!(normalize(Network::Solana, "tooshort").is_err());
    }

    #[test]
    fn test_unknown_network_is_unsupported() {
        let err = "dogecoin".parse::<Network>().unwrap_err();
        assert!(matches!(err, ClaimError::UnsupportedNetwork(n) if n == "dogecoin"));
    }
}
