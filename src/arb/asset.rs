use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use alloy::primitives::U256;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifier of the native asset. It needs no opt-in and pays every network fee.
pub const NATIVE_ASSET_ID: u64 = 0;

/// A tradable asset.
///
/// Identity is the `id` alone: two assets with the same id are equal whatever their
/// metadata says, and ordering by id is what gives pools their reserve ordering.
#[derive(Clone, Debug, Display, Serialize, Deserialize)]
#[display("{symbol}")]
pub struct Asset {
    /// The on-chain asset index
    pub id: u64,
    /// Number of decimals of the base unit
    pub decimals: u32,
    /// Short ticker
    pub symbol: String,
}

impl Asset {
    /// Creates a new asset
    #[must_use]
    pub fn new(id: u64, decimals: u32, symbol: impl Into<String>) -> Self {
        Self {
            id,
            decimals,
            symbol: symbol.into(),
        }
    }

    /// The native asset (id 0)
    #[must_use]
    pub fn native() -> Self {
        Self::new(NATIVE_ASSET_ID, 6, "ALGO")
    }

    /// Whether this is the native asset
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.id == NATIVE_ASSET_ID
    }

    /// Number of base units in one whole unit of the asset
    #[must_use]
    pub fn unit_scale(&self) -> U256 {
        U256::from(10).pow(U256::from(self.decimals))
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_id() {
        let usdc = Asset::new(31_566_704, 6, "USDC");
        let renamed = Asset::new(31_566_704, 2, "usdc-old");
        assert_eq!(usdc, renamed);
        assert_ne!(usdc, Asset::native());
        assert!(Asset::native() < usdc);
    }

    #[test]
    fn test_native() {
        let native = Asset::native();
        assert!(native.is_native());
        assert_eq!(native.to_string(), "ALGO");
        assert_eq!(native.unit_scale(), U256::from(1_000_000));
    }
}
