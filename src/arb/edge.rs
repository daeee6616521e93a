/// An edge is one of the two traversal directions of a pool in the arbitrage graph.
/// It is a read-only view: quoting goes straight to the pool behind it.
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};

use alloy::primitives::U256;

use super::asset::Asset;
use super::error::ArbError;
use super::pool::{PoolId, PoolRef};

/// The direction of a swap in a pool.
///
/// Pools order their assets by id, so `ZeroForOne` always sells the lower-id asset.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Direction {
    /// Swap from asset0 to asset1 in the pool
    ZeroForOne,
    /// Swap from asset1 to asset0 in the pool
    OneForZero,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "0>1"),
            Self::OneForZero => write!(f, "1>0"),
        }
    }
}

/// Key of an edge. Parallel pools between the same assets get distinct keys.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EdgeId {
    /// The pool the edge trades through
    pub pool_id: PoolId,
    /// The direction of the swap
    pub direction: Direction,
}

impl Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.pool_id, self.direction)
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pool_id, self.direction)
    }
}

/// A directed edge `asset_in -> asset_out` through one pool
#[derive(Clone)]
pub struct Edge {
    /// Unique identifier for this edge, containing pool ID and direction
    id: EdgeId,
    /// The asset sold into the pool
    asset_in: Asset,
    /// The asset bought from the pool
    asset_out: Asset,
    /// The pool snapshot behind the edge
    pool: PoolRef,
}

/// Edges compare by key and assets only; the pool snapshot behind them is not part of
/// the identity.
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.asset_in == other.asset_in && self.asset_out == other.asset_out
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.asset_in.hash(state);
        self.asset_out.hash(state);
    }
}

impl Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            // Edge(P1 0>1, 1000 A -> 2000 B)
            "Edge({:?}, {} {} -> {} {})",
            self.id,
            self.pool.supply(&self.asset_in),
            self.asset_in,
            self.pool.supply(&self.asset_out),
            self.asset_out,
        )
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.id, self.asset_in, self.asset_out)
    }
}

impl Edge {
    /// Creates the edge that sells `asset_in` into `pool`.
    ///
    /// # Errors
    ///
    /// Returns an error if `asset_in` is not one of the pool's assets
    pub fn new(pool: PoolRef, asset_in: &Asset) -> Result<Self, ArbError> {
        let asset_out = pool.other_asset(asset_in)?.clone();
        let direction = if asset_in == pool.assets().0 {
            Direction::ZeroForOne
        } else {
            Direction::OneForZero
        };
        Ok(Self {
            id: EdgeId {
                pool_id: pool.id().clone(),
                direction,
            },
            asset_in: asset_in.clone(),
            asset_out,
            pool,
        })
    }

    /// Both edges of a pool: `asset0 -> asset1` then `asset1 -> asset0`
    #[must_use]
    pub fn both(pool: &PoolRef) -> [Self; 2] {
        let (asset0, asset1) = pool.assets();
        let forward = Self {
            id: EdgeId {
                pool_id: pool.id().clone(),
                direction: Direction::ZeroForOne,
            },
            asset_in: asset0.clone(),
            asset_out: asset1.clone(),
            pool: PoolRef::clone(pool),
        };
        let reverse = Self {
            id: EdgeId {
                pool_id: pool.id().clone(),
                direction: Direction::OneForZero,
            },
            asset_in: asset1.clone(),
            asset_out: asset0.clone(),
            pool: PoolRef::clone(pool),
        };
        [forward, reverse]
    }

    /// The edge key
    #[must_use]
    pub const fn id(&self) -> &EdgeId {
        &self.id
    }

    /// The pool identity
    #[must_use]
    pub const fn pool_id(&self) -> &PoolId {
        &self.id.pool_id
    }

    /// The asset sold into the pool
    #[must_use]
    pub const fn asset_in(&self) -> &Asset {
        &self.asset_in
    }

    /// The asset bought from the pool
    #[must_use]
    pub const fn asset_out(&self) -> &Asset {
        &self.asset_out
    }

    /// The pool behind the edge
    #[must_use]
    pub const fn pool(&self) -> &PoolRef {
        &self.pool
    }

    /// What the pool pays out for `amount_in` along this edge
    #[must_use]
    pub fn amount_out(&self, amount_in: U256) -> U256 {
        self.pool.amount_out(&self.asset_in, amount_in)
    }

    /// Spot output per unit of input along this edge
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.pool.ratio(&self.asset_in)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::sync::Arc;

    use super::*;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_new_direction() {
        let pool: PoolRef = Arc::new(pool("P1", "B", "A", 200, 100));
        let edge = Edge::new(Arc::clone(&pool), &asset("A")).unwrap();
        assert_eq!(edge.id().direction, Direction::ZeroForOne);
        assert_eq!(edge.asset_out(), &asset("B"));
        assert_eq!(edge.amount_out(U256::from(10)), U256::from(18));

        let edge = Edge::new(Arc::clone(&pool), &asset("B")).unwrap();
        assert_eq!(edge.id().direction, Direction::OneForZero);
        assert_eq!(edge.to_string(), "P1 1>0: B -> A");
    }

    #[test]
    fn test_new_foreign_asset() {
        let pool: PoolRef = Arc::new(pool("P1", "A", "B", 100, 200));
        assert_eq!(
            Edge::new(pool, &asset("C")).err().unwrap().to_string(),
            "Asset C is not traded by pool P1"
        );
    }

    #[test]
    fn test_both_directions() {
        let pool: PoolRef = Arc::new(pool("P1", "A", "B", 100, 200));
        let [forward, reverse] = Edge::both(&pool);
        assert_eq!(forward.pool_id(), reverse.pool_id());
        assert_eq!(forward.id().direction, Direction::ZeroForOne);
        assert_eq!(reverse.id().direction, Direction::OneForZero);
        assert_eq!(forward.asset_in(), reverse.asset_out());
        assert_eq!(forward, Edge::new(Arc::clone(&pool), &asset("A")).unwrap());
        assert_eq!(reverse, Edge::new(pool, &asset("B")).unwrap());
    }

    #[test]
    fn test_equality_and_hash_ignore_reserves() {
        let edge1 = edge("P1", "A", "B", 100, 200);
        let edge2 = edge("P1", "A", "B", 120, 230);
        assert_eq!(edge1, edge2);

        let hash = |edge: &Edge| {
            let mut hasher = DefaultHasher::new();
            edge.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&edge1), hash(&edge2));

        let edge3 = edge("P1", "B", "A", 100, 200);
        assert_ne!(edge1, edge3);
        assert_ne!(hash(&edge1), hash(&edge3));
    }
}
