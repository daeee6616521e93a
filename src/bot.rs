//! The decision loop.
//!
//! Every cycle refreshes all pools, freezes the refreshed reserves into one immutable
//! snapshot, and runs discovery, sizing and batch preparation against that snapshot
//! only. Pools are never mutated while they are being quoted: a refresh builds new
//! pool values and swaps them in once every pool has been read.
//!
//! Only constant-product pools are refreshed: reserve reads and rebuilt pool values are
//! specific to that adapter. Discovery and sizing go through the `Pool` capability and
//! do not depend on it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use alloy::primitives::{I256, U256};
use eyre::Result;
use futures_util::future::join_all;
use log::{debug, error, info, warn};

use crate::arb::transaction::SettlementReceipt;
use crate::arb::{
    prepare_batch, ArbError, ArbitrageGraph, ArbitragePath, Asset, ConstantProductPool, Pool,
    PoolId, PoolRef, Settlement,
};
use crate::config::Config;
use crate::snapshot::PoolSnapshot;

/// External collaborator that reads the current reserves of a pool.
///
/// Calls may block; the bot runs them on the blocking thread pool. Reserves are the
/// constant-product state; other pool families would need their own source.
pub trait ReserveSource: Send + Sync {
    /// Current reserves of `pool`, ordered as its assets.
    ///
    /// # Errors
    ///
    /// Returns [`ArbError::PoolUnavailable`] if the reserves cannot be read
    fn reserves(&self, pool: &ConstantProductPool) -> Result<(U256, U256), ArbError>;
}

/// Reads reserves from a snapshot file, re-reading it whenever it changes on disk
#[derive(Debug)]
pub struct SnapshotReserveSource {
    /// The snapshot file
    path: PathBuf,
    /// Reserves by pool, with the modification time they were read at
    cache: Mutex<Option<(SystemTime, HashMap<PoolId, (U256, U256)>)>>,
}

impl SnapshotReserveSource {
    /// Creates a source backed by the snapshot at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    fn unavailable(pool: &PoolId, reason: impl ToString) -> ArbError {
        ArbError::PoolUnavailable {
            pool: pool.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ReserveSource for SnapshotReserveSource {
    fn reserves(&self, pool: &ConstantProductPool) -> Result<(U256, U256), ArbError> {
        let id = pool.id();
        let modified = std::fs::metadata(&self.path)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| Self::unavailable(id, e))?;
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Self::unavailable(id, "reserve cache poisoned"))?;

        let fresh = matches!(cache.as_ref(), Some((read_at, _)) if *read_at == modified);
        if !fresh {
            let snapshot = PoolSnapshot::load(&self.path).map_err(|e| Self::unavailable(id, e))?;
            let reserves = snapshot
                .pools
                .into_iter()
                .map(|record| {
                    let reserves = (U256::from(record.reserve0), U256::from(record.reserve1));
                    (record.id, reserves)
                })
                .collect();
            *cache = Some((modified, reserves));
        }

        cache
            .as_ref()
            .and_then(|(_, reserves)| reserves.get(id).copied())
            .ok_or_else(|| Self::unavailable(id, "not in snapshot"))
    }
}

/// A sized arbitrage opportunity
#[derive(Debug, Clone)]
pub struct Opportunity {
    /// The cycle
    pub path: ArbitragePath,
    /// Chosen input; zero means no trade
    pub amount_in: U256,
    /// Gross profit at `amount_in`
    pub profit: I256,
    /// Profit net of network fees at `amount_in`
    pub profit_after_fee: I256,
}

/// The arbitrage bot
pub struct Bot {
    /// The current pool snapshot
    pools: Vec<Arc<ConstantProductPool>>,
    /// Where fresh reserves come from
    source: Arc<dyn ReserveSource>,
    /// Where profitable batches go
    settlement: Arc<dyn Settlement>,
    /// Loop settings
    config: Config,
    /// The asset every cycle starts from and pays fees in
    main_asset: Asset,
}

impl Bot {
    /// Creates a bot over `pools`
    #[must_use]
    pub fn new(
        pools: Vec<Arc<ConstantProductPool>>,
        source: Arc<dyn ReserveSource>,
        settlement: Arc<dyn Settlement>,
        config: Config,
    ) -> Self {
        Self {
            pools,
            source,
            settlement,
            config,
            main_asset: Asset::native(),
        }
    }

    /// The current pool snapshot
    #[must_use]
    pub fn pools(&self) -> &[Arc<ConstantProductPool>] {
        &self.pools
    }

    /// Reads fresh reserves for every pool, at most `max_workers` at a time.
    ///
    /// The pool set is replaced only when every read succeeded, so a failed refresh
    /// leaves the previous snapshot intact.
    ///
    /// # Errors
    ///
    /// Returns [`ArbError::PoolUnavailable`] for the first pool that could not be read
    pub async fn refresh(&mut self) -> Result<(), ArbError> {
        info!("Refreshing {} pools...", self.pools.len());
        let mut refreshed = Vec::with_capacity(self.pools.len());

        for chunk in self.pools.chunks(self.config.max_workers.max(1)) {
            let tasks = chunk.iter().map(|pool| {
                let source = Arc::clone(&self.source);
                let pool = Arc::clone(pool);
                tokio::task::spawn_blocking(move || source.reserves(&pool))
            });
            let results = join_all(tasks).await;

            for (pool, result) in chunk.iter().zip(results) {
                let (reserve0, reserve1) = result.map_err(|e| ArbError::PoolUnavailable {
                    pool: pool.id().clone(),
                    reason: format!("refresh task failed: {e}"),
                })??;
                refreshed.push(Arc::new(pool.with_reserves(reserve0, reserve1)));
            }
        }

        self.pools = refreshed;
        info!("Finished refreshing pools.");
        Ok(())
    }

    /// Finds, ranks and sizes the opportunities of the current snapshot.
    ///
    /// Cycles from the main asset with a positive spot ratio are ranked by ratio, best
    /// first, and the top ones are sized with the configured optimizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the main asset is not in any pool
    pub fn opportunities(&self) -> Result<Vec<Opportunity>, ArbError> {
        let pools: Vec<PoolRef> = self
            .pools
            .iter()
            .map(|pool| Arc::clone(pool) as PoolRef)
            .collect();
        let graph = ArbitrageGraph::new(pools);

        let paths = graph.find_opportunities(
            &self.main_asset,
            self.config.cutoff,
            |path| path.ratio() > 0.0,
            Some(|path: &ArbitragePath| -path.ratio()),
        )?;
        info!("Found {} candidate cycles", paths.len());

        paths
            .into_iter()
            .take(self.config.top_opportunities)
            .map(|path| -> Result<Opportunity, ArbError> {
                let amount_in = path.optimal_amount_in(self.config.max_amount_in, &self.config.optimizer);
                let profit_after_fee = path.profit_after_fee(amount_in, &self.config.fee)?;
                debug!("{path}: amount_in {amount_in}, profit after fee {profit_after_fee}");
                Ok(Opportunity {
                    profit: path.profit(amount_in),
                    path,
                    amount_in,
                    profit_after_fee,
                })
            })
            .collect()
    }

    /// Runs one decision cycle: refresh, size the best opportunities and submit every
    /// batch that is profitable after fees.
    ///
    /// Returns the receipts of the submitted batches.
    ///
    /// # Errors
    /// * If the refresh fails
    /// * If the main asset is not in any pool
    pub async fn decide(&mut self) -> Result<Vec<SettlementReceipt>> {
        self.refresh().await?;
        let opportunities = self.opportunities()?;

        let mut receipts = Vec::new();
        for opportunity in opportunities {
            if opportunity.amount_in.is_zero() {
                debug!("{}: no profitable amount", opportunity.path);
                continue;
            }
            let batch = match prepare_batch(
                &opportunity.path,
                self.config.sender,
                opportunity.amount_in,
                &self.config.fee,
            ) {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("{}: {e}", opportunity.path);
                    continue;
                }
            };
            if batch.profit_after_fee()? <= I256::ZERO {
                continue;
            }
            match self.settlement.submit(&batch) {
                Ok(receipt) => {
                    info!(
                        "Sent {} for {} (expected profit {})",
                        opportunity.path,
                        batch.amount_in(),
                        batch.profit_after_fee()?
                    );
                    receipts.push(receipt);
                }
                Err(e) => error!("{}: {e}", opportunity.path),
            }
        }
        Ok(receipts)
    }

    /// Runs decision cycles until ctrl-c.
    ///
    /// A failed cycle is logged and the next one starts from a fresh refresh.
    ///
    /// # Errors
    /// * If the shutdown signal cannot be listened for
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting bot...");
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    signal?;
                    info!("Received shutdown signal, stopping");
                    return Ok(());
                }
                () = self.cycle() => {}
            }
        }
    }

    /// One decision cycle followed by the configured pause
    async fn cycle(&mut self) {
        match self.decide().await {
            Ok(receipts) => debug!("Decision cycle done, {} batches sent", receipts.len()),
            Err(e) => error!("Decision cycle failed: {e:#}"),
        }
        tokio::time::sleep(self.config.interval).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::arb::AtomicBatch;
    use crate::snapshot::tests::{temp_path, triangle_snapshot};

    use super::*;

    /// Serves reserves from a map
    struct FixedReserves(HashMap<PoolId, (U256, U256)>);

    impl ReserveSource for FixedReserves {
        fn reserves(&self, pool: &ConstantProductPool) -> Result<(U256, U256), ArbError> {
            self.0
                .get(pool.id())
                .copied()
                .ok_or_else(|| SnapshotReserveSource::unavailable(pool.id(), "unknown pool"))
        }
    }

    /// Keeps every submitted batch
    #[derive(Default)]
    struct Recorder(Mutex<Vec<AtomicBatch>>);

    impl Settlement for Recorder {
        fn submit(&self, batch: &AtomicBatch) -> Result<SettlementReceipt, ArbError> {
            self.0.lock().unwrap().push(batch.clone());
            Ok(SettlementReceipt {
                group_id: Some("group".to_string()),
                submitted: true,
            })
        }
    }

    fn pools() -> Vec<Arc<ConstantProductPool>> {
        triangle_snapshot().into_pools().unwrap()
    }

    fn current_reserves() -> FixedReserves {
        FixedReserves(
            pools()
                .iter()
                .map(|pool| (pool.id().clone(), pool.reserves()))
                .collect(),
        )
    }

    fn bot(source: impl ReserveSource + 'static, settlement: Arc<Recorder>, precise: bool) -> Bot {
        let config = Config {
            max_workers: 2,
            optimizer: crate::config::optimizer(precise),
            ..Config::default()
        };
        Bot::new(pools(), Arc::new(source), settlement, config)
    }

    #[test]
    fn test_opportunities_ranked_and_sized() {
        let bot = bot(current_reserves(), Arc::default(), true);
        let opportunities = bot.opportunities().unwrap();
        assert_eq!(opportunities.len(), 1);

        let best = &opportunities[0];
        assert_eq!(best.path.to_string(), "ArbitragePath<ALGO|USDC|GOLD|ALGO>");
        // still rising at the cap
        assert_eq!(best.amount_in, U256::from(1_000_000));
        assert_eq!(best.profit, I256::try_from(46_858).unwrap());
        assert_eq!(best.profit_after_fee, I256::try_from(40_858).unwrap());
    }

    #[tokio::test]
    async fn test_decide_submits_profitable_batch() {
        for precise in [false, true] {
            let recorder = Arc::new(Recorder::default());
            let mut bot = bot(current_reserves(), Arc::clone(&recorder), precise);
            let receipts = bot.decide().await.unwrap();
            assert_eq!(receipts.len(), 1);

            let batches = recorder.0.lock().unwrap();
            assert_eq!(batches.len(), 1);
            assert_eq!(batches[0].requests().len(), 3);
            assert_eq!(batches[0].amount_in(), U256::from(1_000_000));
            assert_eq!(batches[0].fee(), 6_000);
        }
    }

    #[tokio::test]
    async fn test_refresh_closes_the_gap() {
        // GOLD/ALGO back at the fair price: no cycle has a positive ratio
        let mut source = current_reserves();
        source.0.insert(
            PoolId::from("P-GOLD-ALGO"),
            (U256::from(1_000_000_000), U256::from(1_000_000_000)),
        );
        let recorder = Arc::new(Recorder::default());
        let mut bot = bot(source, Arc::clone(&recorder), true);
        let receipts = bot.decide().await.unwrap();
        assert!(receipts.is_empty());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let mut source = current_reserves();
        source.0.remove(&PoolId::from("P-USDC-GOLD"));
        let recorder = Arc::new(Recorder::default());
        let mut bot = bot(source, Arc::clone(&recorder), true);
        let before: Vec<_> = bot.pools().iter().map(|pool| pool.reserves()).collect();

        let err = bot.refresh().await.err().unwrap();
        assert_eq!(err.to_string(), "Pool P-USDC-GOLD unavailable: unknown pool");
        let after: Vec<_> = bot.pools().iter().map(|pool| pool.reserves()).collect();
        assert_eq!(before, after);

        assert!(bot.decide().await.is_err());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_reserve_source() {
        let path = temp_path("reserves");
        triangle_snapshot().save(&path).unwrap();
        let mut bot = bot(SnapshotReserveSource::new(&path), Arc::default(), false);
        bot.refresh().await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let expected: Vec<_> = pools().iter().map(|pool| pool.reserves()).collect();
        let refreshed: Vec<_> = bot.pools().iter().map(|pool| pool.reserves()).collect();
        assert_eq!(refreshed, expected);
    }

    #[test]
    fn test_snapshot_reserve_source_missing_file() {
        let source = SnapshotReserveSource::new(temp_path("gone"));
        let pool = &pools()[0];
        assert!(matches!(
            source.reserves(pool),
            Err(ArbError::PoolUnavailable { .. })
        ));
    }
}
