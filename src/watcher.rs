//! Inflation watcher
//!
//! Consumes the ledger feed one record at a time. The first record sets the
//! total supply baseline; the first record whose supply differs from it is
//! the inflation ledger. At that point the feed is cancelled and, still
//! inside the handler, the voter snapshot is taken and the pool's credit is
//! looked up. The run ends after the result is written, or after the watch
//! state is checkpointed on failure.

use crate::{
    checkpoint::CheckpointStore,
    effects::{EffectPaginator, EffectSource},
    error::{RunError, Stage, WatchError},
    feed::LedgerFeed,
    ledger::{amount::to_stroops, pool_address::PoolAddress, LedgerCursor, LedgerRecord},
    snapshot::{store::VoterSource, VoterSnapshot, VoterSnapshotBuilder},
    state::{InflationResult, Observation, StoredSnapshot, WatchState},
};
use std::{future::Future, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, trace, warn};

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub pool: PoolAddress,
    pub attribute_pattern: String,
    pub snapshot_deadline: Duration,
    pub walk_deadline: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Watching,
    Triggered,
    Terminated,
    Failed,
}

pub struct LedgerStreamWatcher<V, E> {
    config: WatcherConfig,
    snapshots: VoterSnapshotBuilder<V>,
    paginator: EffectPaginator<E>,
    checkpoints: CheckpointStore,
    state: WatchState,
    phase: WatchPhase,
    stop_feed: CancellationToken,
    shutdown: CancellationToken,
}

impl<V: VoterSource, E: EffectSource> LedgerStreamWatcher<V, E> {
    /// Starts from the stored checkpoint if there is one, otherwise from
    /// the head of the feed with no baseline
    pub fn new(
        config: WatcherConfig,
        snapshots: VoterSnapshotBuilder<V>,
        paginator: EffectPaginator<E>,
        checkpoints: CheckpointStore,
        shutdown: CancellationToken,
    ) -> Self {
        let state = checkpoints
            .load()
            .unwrap_or_else(|| WatchState::starting_at(LedgerCursor::now()));
        Self {
            config,
            snapshots,
            paginator,
            checkpoints,
            state,
            phase: WatchPhase::Watching,
            stop_feed: CancellationToken::new(),
            shutdown,
        }
    }

    /// Where the feed subscription must start
    pub fn cursor(&self) -> &LedgerCursor {
        &self.state.cursor
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    /// Token raised once when inflation is detected
    pub fn feed_cancellation(&self) -> CancellationToken {
        self.stop_feed.clone()
    }

    /// Runs until the inflation result is written or something fails. On
    /// failure the watch state is checkpointed before the error is returned.
    #[instrument(skip_all, fields(pool = %self.config.pool, cursor = %self.state.cursor))]
    pub async fn run<F: LedgerFeed>(&mut self, feed: &mut F) -> Result<InflationResult, RunError> {
        match self.consume(feed).await {
            Ok(result) => {
                self.phase = WatchPhase::Terminated;
                Ok(result)
            }
            Err(err) => {
                self.phase = WatchPhase::Failed;
                self.persist_failure(&err);
                Err(err)
            }
        }
    }

    async fn consume<F: LedgerFeed>(&mut self, feed: &mut F) -> Result<InflationResult, RunError> {
        let mut outcome = None;

        while !self.stop_feed.is_cancelled() {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => Err(WatchError::Cancelled),
                next = feed.next_ledger() => next,
            };
            let ledger = next
                .map_err(|e| RunError::new(Stage::Feed, e))?
                .ok_or_else(|| {
                    RunError::new(
                        Stage::Feed,
                        WatchError::Connection("ledger feed ended".to_string()),
                    )
                })?;
            outcome = self.handle_ledger(ledger).await?;
        }

        outcome.ok_or_else(|| RunError::new(Stage::Feed, WatchError::Cancelled))
    }

    async fn handle_ledger(
        &mut self,
        ledger: LedgerRecord,
    ) -> Result<Option<InflationResult>, RunError> {
        match self.state.observe(&ledger) {
            Observation::Baseline => {
                info!("Baseline total supply {} at {}", ledger.total_supply, ledger.summary());
                Ok(None)
            }
            Observation::Unchanged => {
                trace!("No inflation in {}", ledger.summary());
                Ok(None)
            }
            Observation::SupplyChanged { previous } => {
                info!(
                    "Inflation in ledger {}: total supply {previous} -> {}",
                    ledger.sequence, ledger.total_supply
                );
                self.phase = WatchPhase::Triggered;
                self.stop_feed.cancel();
                self.run_pipeline(&ledger).await.map(Some)
            }
        }
    }

    async fn run_pipeline(&mut self, ledger: &LedgerRecord) -> Result<InflationResult, RunError> {
        let pool = self.config.pool.as_str();
        let pattern = self.config.attribute_pattern.as_str();

        let stored = self.state.snapshot.take().filter(|stored| {
            let usable = stored.answers(&self.config.pool, pattern);
            if !usable {
                warn!(
                    "Discarding checkpointed snapshot of {} for {:?}",
                    stored.pool_address, stored.attribute_pattern
                );
            }
            usable
        });
        let snapshot = match stored {
            Some(stored) => {
                info!("Reusing the voter snapshot stored in the checkpoint");
                let snapshot = stored.snapshot.clone();
                self.state.snapshot = Some(stored);
                snapshot
            }
            None => {
                let snapshot = self
                    .bounded(
                        Stage::Snapshot,
                        self.config.snapshot_deadline,
                        self.snapshots.fetch_snapshot(pool, pattern),
                    )
                    .await?;
                self.state.snapshot = Some(StoredSnapshot::new(
                    &self.config.pool,
                    pattern,
                    snapshot.clone(),
                ));
                snapshot
            }
        };

        let credit = self
            .bounded(
                Stage::Credit,
                self.config.walk_deadline,
                self.paginator.walk(&ledger.effects, pool, &self.shutdown),
            )
            .await?;
        let credited_amount = match credit {
            Some(amount) => Some(
                to_stroops(&amount)
                    .map_err(|e| RunError::new(Stage::Credit, WatchError::pagination(e)))?,
            ),
            None => {
                warn!("No credit to {pool} found in ledger {}", ledger.sequence);
                None
            }
        };

        let result = self.result(ledger, credited_amount, snapshot);
        self.checkpoints
            .write_result(&result)
            .map_err(|e| RunError::new(Stage::Result, e.into()))?;

        self.state = WatchState::after(ledger);
        if let Err(e) = self.checkpoints.save(&self.state) {
            warn!("Result written but checkpoint not updated: {e}");
        }
        Ok(result)
    }

    fn result(
        &self,
        ledger: &LedgerRecord,
        credited_amount: Option<String>,
        snapshot: VoterSnapshot,
    ) -> InflationResult {
        InflationResult {
            ledger_sequence: ledger.sequence,
            pool_address: self.config.pool.to_string(),
            credited_amount,
            snapshot,
        }
    }

    /// Awaits `fut` unless the deadline passes or shutdown is requested
    async fn bounded<T>(
        &self,
        stage: Stage,
        deadline: Duration,
        fut: impl Future<Output = Result<T, WatchError>>,
    ) -> Result<T, RunError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(RunError::new(stage, WatchError::Cancelled)),
            res = tokio::time::timeout(deadline, fut) => match res {
                Ok(res) => res.map_err(|e| RunError::new(stage, e)),
                Err(_) => Err(RunError::new(stage, deadline_exceeded(stage, deadline))),
            },
        }
    }

    fn persist_failure(&mut self, err: &RunError) {
        error!("{err}");
        self.state = self.state.clone().with_error(err);
        if let Err(e) = self.checkpoints.save(&self.state) {
            error!(
                "Unable to save checkpoint to {}: {e}",
                self.checkpoints.state_path().display()
            );
        }
    }
}

fn deadline_exceeded(stage: Stage, deadline: Duration) -> WatchError {
    let msg = format!("deadline of {deadline:?} exceeded");
    match stage {
        Stage::Credit => WatchError::Pagination(msg),
        _ => WatchError::Query(msg),
    }
}
