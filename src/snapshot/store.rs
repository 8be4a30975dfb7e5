//! Relational reads behind the voter snapshot
//!
//! A [`VoterSource`] hands out one [`VoterReader`] per snapshot. Everything a
//! reader returns comes from a single consistent view of the database, so
//! the totals and the per-voter rows describe the same set of accounts.

use super::{VoterRow, VoterTotals};
use crate::{
    error::{WatchError, WatchResult},
    ledger::pool_address::PoolAddress,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{
    postgres::{PgConnectOptions, PgPool, PgPoolOptions},
    Postgres, Transaction,
};
use std::time::Duration;
use tracing::{debug, instrument};

const TOTALS_QUERY: &str = "SELECT COUNT(accountid), SUM(balance) \
FROM accounts WHERE inflationdest = $1";

const VOTERS_QUERY: &str = "SELECT \
accounts.accountid, balance, dataname, datavalue \
FROM accounts LEFT JOIN accountdata \
ON accountdata.accountid = accounts.accountid \
AND dataname LIKE $2 WHERE inflationdest = $1";

const CONSISTENT_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

#[async_trait]
pub trait VoterSource: Send + Sync {
    type Reader: VoterReader;

    /// Opens a consistent read
    async fn reader(&self) -> WatchResult<Self::Reader>;
}

#[async_trait]
pub trait VoterReader: Send {
    /// Number of accounts voting for `pool` and the sum of their balances
    async fn totals(&mut self, pool: &PoolAddress) -> WatchResult<VoterTotals>;

    /// One row per (voter, matching attribute) pair; attribute columns are
    /// null for voters without a matching attribute
    async fn voter_rows(&mut self, pool: &PoolAddress, pattern: &str)
        -> WatchResult<Vec<VoterRow>>;

    /// Ends the read
    async fn finish(self) -> WatchResult<()>;
}

/// Reads voters from a stellar-core PostgreSQL database
#[derive(Clone)]
pub struct PgVoterSource {
    pool: PgPool,
}

impl PgVoterSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(options), fields(host = options.get_host()))]
    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> WatchResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(WatchError::connection)?;
        debug!("Connected to voters database");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await
    }
}

pub struct PgVoterReader {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VoterSource for PgVoterSource {
    type Reader = PgVoterReader;

    async fn reader(&self) -> WatchResult<PgVoterReader> {
        let mut tx = self.pool.begin().await.map_err(WatchError::connection)?;
        sqlx::query(CONSISTENT_READ).execute(&mut *tx).await?;
        Ok(PgVoterReader { tx })
    }
}

#[async_trait]
impl VoterReader for PgVoterReader {
    async fn totals(&mut self, pool: &PoolAddress) -> WatchResult<VoterTotals> {
        let (count, sum) = sqlx::query_as::<_, (i64, Option<Decimal>)>(TOTALS_QUERY)
            .bind(pool.as_str())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(VoterTotals {
            count,
            sum: sum.unwrap_or(Decimal::ZERO),
        })
    }

    async fn voter_rows(
        &mut self,
        pool: &PoolAddress,
        pattern: &str,
    ) -> WatchResult<Vec<VoterRow>> {
        let rows = sqlx::query_as::<_, VoterRow>(VOTERS_QUERY)
            .bind(pool.as_str())
            .bind(pattern)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn finish(self) -> WatchResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
