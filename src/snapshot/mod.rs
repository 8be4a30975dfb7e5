pub mod store;

use crate::{
    error::WatchResult,
    ledger::pool_address::PoolAddress,
    snapshot::store::{VoterReader, VoterSource},
};
use data_encoding::BASE64;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// A single voter with its decoded attributes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoterRecord {
    pub balance: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Every account voting for a pool at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterSnapshot {
    pub voter_count: String,
    pub total_votes: String,
    #[serde(default)]
    pub voters: BTreeMap<String, VoterRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoterTotals {
    pub count: i64,
    pub sum: Decimal,
}

/// Row of the voters join: balances repeat once per matching attribute
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VoterRow {
    pub accountid: String,
    pub balance: i64,
    pub dataname: Option<String>,
    pub datavalue: Option<String>,
}

#[derive(Debug, Error)]
pub enum AttributeDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] data_encoding::DecodeError),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl VoterTotals {
    pub fn voter_count(&self) -> String {
        self.count.to_string()
    }

    pub fn total_votes(&self) -> String {
        self.sum.normalize().to_string()
    }

    fn into_snapshot(self, voters: BTreeMap<String, VoterRecord>) -> VoterSnapshot {
        VoterSnapshot {
            voter_count: self.voter_count(),
            total_votes: self.total_votes(),
            voters,
        }
    }
}

impl VoterRow {
    pub fn new(accountid: &str, balance: i64) -> Self {
        Self {
            accountid: accountid.to_string(),
            balance,
            dataname: None,
            datavalue: None,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.dataname = Some(name.to_string());
        self.datavalue = Some(value.to_string());
        self
    }
}

impl VoterSnapshot {
    pub fn empty() -> Self {
        VoterTotals::default().into_snapshot(BTreeMap::new())
    }

    pub fn is_consistent(&self) -> bool {
        self.voter_count == self.voters.len().to_string()
    }
}

pub fn decode_attribute(value: &str) -> Result<String, AttributeDecodeError> {
    let bytes = BASE64.decode(value.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Groups join rows by account. Each account gets exactly one record whose
/// balance comes from its rows; attributes that fail to decode are dropped
/// without touching the rest of the account.
pub fn aggregate_rows(rows: impl IntoIterator<Item = VoterRow>) -> BTreeMap<String, VoterRecord> {
    let mut voters: BTreeMap<String, VoterRecord> = BTreeMap::new();

    for row in rows {
        let balance = row.balance.to_string();
        let voter = voters
            .entry(row.accountid.clone())
            .or_insert_with(|| VoterRecord {
                balance: balance.clone(),
                attributes: BTreeMap::new(),
            });

        if voter.balance != balance {
            warn!(
                "Balance of {} changed within one read ({} vs {})",
                row.accountid, voter.balance, balance
            );
        }

        if let (Some(name), Some(value)) = (row.dataname, row.datavalue) {
            match decode_attribute(&value) {
                Ok(decoded) => {
                    voter.attributes.insert(name, decoded);
                }
                Err(e) => debug!("Dropping attribute {name} of {}: {e}", row.accountid),
            }
        }
    }

    voters
}

/// Builds voter snapshots for a pool
pub struct VoterSnapshotBuilder<V> {
    source: V,
}

impl<V: VoterSource> VoterSnapshotBuilder<V> {
    pub fn new(source: V) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn fetch_totals(&self, pool: &str) -> WatchResult<VoterTotals> {
        let pool = PoolAddress::parse(pool)?;
        let mut reader = self.source.reader().await?;
        let totals = reader.totals(&pool).await?;
        reader.finish().await?;
        Ok(totals)
    }

    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self, pool: &str, pattern: &str) -> WatchResult<VoterSnapshot> {
        let pool = PoolAddress::parse(pool)?;
        let mut reader = self.source.reader().await?;
        let totals = reader.totals(&pool).await?;
        info!(
            "Pool {pool} has {} voters with {} votes",
            totals.voter_count(),
            totals.total_votes()
        );

        if totals.count == 0 {
            reader.finish().await?;
            return Ok(totals.into_snapshot(BTreeMap::new()));
        }

        let rows = reader.voter_rows(&pool, pattern).await?;
        reader.finish().await?;
        debug!("Aggregating {} voter rows", rows.len());

        let snapshot = totals.into_snapshot(aggregate_rows(rows));
        if !snapshot.is_consistent() {
            warn!(
                "Snapshot has {} voters but totals counted {}",
                snapshot.voters.len(),
                snapshot.voter_count
            );
        }
        Ok(snapshot)
    }
}
