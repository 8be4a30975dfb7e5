use crate::{
    ledger::{pool_address::PoolAddress, LedgerCursor, LedgerRecord},
    snapshot::VoterSnapshot,
};
use serde_derive::{Deserialize, Serialize};

/// Everything needed to resume watching after a crash
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchState {
    pub cursor: LedgerCursor,
    pub total_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<StoredSnapshot>,
}

/// Voter snapshot kept across runs, tagged with the query it answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    pub pool_address: String,
    pub attribute_pattern: String,
    pub snapshot: VoterSnapshot,
}

/// What a ledger meant for the watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// First ledger seen: its supply becomes the baseline
    Baseline,
    /// Same supply as the baseline
    Unchanged,
    /// Supply moved away from the baseline: inflation happened
    SupplyChanged { previous: String },
}

/// Output of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResult {
    pub ledger_sequence: u32,
    pub pool_address: String,
    pub credited_amount: Option<String>,
    pub snapshot: VoterSnapshot,
}

impl StoredSnapshot {
    pub fn new(pool: &PoolAddress, attribute_pattern: &str, snapshot: VoterSnapshot) -> Self {
        Self {
            pool_address: pool.to_string(),
            attribute_pattern: attribute_pattern.to_string(),
            snapshot,
        }
    }

    pub fn answers(&self, pool: &PoolAddress, attribute_pattern: &str) -> bool {
        self.pool_address == pool.as_str() && self.attribute_pattern == attribute_pattern
    }
}

impl WatchState {
    pub fn starting_at(cursor: LedgerCursor) -> Self {
        Self {
            cursor,
            ..Default::default()
        }
    }

    pub fn baseline(&self) -> Option<&str> {
        self.total_supply.as_deref().filter(|supply| !supply.is_empty())
    }

    /// Compares `ledger` with the baseline. The cursor only advances past
    /// ledgers that did not trigger, so a failed trigger is replayed on the
    /// next run.
    pub fn observe(&mut self, ledger: &LedgerRecord) -> Observation {
        match self.baseline() {
            None => {
                self.total_supply = Some(ledger.total_supply.clone());
                self.cursor = ledger.cursor.clone();
                Observation::Baseline
            }
            Some(supply) if supply == ledger.total_supply => {
                self.cursor = ledger.cursor.clone();
                Observation::Unchanged
            }
            Some(supply) => Observation::SupplyChanged {
                previous: supply.to_string(),
            },
        }
    }

    pub fn with_error(mut self, note: impl ToString) -> Self {
        self.error_note = Some(note.to_string());
        self
    }

    /// State after `ledger` was fully handled: the new supply is the
    /// baseline for the next inflation
    pub fn after(ledger: &LedgerRecord) -> Self {
        Self {
            cursor: ledger.cursor.clone(),
            total_supply: Some(ledger.total_supply.clone()),
            error_note: None,
            snapshot: None,
        }
    }
}
