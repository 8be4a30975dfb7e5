pub mod amount;
pub mod pool_address;

use crate::constants::CURSOR_NOW;
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Bookmark into the ledger feed. Horizon paging tokens are decimal
/// integers; `now` sorts after every concrete position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerCursor(pub String);

impl LedgerCursor {
    pub fn now() -> Self {
        Self(CURSOR_NOW.to_string())
    }

    pub fn is_now(&self) -> bool {
        self.0 == CURSOR_NOW
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LedgerCursor {
    fn default() -> Self {
        Self::now()
    }
}

impl PartialOrd for LedgerCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LedgerCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_now(), other.is_now()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .0
                .len()
                .cmp(&other.0.len())
                .then_with(|| self.0.cmp(&other.0)),
        }
    }
}

impl From<&str> for LedgerCursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for LedgerCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hypermedia link, possibly an RFC 6570 template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub templated: bool,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
        }
    }

    pub fn template(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: true,
        }
    }
}

/// One record of the ledger feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub sequence: u32,
    pub cursor: LedgerCursor,
    pub total_supply: String,
    pub effects: Link,
}

impl LedgerRecord {
    pub fn summary(&self) -> String {
        format!(
            "ledger {} (cursor {}, total supply {})",
            self.sequence, self.cursor, self.total_supply
        )
    }
}
