pub mod horizon;
pub mod sse;

use crate::{error::WatchResult, ledger::LedgerRecord};

/// Ordered source of ledger records. Records come out strictly in feed
/// order; `None` means the feed ended.
#[async_trait::async_trait]
pub trait LedgerFeed: Send {
    async fn next_ledger(&mut self) -> WatchResult<Option<LedgerRecord>>;
}
