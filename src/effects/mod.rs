pub mod horizon;
pub mod template;

use crate::{
    constants::ACCOUNT_CREDITED_TYPE_CODE,
    error::{WatchError, WatchResult},
    ledger::Link,
};
use async_trait::async_trait;
use serde_derive::{Deserialize, Serialize};
use template::TemplateParams;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    #[serde(rename = "type_i")]
    pub type_code: i32,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectPage {
    pub records: Vec<EffectRecord>,
    pub next: Option<Url>,
}

impl EffectRecord {
    pub fn credit(account: &str, amount: &str) -> Self {
        Self {
            type_code: ACCOUNT_CREDITED_TYPE_CODE,
            account: account.to_string(),
            amount: amount.to_string(),
        }
    }

    pub fn is_credit_to(&self, account: &str) -> bool {
        self.type_code == ACCOUNT_CREDITED_TYPE_CODE && self.account == account
    }
}

/// Fetches one page of an effects collection
#[async_trait]
pub trait EffectSource: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> WatchResult<EffectPage>;
}

/// Walks an effects collection page by page looking for the credit made to
/// one account
pub struct EffectPaginator<E> {
    source: E,
    params: TemplateParams,
}

impl<E: EffectSource> EffectPaginator<E> {
    pub fn new(source: E) -> Self {
        Self {
            source,
            params: TemplateParams::default(),
        }
    }

    pub fn resolve(&self, link: &Link) -> WatchResult<Url> {
        if link.templated {
            template::expand(&link.href, &self.params).map_err(WatchError::pagination)
        } else {
            Url::parse(&link.href).map_err(WatchError::pagination)
        }
    }

    /// Returns the amount of the first credit to `target` in collection
    /// order. An empty page or a missing next link ends the walk without a
    /// match. There is no page bound: `cancel` stops the walk between or
    /// during page fetches.
    #[instrument(skip(self, start, cancel), fields(start = %start.href))]
    pub async fn walk(
        &self,
        start: &Link,
        target: &str,
        cancel: &CancellationToken,
    ) -> WatchResult<Option<String>> {
        let mut next = Some(self.resolve(start)?);
        let mut pages = 0_u64;

        while let Some(url) = next {
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WatchError::Cancelled),
                page = self.source.fetch_page(&url) => page?,
            };
            pages += 1;

            if page.records.is_empty() {
                debug!("Empty page {url} after {pages} pages, no credit found");
                return Ok(None);
            }

            if let Some(credit) = page.records.iter().find(|r| r.is_credit_to(target)) {
                info!("Found credit of {} to {target} on page {pages}", credit.amount);
                return Ok(Some(credit.amount.clone()));
            }

            next = page.next;
        }

        debug!("Collection ended after {pages} pages, no credit found");
        Ok(None)
    }
}
