use super::{EffectPage, EffectRecord, EffectSource};
use crate::{
    error::{WatchError, WatchResult},
    ledger::Link,
};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde_derive::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const HAL_JSON: &str = "application/hal+json";

#[derive(Debug, Default, Deserialize)]
struct EffectsResponse {
    #[serde(rename = "_links", default)]
    links: PageLinks,
    #[serde(rename = "_embedded", default)]
    embedded: Embedded,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    next: Option<Link>,
}

#[derive(Debug, Default, Deserialize)]
struct Embedded {
    #[serde(default)]
    records: Vec<EffectRecord>,
}

/// Effects pages served by a Horizon server
#[derive(Clone)]
pub struct HorizonEffectSource {
    client: Client,
    request_timeout: Duration,
}

impl HorizonEffectSource {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }
}

impl EffectsResponse {
    fn into_page(self, current: &Url) -> WatchResult<EffectPage> {
        let next = match self.links.next {
            Some(link) if !link.href.is_empty() => {
                Some(current.join(&link.href).map_err(WatchError::pagination)?)
            }
            _ => None,
        };
        Ok(EffectPage {
            records: self.embedded.records,
            next,
        })
    }
}

#[async_trait]
impl EffectSource for HorizonEffectSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_page(&self, url: &Url) -> WatchResult<EffectPage> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HAL_JSON)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| WatchError::Pagination(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Pagination(format!("GET {url} returned {status}")));
        }

        let body: EffectsResponse = response
            .json()
            .await
            .map_err(|e| WatchError::Pagination(format!("GET {url}: {e}")))?;
        debug!("Fetched {} effects", body.embedded.records.len());
        body.into_page(url)
    }
}
