use super::{
    sse::{SseDecoder, SseEvent},
    LedgerFeed,
};
use crate::{
    error::{WatchError, WatchResult},
    ledger::{LedgerCursor, LedgerRecord, Link},
};
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use reqwest::{header::ACCEPT, Client};
use serde_derive::Deserialize;
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info, instrument, trace};
use url::Url;

const EVENT_STREAM: &str = "text/event-stream";
const DEFAULT_RETRY: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct LedgerJson {
    #[serde(rename = "_links")]
    links: LedgerLinks,
    paging_token: String,
    sequence: u32,
    total_coins: String,
}

#[derive(Debug, Deserialize)]
struct LedgerLinks {
    effects: Link,
}

impl From<LedgerJson> for LedgerRecord {
    fn from(value: LedgerJson) -> Self {
        Self {
            sequence: value.sequence,
            cursor: LedgerCursor(value.paging_token),
            total_supply: value.total_coins,
            effects: value.links.effects,
        }
    }
}

/// Parses one stream event into a ledger. The `"hello"` greeting and other
/// non-message events carry no ledger.
pub fn parse_event(event: &SseEvent) -> WatchResult<Option<LedgerRecord>> {
    if event.event.as_deref().is_some_and(|name| name != "message") {
        return Ok(None);
    }
    if event.data.is_empty() || event.data == "\"hello\"" || event.data == "\"byebye\"" {
        return Ok(None);
    }
    serde_json::from_str::<LedgerJson>(&event.data)
        .map(|ledger| Some(ledger.into()))
        .map_err(|e| {
            let id = event.id.as_deref().unwrap_or("without id");
            WatchError::Query(format!("cannot decode ledger event {id}: {e}"))
        })
}

/// Server-sent-events subscription to a Horizon `/ledgers` stream. When the
/// server ends the stream the subscription reopens it from the last
/// delivered cursor.
pub struct HorizonLedgerFeed {
    client: Client,
    ledgers_url: Url,
    cursor: LedgerCursor,
    stream: Option<BoxStream<'static, reqwest::Result<Vec<u8>>>>,
    decoder: SseDecoder,
    pending: VecDeque<LedgerRecord>,
}

impl HorizonLedgerFeed {
    pub fn new(client: Client, horizon_url: &str, cursor: LedgerCursor) -> WatchResult<Self> {
        let mut base = Url::parse(horizon_url).map_err(WatchError::connection)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let ledgers_url = base.join("ledgers").map_err(WatchError::connection)?;

        Ok(Self {
            client,
            ledgers_url,
            cursor,
            stream: None,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
        })
    }

    pub fn cursor(&self) -> &LedgerCursor {
        &self.cursor
    }

    #[instrument(skip(self), fields(cursor = %self.cursor))]
    async fn connect(&mut self) -> WatchResult<()> {
        let mut url = self.ledgers_url.clone();
        url.query_pairs_mut()
            .append_pair("cursor", self.cursor.as_str());

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await
            .map_err(|e| WatchError::Connection(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Connection(format!(
                "GET {url} returned {status}"
            )));
        }

        info!("Streaming ledgers from {url}");
        self.stream = Some(
            response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
        );
        Ok(())
    }
}

#[async_trait]
impl LedgerFeed for HorizonLedgerFeed {
    async fn next_ledger(&mut self) -> WatchResult<Option<LedgerRecord>> {
        loop {
            if let Some(ledger) = self.pending.pop_front() {
                self.cursor = ledger.cursor.clone();
                return Ok(Some(ledger));
            }

            let Some(stream) = self.stream.as_mut() else {
                self.connect().await?;
                continue;
            };

            let chunk = stream.next().await;
            match chunk {
                Some(Ok(chunk)) => {
                    for event in self.decoder.push(&chunk) {
                        trace!("Event {:?}", event.id);
                        if let Some(ledger) = parse_event(&event)? {
                            self.pending.push_back(ledger);
                        }
                    }
                }
                Some(Err(e)) => return Err(WatchError::connection(e)),
                None => {
                    let delay = self.decoder.retry().unwrap_or(DEFAULT_RETRY);
                    debug!(
                        "Ledger stream closed by server, reopening from {} in {delay:?}",
                        self.cursor
                    );
                    self.stream = None;
                    self.decoder = SseDecoder::default();
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
