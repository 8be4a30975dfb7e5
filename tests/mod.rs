mod effects;
mod snapshot;
mod web;

pub mod helpers {
    use async_trait::async_trait;
    use pool_watcher::{
        effects::{EffectPage, EffectSource},
        error::{WatchError, WatchResult},
        feed::LedgerFeed,
        ledger::{pool_address::PoolAddress, LedgerCursor, LedgerRecord, Link},
        snapshot::{
            store::{VoterReader, VoterSource},
            VoterRow, VoterTotals,
        },
    };
    use rust_decimal::Decimal;
    use std::{
        collections::{HashMap, VecDeque},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };
    use url::Url;

    pub const POOL: &str = pool_watcher::constants::DEFAULT_POOL;
    pub const OTHER_ACCOUNT: &str = "GA3FUYFOPWZ25YXTCA73RK2UGONHCO27OHQRSGV3VCE67UEPEFEDCOPA";

    /// Sets up a new temp dir, deleted when it goes out of scope
    pub fn setup_new_dir(prefix: &str) -> anyhow::Result<tempfile::TempDir> {
        Ok(tempfile::TempDir::with_prefix(prefix)?)
    }

    pub fn effects_url(sequence: u32) -> String {
        format!("http://horizon.test/ledgers/{sequence}/effects")
    }

    pub fn ledger(sequence: u32, supply: &str) -> LedgerRecord {
        LedgerRecord {
            sequence,
            cursor: LedgerCursor(format!("{sequence}000")),
            total_supply: supply.to_string(),
            effects: Link::new(effects_url(sequence)),
        }
    }

    /// Feed replaying a fixed list of ledgers. Once drained it either ends
    /// or stays silent forever.
    pub struct VecFeed {
        items: VecDeque<WatchResult<LedgerRecord>>,
        hang_when_drained: bool,
        pub delivered: usize,
    }

    impl VecFeed {
        pub fn new(ledgers: impl IntoIterator<Item = LedgerRecord>) -> Self {
            Self {
                items: ledgers.into_iter().map(Ok).collect(),
                hang_when_drained: false,
                delivered: 0,
            }
        }

        pub fn then_fail(mut self, err: WatchError) -> Self {
            self.items.push_back(Err(err));
            self
        }

        pub fn then_hang(mut self) -> Self {
            self.hang_when_drained = true;
            self
        }

        pub fn remaining(&self) -> usize {
            self.items.len()
        }
    }

    #[async_trait]
    impl LedgerFeed for VecFeed {
        async fn next_ledger(&mut self) -> WatchResult<Option<LedgerRecord>> {
            match self.items.pop_front() {
                Some(item) => {
                    self.delivered += 1;
                    item.map(Some)
                }
                None if self.hang_when_drained => futures::future::pending().await,
                None => Ok(None),
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct VoterCalls {
        pub readers: AtomicUsize,
        pub totals: AtomicUsize,
        pub details: AtomicUsize,
        pub finished: AtomicUsize,
        pub pools: Mutex<Vec<String>>,
    }

    impl VoterCalls {
        pub fn readers(&self) -> usize {
            self.readers.load(Ordering::SeqCst)
        }

        pub fn details(&self) -> usize {
            self.details.load(Ordering::SeqCst)
        }

        pub fn finished(&self) -> usize {
            self.finished.load(Ordering::SeqCst)
        }

        pub fn pools(&self) -> Vec<String> {
            self.pools.lock().unwrap().clone()
        }
    }

    /// In-memory voters table. Counts the queries made against it.
    #[derive(Clone, Default)]
    pub struct FakeVoterSource {
        pub totals: VoterTotals,
        pub rows: Vec<VoterRow>,
        pub failure: Option<String>,
        pub calls: Arc<VoterCalls>,
    }

    impl FakeVoterSource {
        pub fn new(count: i64, sum: i64, rows: Vec<VoterRow>) -> Self {
            Self {
                totals: VoterTotals {
                    count,
                    sum: Decimal::from(sum),
                },
                rows,
                ..Default::default()
            }
        }

        pub fn failing(msg: &str) -> Self {
            Self {
                failure: Some(msg.to_string()),
                ..Default::default()
            }
        }
    }

    pub struct FakeVoterReader {
        source: FakeVoterSource,
    }

    #[async_trait]
    impl VoterSource for FakeVoterSource {
        type Reader = FakeVoterReader;

        async fn reader(&self) -> WatchResult<FakeVoterReader> {
            self.calls.readers.fetch_add(1, Ordering::SeqCst);
            Ok(FakeVoterReader {
                source: self.clone(),
            })
        }
    }

    #[async_trait]
    impl VoterReader for FakeVoterReader {
        async fn totals(&mut self, pool: &PoolAddress) -> WatchResult<VoterTotals> {
            self.source.calls.totals.fetch_add(1, Ordering::SeqCst);
            self.source.calls.pools.lock().unwrap().push(pool.to_string());
            match &self.source.failure {
                Some(msg) => Err(WatchError::Query(msg.clone())),
                None => Ok(self.source.totals),
            }
        }

        async fn voter_rows(
            &mut self,
            _pool: &PoolAddress,
            _pattern: &str,
        ) -> WatchResult<Vec<VoterRow>> {
            self.source.calls.details.fetch_add(1, Ordering::SeqCst);
            Ok(self.source.rows.clone())
        }

        async fn finish(self) -> WatchResult<()> {
            self.source.calls.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Effects collection served from memory, keyed by page url
    #[derive(Clone, Default)]
    pub struct FakeEffectSource {
        pages: HashMap<String, EffectPage>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    impl FakeEffectSource {
        pub fn with_page(mut self, url: &str, page: EffectPage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EffectSource for FakeEffectSource {
        async fn fetch_page(&self, url: &Url) -> WatchResult<EffectPage> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| WatchError::Pagination(format!("GET {url} returned 404 Not Found")))
        }
    }

    pub fn page(records: Vec<pool_watcher::effects::EffectRecord>, next: Option<&str>) -> EffectPage {
        EffectPage {
            records,
            next: next.map(|url| Url::parse(url).unwrap()),
        }
    }
}
