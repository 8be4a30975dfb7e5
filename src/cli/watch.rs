use super::{database::DatabaseArgs, LogLevelFilter};
use crate::{
    constants::*,
    ledger::pool_address::{PoolAddress, PoolAddressError},
    watcher::WatcherConfig,
};
use std::{path::PathBuf, time::Duration};

#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub db: DatabaseArgs,

    /// URL of a horizon server to stream ledgers and effects from
    #[arg(long, default_value = HORIZON_PUBLIC_URL)]
    pub horizon: String,

    /// Inflation destination whose voters are collected
    #[arg(long, default_value = DEFAULT_POOL)]
    pub pool: String,

    /// SQL LIKE pattern selecting the voter data entries to report
    #[arg(long, default_value = DEFAULT_ATTRIBUTE_PATTERN)]
    pub key: String,

    /// File the watch state is saved to on failure and resumed from
    #[arg(long, default_value = DEFAULT_CHECKPOINT_FILE)]
    pub error_file: PathBuf,

    /// File the inflation result is written to
    #[arg(long, default_value = DEFAULT_RESULT_FILE)]
    pub voters_file: PathBuf,

    /// Time limit (sec) for taking the voter snapshot
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_DEADLINE_SECS)]
    pub snapshot_deadline: u64,

    /// Time limit (sec) for finding the pool's credit in the effects
    #[arg(long, default_value_t = DEFAULT_WALK_DEADLINE_SECS)]
    pub walk_deadline: u64,

    /// Time limit (sec) for connecting to horizon and for each effects page
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout: u64,

    /// Max stdout log level
    #[arg(long, default_value_t = LogLevelFilter::default())]
    pub log_level: LogLevelFilter,
}

impl Default for WatchArgs {
    fn default() -> Self {
        Self {
            db: DatabaseArgs::default(),
            horizon: HORIZON_PUBLIC_URL.to_string(),
            pool: DEFAULT_POOL.to_string(),
            key: DEFAULT_ATTRIBUTE_PATTERN.to_string(),
            error_file: DEFAULT_CHECKPOINT_FILE.into(),
            voters_file: DEFAULT_RESULT_FILE.into(),
            snapshot_deadline: DEFAULT_SNAPSHOT_DEADLINE_SECS,
            walk_deadline: DEFAULT_WALK_DEADLINE_SECS,
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
            log_level: LogLevelFilter::default(),
        }
    }
}

impl WatchArgs {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

impl TryFrom<&WatchArgs> for WatcherConfig {
    type Error = PoolAddressError;

    fn try_from(value: &WatchArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            pool: PoolAddress::parse(&value.pool)?,
            attribute_pattern: value.key.clone(),
            snapshot_deadline: Duration::from_secs(value.snapshot_deadline),
            walk_deadline: Duration::from_secs(value.walk_deadline),
        })
    }
}
