use super::{database::DatabaseArgs, LogLevelFilter};
use crate::constants::*;

#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServeArgs {
    #[clap(flatten)]
    pub db: DatabaseArgs,

    /// Address and port to listen on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Path serving the voter totals of a pool
    #[arg(long, default_value = DEFAULT_TOTALS_PATH)]
    pub totals: String,

    /// Path serving the full voter list of a pool
    #[arg(long, default_value = DEFAULT_VOTERS_PATH)]
    pub voters: String,

    /// Query parameter carrying the pool address
    #[arg(long, default_value = DEFAULT_POOL_PARAM)]
    pub param: String,

    /// Pool used when the request names none or an invalid one
    #[arg(long, default_value = DEFAULT_POOL)]
    pub pool: String,

    /// SQL LIKE pattern selecting the voter data entries to report
    #[arg(long, default_value = DEFAULT_ATTRIBUTE_PATTERN)]
    pub key: String,

    /// Max stdout log level
    #[arg(long, default_value_t = LogLevelFilter::default())]
    pub log_level: LogLevelFilter,
}
