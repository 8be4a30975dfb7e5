// network constants

pub const HORIZON_PUBLIC_URL: &str = "https://horizon.stellar.org";
pub const POOL_ADDRESS_LEN: usize = 56;
pub const POOL_ADDRESS_PREFIX: char = 'G';
pub const STROOP_SCALE: u32 = 7;

/// `type_i` of an `account_credited` effect
pub const ACCOUNT_CREDITED_TYPE_CODE: i32 = 2;

/// Cursor that starts a ledger stream at the current head
pub const CURSOR_NOW: &str = "now";

// effects template parameters

pub const EFFECTS_TEMPLATE_CURSOR: &str = "";
pub const EFFECTS_TEMPLATE_ORDER: &str = "asc";
pub const EFFECTS_TEMPLATE_LIMIT: u32 = 200;

// watcher defaults

pub const DEFAULT_POOL: &str = "GCCD6AJOYZCUAQLX32ZJF2MKFFAUJ53PVCFQI3RHWKL3V47QYE2BNAUT";
pub const DEFAULT_ATTRIBUTE_PATTERN: &str = "lumenaut.net donation%";
pub const DEFAULT_CHECKPOINT_FILE: &str = "error.json";
pub const DEFAULT_RESULT_FILE: &str = "voters.json";
pub const DEFAULT_SNAPSHOT_DEADLINE_SECS: u64 = 300;
pub const DEFAULT_WALK_DEADLINE_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// database defaults

pub const DEFAULT_DB_USER: &str = "stellar";
pub const DEFAULT_DB_NAME: &str = "core";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 4;

// query service defaults

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOTALS_PATH: &str = "/totals";
pub const DEFAULT_VOTERS_PATH: &str = "/voters";
pub const DEFAULT_POOL_PARAM: &str = "pool";
