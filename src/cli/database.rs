use crate::constants::*;
use sqlx::postgres::PgConnectOptions;

#[derive(clap::Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// PostgreSQL user name to connect as
    #[arg(long = "db-user", default_value = DEFAULT_DB_USER)]
    pub user: String,

    /// Password to be used if the server demands password authentication
    #[arg(long = "db-pass", default_value = "")]
    pub pass: String,

    /// The database name
    #[arg(long = "db-name", default_value = DEFAULT_DB_NAME)]
    pub name: String,

    /// Name of host to connect to. If a host name begins with a slash, it
    /// specifies the directory of a Unix-domain socket
    #[arg(long = "db-host", default_value = DEFAULT_DB_HOST)]
    pub host: String,

    /// Port number to connect to at the server host
    #[arg(long = "db-port", default_value_t = DEFAULT_DB_PORT)]
    pub port: u16,

    /// Optional PostgreSQL connection URL. If provided, it's used instead of
    /// the other database flags
    #[arg(long = "db-conn")]
    pub conn: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long = "db-max-connections", default_value_t = DEFAULT_DB_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl Default for DatabaseArgs {
    fn default() -> Self {
        Self {
            user: DEFAULT_DB_USER.to_string(),
            pass: String::new(),
            name: DEFAULT_DB_NAME.to_string(),
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            conn: None,
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseArgs {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(conn) = self.conn.as_deref().filter(|conn| !conn.is_empty()) {
            return conn.parse();
        }

        let mut options = PgConnectOptions::new()
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        options = if self.host.starts_with('/') {
            options.socket(&self.host)
        } else {
            options.host(&self.host)
        };
        if !self.pass.is_empty() {
            options = options.password(&self.pass);
        }
        Ok(options)
    }
}
