use tracing::level_filters::LevelFilter;

pub mod database;
pub mod serve;
pub mod watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevelFilter(pub LevelFilter);

impl std::str::FromStr for LogLevelFilter {
    type Err = <LevelFilter as std::str::FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelFilter::from_str(s).map(Self)
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self(LevelFilter::INFO)
    }
}

impl std::fmt::Display for LogLevelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
