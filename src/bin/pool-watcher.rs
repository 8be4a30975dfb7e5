use anyhow::Context;
use clap::{Parser, Subcommand};
use pool_watcher::{
    checkpoint::CheckpointStore,
    cli::{serve::ServeArgs, watch::WatchArgs, LogLevelFilter},
    effects::{horizon::HorizonEffectSource, EffectPaginator},
    feed::horizon::HorizonLedgerFeed,
    ledger::pool_address::PoolAddress,
    snapshot::{store::PgVoterSource, VoterSnapshotBuilder},
    watcher::{LedgerStreamWatcher, WatcherConfig},
    web::{start_web_server, QueryRoutes},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "pool-watcher", author, version, about, long_about = Some("Pool Watcher\n\n\
Captures the voters of an inflation pool at the moment inflation runs"))]
struct Cli {
    #[command(subcommand)]
    command: PoolCommand,
}

#[derive(Subcommand, Debug)]
enum PoolCommand {
    /// Watch the ledger stream and record the pool's voters at inflation
    Watch(WatchArgs),
    /// Serve voter totals and voter lists over HTTP
    Serve(ServeArgs),
}

fn init_tracing(level: LogLevelFilter) {
    let stdout_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(level.0))
        .init();
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        PoolCommand::Watch(args) => {
            init_tracing(args.log_level);
            watch(args).await
        }
        PoolCommand::Serve(args) => {
            init_tracing(args.log_level);
            serve(args).await
        }
    }
}

async fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let config = WatcherConfig::try_from(&args).context("invalid pool address")?;
    let client = reqwest::Client::builder()
        .connect_timeout(args.http_timeout())
        .build()?;

    let source = PgVoterSource::connect(
        args.db.connect_options()?,
        args.db.max_connections,
        args.http_timeout(),
    )
    .await?;
    let paginator = EffectPaginator::new(HorizonEffectSource::new(
        client.clone(),
        args.http_timeout(),
    ));
    let checkpoints = CheckpointStore::new(&args.error_file, &args.voters_file);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, shutting down");
                shutdown.cancel();
            }
        }
    });

    let mut watcher = LedgerStreamWatcher::new(
        config,
        VoterSnapshotBuilder::new(source.clone()),
        paginator,
        checkpoints,
        shutdown,
    );
    let mut feed = HorizonLedgerFeed::new(client, &args.horizon, watcher.cursor().clone())?;

    let outcome = watcher.run(&mut feed).await;
    source.close().await;

    let result = outcome?;
    info!(
        "Recorded {} voters of {} for ledger {}",
        result.snapshot.voter_count, result.pool_address, result.ledger_sequence
    );
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let routes = QueryRoutes {
        totals_path: args.totals,
        voters_path: args.voters,
        pool_param: args.param,
        default_pool: PoolAddress::parse(&args.pool).context("invalid pool address")?,
        attribute_pattern: args.key,
    };
    let source = PgVoterSource::connect(
        args.db.connect_options()?,
        args.db.max_connections,
        std::time::Duration::from_secs(pool_watcher::constants::DEFAULT_HTTP_TIMEOUT_SECS),
    )
    .await?;

    start_web_server(source, routes, args.listen.as_str()).await?;
    Ok(())
}
