use std::sync::Arc;

use tracing::{error, info};

use tubesync::store::DirectoryStore;
use tubesync::youtube::{build_client, FeedSource, SubscriptionSource};
use tubesync::{
    BatchScheduler, Config, Database, FeedRefresher, RefreshWorker, SqliteStore, SyncService,
    WebServer, YoutubeFeedClient, YoutubeSubscriptionClient,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = tubesync::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        tubesync::logging::init_console_only(&config.logging.level);
    }

    info!("tubesync {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> tubesync::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let store: Arc<dyn DirectoryStore> = Arc::new(SqliteStore::new(db));

    let client = build_client(&config.youtube)?;
    let subscriptions: Arc<dyn SubscriptionSource> = Arc::new(YoutubeSubscriptionClient::new(
        client.clone(),
        &config.youtube,
        &config.sync,
    ));
    let feeds: Arc<dyn FeedSource> =
        Arc::new(YoutubeFeedClient::new(client, &config.youtube, &config.sync)?);

    let scheduler = BatchScheduler::new(config.sync.batch_size, config.sync.batch_delay());
    let (worker, queue) = RefreshWorker::new(FeedRefresher::new(store.clone(), feeds, scheduler));
    worker.spawn();
    info!(
        "Refresh worker running (batch size {}, cooldown {}ms)",
        config.sync.batch_size, config.sync.batch_delay_ms
    );

    let sync = Arc::new(SyncService::from_config(
        store,
        subscriptions,
        queue,
        &config.sync,
    )?);

    WebServer::new(&config.web, sync)?.run().await
}
