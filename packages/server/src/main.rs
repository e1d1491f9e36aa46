use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{Level, info};

use common::storage::filesystem::FilesystemBlobStore;
use server::catalog::locks::KeyedLocks;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    let blob_store =
        Arc::new(FilesystemBlobStore::new(config.storage.media_root.clone()).await?);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        blob_store,
        catalog_locks: Arc::new(KeyedLocks::new()),
        config,
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
