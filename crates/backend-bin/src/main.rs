use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tripmate_backend_lib::{config, store::FlatFileStore, ws_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings first: the configured log level is the fallback filter
    let settings = config::load_settings()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let store = FlatFileStore::new(&settings.data_dir)?;

    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(store, settings));

    let app = ws_router::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
