use std::net::SocketAddr;

use kazhutha::config::ServerConfig;
use kazhutha::http::routes::{self, AppState};
use kazhutha::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ServerConfig::from_env();
    let addr: SocketAddr = config.addr;
    let state = AppState::new(config);
    let _janitor = state.rooms.spawn_janitor(state.config.rooms);

    let app = routes::router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
