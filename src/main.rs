use tracing_subscriber::EnvFilter;

mod app;
mod control;
mod game;
mod protocol;
mod room_runtime;
mod shared;
mod transport;

use app::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();
    control::run(config).await
}
