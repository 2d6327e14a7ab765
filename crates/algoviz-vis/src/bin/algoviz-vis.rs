//! Algoviz visualization server
//!
//! Usage: `algoviz-vis [algorithm] [port]`

use algoviz_algorithms::Session;
use algoviz_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_args(std::env::args().skip(1))?;
    tracing::info!(
        algorithm = %config.algorithm,
        port = config.port,
        speed_ms = config.engine.speed_ms,
        "starting algoviz"
    );

    let session = Session::new(config.engine, config.algorithm)?;
    VisServer::new(session).serve(config.port).await?;

    Ok(())
}
