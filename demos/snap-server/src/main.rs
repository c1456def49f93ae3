//! Runnable Snapdeck server.
//!
//! Binds to the address given as the first argument, or `SNAPDECK_ADDR`,
//! or `127.0.0.1:8080`. Log verbosity is controlled via `RUST_LOG`.

use snapdeck::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SNAPDECK_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let server = SnapServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "snap server listening");
    server.run().await
}
