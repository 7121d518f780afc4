//! Binary entry point: resolve configuration, install the tracing
//! subscriber, and run the server until the process is terminated.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pinboard::app::App;
use pinboard::config::Config;
use pinboard::server::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // RUST_LOG wins when set; otherwise the DEBUG flag picks the level.
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!(
        environment = %config.environment,
        debug = config.debug,
        "starting pinboard"
    );

    let addr = config.addr();
    let app = Arc::new(App::new(config));
    let server = Server::bind(&addr).await?;

    server
        .run(move |request| {
            let app = Arc::clone(&app);
            async move { app.handle(request).await }
        })
        .await?;

    Ok(())
}
