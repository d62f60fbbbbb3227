use tracing::info;

use calcache::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calcache");

    // Load configuration
    let config = startup::load_config()?;

    // Run the refresh scheduler and HTTP server
    startup::run(config).await
}
