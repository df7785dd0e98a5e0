#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use restaurant_orders::{
    api::{self, AppState},
    config::{self, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed role groups and the bootstrap administrator
    database::seed(&db, app_config.admin.as_ref())
        .await
        .inspect(|()| info!("Groups and administrator seeded successfully."))
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;

    // 6. Serve the API
    api::serve(&app_config.server, AppState::new(db)).await
}
