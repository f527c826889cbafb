use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;

use crate::schemas::AppState;

/// Initialize application state against a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Report cache; entries expire rather than being invalidated on write.
    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(60))
        .build();

    Ok(AppState { db, cache })
}
