use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{error, info};

/// Applies migrations, then fills the database with sample rows.
///
/// Seeding is meant for an empty store; running it twice duplicates the
/// sample products and sales and fails on the fixed usernames.
pub async fn seed_database(database_url: &str) -> Result<()> {
    info!("Seeding database");

    let db = match Database::connect(database_url).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    Migrator::up(&db, None).await?;

    let summary = ops::seed::seed_all(&db).await?;

    info!(
        "Seeding complete: {} users, {} products, {} sales, {} income records, {} expense records",
        summary.users,
        summary.products,
        summary.sales,
        summary.income_records,
        summary.expense_records
    );
    info!("Default admin credentials: admin / admin123");

    Ok(())
}
