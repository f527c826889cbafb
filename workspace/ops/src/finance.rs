//! Manual ledger entries and ledger-wide summaries.
//!
//! Sale-derived income entries are written by [`crate::sales::record_sale`];
//! everything here covers the manual side (expenses, corrections) and the
//! admin-facing views of the ledger.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{info, instrument};

use common::FinancialSummary;
use model::entities::financial_record::{self, RecordType};
use model::entities::user::Role;

use crate::auth::{self, Operation};
use crate::error::{OpsError, Result};

/// Input for a manual ledger entry.
#[derive(Debug, Clone)]
pub struct NewFinancialRecord {
    pub record_type: RecordType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
}

/// Default cap on ledger listings.
pub const DEFAULT_RECORD_LIMIT: u64 = 100;

/// Appends a manual income or expense entry. Admin only.
#[instrument(skip(db))]
pub async fn add_record(
    db: &DatabaseConnection,
    new: NewFinancialRecord,
    actor: Role,
) -> Result<financial_record::Model> {
    auth::require(actor, Operation::ManageFinance)?;

    if new.amount <= Decimal::ZERO {
        return Err(OpsError::validation("amount must be positive"));
    }
    let category = new.category.trim();
    if category.is_empty() {
        return Err(OpsError::validation("category must not be blank"));
    }

    let created = financial_record::ActiveModel {
        record_type: Set(new.record_type),
        amount: Set(new.amount),
        category: Set(category.to_string()),
        description: Set(new.description.trim().to_string()),
        recorded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "ledger entry {} added: {} {} ({})",
        created.id, created.record_type, created.amount, created.category
    );
    Ok(created)
}

/// Lists ledger entries, newest first, optionally filtered by type.
/// Viewing the ledger is an admin operation.
#[instrument(skip(db))]
pub async fn list_records(
    db: &DatabaseConnection,
    record_type: Option<RecordType>,
    limit: Option<u64>,
    actor: Role,
) -> Result<Vec<financial_record::Model>> {
    auth::require(actor, Operation::ViewFinance)?;

    let mut query = financial_record::Entity::find();
    if let Some(kind) = record_type {
        query = query.filter(financial_record::Column::RecordType.eq(kind));
    }

    Ok(query
        .order_by_desc(financial_record::Column::RecordedAt)
        .limit(limit.unwrap_or(DEFAULT_RECORD_LIMIT))
        .all(db)
        .await?)
}

async fn total_of(db: &DatabaseConnection, kind: RecordType) -> Result<Decimal> {
    let total: Option<Option<Decimal>> = financial_record::Entity::find()
        .select_only()
        .column_as(financial_record::Column::Amount.sum(), "total")
        .filter(financial_record::Column::RecordType.eq(kind))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or_default())
}

/// All-time income, expense and profit. Admin only.
#[instrument(skip(db))]
pub async fn financial_summary(db: &DatabaseConnection, actor: Role) -> Result<FinancialSummary> {
    auth::require(actor, Operation::ViewFinance)?;

    let income = total_of(db, RecordType::Income).await?;
    let expense = total_of(db, RecordType::Expense).await?;

    Ok(FinancialSummary {
        income,
        expense,
        profit: income - expense,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn expense(cents: i64, category: &str) -> NewFinancialRecord {
        NewFinancialRecord {
            record_type: RecordType::Expense,
            amount: Decimal::new(cents, 2),
            category: category.to_string(),
            description: format!("{category} bill"),
        }
    }

    #[tokio::test]
    async fn summary_partitions_income_and_expense() {
        let db = setup_db().await;

        add_record(
            &db,
            NewFinancialRecord {
                record_type: RecordType::Income,
                amount: Decimal::new(100_000, 2), // 1000.00
                category: "Sales".to_string(),
                description: "manual income".to_string(),
            },
            Role::Admin,
        )
        .await
        .unwrap();
        add_record(&db, expense(20_000, "Rent"), Role::Admin).await.unwrap();
        add_record(&db, expense(15_000, "Utilities"), Role::Admin).await.unwrap();

        let summary = financial_summary(&db, Role::Admin).await.unwrap();
        assert_eq!(summary.income, Decimal::new(100_000, 2));
        assert_eq!(summary.expense, Decimal::new(35_000, 2));
        assert_eq!(summary.profit, Decimal::new(65_000, 2));
    }

    #[tokio::test]
    async fn only_admin_touches_the_ledger() {
        let db = setup_db().await;

        for role in [Role::Manager, Role::Cashier] {
            let err = add_record(&db, expense(1000, "Rent"), role).await.unwrap_err();
            assert!(matches!(err, OpsError::Unauthorized { .. }));

            let err = list_records(&db, None, None, role).await.unwrap_err();
            assert!(matches!(err, OpsError::Unauthorized { .. }));

            let err = financial_summary(&db, role).await.unwrap_err();
            assert!(matches!(err, OpsError::Unauthorized { .. }));
        }
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let db = setup_db().await;

        let err = add_record(&db, expense(0, "Rent"), Role::Admin).await.unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));

        let err = add_record(&db, expense(-500, "Rent"), Role::Admin).await.unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_filters_by_type_and_honors_the_limit() {
        let db = setup_db().await;
        add_record(&db, expense(1000, "Rent"), Role::Admin).await.unwrap();
        add_record(&db, expense(2000, "Utilities"), Role::Admin).await.unwrap();
        add_record(
            &db,
            NewFinancialRecord {
                record_type: RecordType::Income,
                amount: Decimal::new(5000, 2),
                category: "Sales".to_string(),
                description: "manual income".to_string(),
            },
            Role::Admin,
        )
        .await
        .unwrap();

        let expenses = list_records(&db, Some(RecordType::Expense), None, Role::Admin)
            .await
            .unwrap();
        assert_eq!(expenses.len(), 2);

        let capped = list_records(&db, None, Some(1), Role::Admin).await.unwrap();
        assert_eq!(capped.len(), 1);
    }
}
