//! Sample-data seeding for demos and local development.
//!
//! The entry points bulk-insert rows and are meant for repeated seeding
//! into an empty store; they make no deduplication guarantee. Sample
//! variety comes from fixed arrays and index arithmetic so a seeded
//! database is reproducible.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument};

use model::entities::user::Role;
use model::entities::{financial_record, product, sale, user};

use crate::auth::hash_password;
use crate::error::Result;

/// Product categories used by the sample data.
pub const CATEGORIES: [&str; 6] = ["Electronics", "Clothing", "Food", "Tools", "Books", "Sports"];

/// Expense categories used by the sample data.
pub const EXPENSE_CATEGORIES: [&str; 6] =
    ["Rent", "Utilities", "Salaries", "Marketing", "Supplies", "Maintenance"];

const PRODUCT_NAMES: [&str; 12] = [
    "Wireless mouse",
    "Mechanical keyboard",
    "Cotton t-shirt",
    "Rain jacket",
    "Ground coffee",
    "Olive oil",
    "Cordless drill",
    "Socket wrench set",
    "Paperback novel",
    "Cookbook",
    "Yoga mat",
    "Tennis racket",
];

const CUSTOMER_NAMES: [&str; 8] = [
    "Alice Martin",
    "Bob Keller",
    "Carol Nguyen",
    "Dan Oliveira",
    "Eva Schmidt",
    "Frank Moreau",
    "Grace Ito",
    "Hugo Lindqvist",
];

/// Default user set: one admin, two managers, three cashiers plus a few
/// named accounts.
const USERS: [(&str, &str, Role); 10] = [
    ("admin", "admin123", Role::Admin),
    ("manager1", "manager123", Role::Manager),
    ("manager2", "manager123", Role::Manager),
    ("cashier1", "cashier123", Role::Cashier),
    ("cashier2", "cashier123", Role::Cashier),
    ("cashier3", "cashier123", Role::Cashier),
    ("john_doe", "password123", Role::Manager),
    ("jane_smith", "password123", Role::Cashier),
    ("bob_wilson", "password123", Role::Cashier),
    ("alice_johnson", "password123", Role::Manager),
];

/// Row counts produced by [`seed_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
    pub sales: usize,
    pub income_records: usize,
    pub expense_records: usize,
}

/// Inserts the default user set.
#[instrument(skip(db))]
pub async fn seed_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    let now = Utc::now();
    let mut users = Vec::with_capacity(USERS.len());

    for (username, password, role) in USERS {
        let created = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)),
            role: Set(role),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        users.push(created);
    }

    info!("seeded {} users", users.len());
    Ok(users)
}

/// Inserts `count` sample products with varied prices and stock levels.
#[instrument(skip(db))]
pub async fn seed_products(db: &DatabaseConnection, count: usize) -> Result<Vec<product::Model>> {
    let now = Utc::now();
    let mut products = Vec::with_capacity(count);

    for i in 0..count {
        let name = if count <= PRODUCT_NAMES.len() {
            PRODUCT_NAMES[i % PRODUCT_NAMES.len()].to_string()
        } else {
            format!(
                "{} #{}",
                PRODUCT_NAMES[i % PRODUCT_NAMES.len()],
                i / PRODUCT_NAMES.len() + 1
            )
        };
        // 5.00 .. 999.99, spread deterministically
        let unit_price = Decimal::new(500 + (i as i64 * 731) % 99_500, 2);
        let stock = ((i * 53) % 501) as i32;

        let created = product::ActiveModel {
            name: Set(name),
            category: Set(CATEGORIES[i % CATEGORIES.len()].to_string()),
            unit_price: Set(unit_price),
            stock: Set(stock),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        products.push(created);
    }

    info!("seeded {} products", products.len());
    Ok(products)
}

/// Inserts `count` sales spread over the last year, each paired with its
/// income ledger entry. Products short on stock are restocked first so the
/// stock column never goes negative; every decrement is mirrored by an
/// income entry, keeping the ledger consistent with the sales table.
#[instrument(skip(db, products))]
pub async fn seed_sales(
    db: &DatabaseConnection,
    products: &[product::Model],
    count: usize,
) -> Result<(usize, usize)> {
    if products.is_empty() {
        return Ok((0, 0));
    }

    let now = Utc::now();
    let mut sales = 0;
    let mut income_records = 0;

    for i in 0..count {
        let picked = &products[i % products.len()];
        let quantity = ((i * 13) % 10 + 1) as i32;
        let sale_date = now - Duration::days(((i * 17) % 365) as i64);

        // Reload the row: earlier iterations may have sold from it.
        let current = product::Entity::find_by_id(picked.id)
            .one(db)
            .await?
            .ok_or_else(|| crate::error::OpsError::not_found("product", picked.id))?;

        let stock = if current.stock < quantity {
            // Restock so the sample sale can go through.
            let restocked = current.stock + 150;
            let mut active: product::ActiveModel = current.clone().into();
            active.stock = Set(restocked);
            active.update(db).await?;
            restocked
        } else {
            current.stock
        };

        let total_price = current.unit_price * Decimal::from(quantity);

        sale::ActiveModel {
            product_id: Set(current.id),
            customer_name: Set(CUSTOMER_NAMES[i % CUSTOMER_NAMES.len()].to_string()),
            quantity: Set(quantity),
            total_price: Set(total_price),
            sale_date: Set(sale_date),
            ..Default::default()
        }
        .insert(db)
        .await?;
        sales += 1;

        let mut active: product::ActiveModel = current.clone().into();
        active.stock = Set(stock - quantity);
        active.update(db).await?;

        financial_record::ActiveModel {
            record_type: Set(financial_record::RecordType::Income),
            amount: Set(total_price),
            category: Set(current.category.clone()),
            description: Set(format!("Sale of {} x {}", quantity, current.name)),
            recorded_at: Set(sale_date),
            ..Default::default()
        }
        .insert(db)
        .await?;
        income_records += 1;
    }

    info!("seeded {} sales with {} income records", sales, income_records);
    Ok((sales, income_records))
}

/// Inserts `count` expense ledger entries spread over the last year.
#[instrument(skip(db))]
pub async fn seed_expenses(db: &DatabaseConnection, count: usize) -> Result<usize> {
    let now = Utc::now();

    for i in 0..count {
        let category = EXPENSE_CATEGORIES[i % EXPENSE_CATEGORIES.len()];
        // 100.00 .. 5099.99
        let amount = Decimal::new(10_000 + (i as i64 * 997) % 500_000, 2);
        let recorded_at = now - Duration::days(((i * 29) % 365) as i64);

        financial_record::ActiveModel {
            record_type: Set(financial_record::RecordType::Expense),
            amount: Set(amount),
            category: Set(category.to_string()),
            description: Set(format!("{category} payment")),
            recorded_at: Set(recorded_at),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    info!("seeded {} expense records", count);
    Ok(count)
}

/// Seeds users, products, a year of sales and a set of expenses.
#[instrument(skip(db))]
pub async fn seed_all(db: &DatabaseConnection) -> Result<SeedSummary> {
    let users = seed_users(db).await?;
    let products = seed_products(db, 100).await?;
    let (sales, income_records) = seed_sales(db, &products, 500).await?;
    let expense_records = seed_expenses(db, 50).await?;

    Ok(SeedSummary {
        users: users.len(),
        products: products.len(),
        sales,
        income_records,
        expense_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, EntityTrait};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn seed_all_reports_accurate_counts() {
        let db = setup_db().await;
        let summary = seed_all(&db).await.unwrap();

        assert_eq!(summary.users, 10);
        assert_eq!(summary.products, 100);
        assert_eq!(summary.sales, 500);
        assert_eq!(summary.income_records, 500);
        assert_eq!(summary.expense_records, 50);

        assert_eq!(user::Entity::find().all(&db).await.unwrap().len(), 10);
        assert_eq!(product::Entity::find().all(&db).await.unwrap().len(), 100);
        assert_eq!(sale::Entity::find().all(&db).await.unwrap().len(), 500);
        assert_eq!(
            financial_record::Entity::find().all(&db).await.unwrap().len(),
            550
        );
    }

    #[tokio::test]
    async fn seeded_ledger_matches_seeded_sales() {
        let db = setup_db().await;
        seed_all(&db).await.unwrap();

        let sales = sale::Entity::find().all(&db).await.unwrap();
        let sale_total: Decimal = sales.iter().map(|s| s.total_price).sum();

        let records = financial_record::Entity::find().all(&db).await.unwrap();
        let income_total: Decimal = records
            .iter()
            .filter(|r| r.record_type == financial_record::RecordType::Income)
            .map(|r| r.amount)
            .sum();

        assert_eq!(sale_total, income_total);
    }

    #[tokio::test]
    async fn seeding_never_drives_stock_negative() {
        let db = setup_db().await;
        seed_all(&db).await.unwrap();

        let products = product::Entity::find().all(&db).await.unwrap();
        assert!(products.iter().all(|p| p.stock >= 0));
    }
}
