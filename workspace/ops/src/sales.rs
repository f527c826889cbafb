//! Sale recording and sales-history queries.
//!
//! [`record_sale`] is the stock-and-ledger enforcer: it decrements stock
//! and appends the matching income entry in one transaction, so the stock
//! column and the ledger can never drift apart.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use common::{DateRange, SaleWithProduct, SalesSummary};
use model::entities::user::Role;
use model::entities::{financial_record, product, sale};

use crate::auth::{self, Operation};
use crate::error::{OpsError, Result};

/// Input for recording a sale. The total price is always recomputed from
/// the product's current unit price, never taken from the caller.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: i32,
    pub customer_name: String,
    pub quantity: i32,
}

/// Records a sale atomically: stock decrement, sale row and income ledger
/// entry all land together or not at all.
///
/// The decrement is a guarded update (`... SET stock = stock - q WHERE id
/// = ? AND stock >= q`), so two concurrent sales cannot both pass the
/// stock check against the same pre-decrement value. The loser of such a
/// race sees zero affected rows and the transaction rolls back.
#[instrument(skip(db))]
pub async fn record_sale(
    db: &DatabaseConnection,
    new: NewSale,
    actor: Role,
) -> Result<sale::Model> {
    auth::require(actor, Operation::RecordSale)?;

    let customer_name = new.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(OpsError::validation("customer name must not be blank"));
    }
    if new.quantity < 1 {
        return Err(OpsError::validation("quantity must be a positive integer"));
    }

    let txn = db.begin().await?;

    let product = product::Entity::find_by_id(new.product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| OpsError::not_found("product", new.product_id))?;

    if product.stock < new.quantity {
        return Err(OpsError::InsufficientStock {
            product_id: new.product_id,
            requested: new.quantity,
            available: product.stock,
        });
    }

    // Guarded decrement. The `stock >= quantity` predicate is what
    // serializes concurrent sales against the same product row.
    let decrement = product::Entity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(new.quantity),
        )
        .filter(product::Column::Id.eq(new.product_id))
        .filter(product::Column::Stock.gte(new.quantity))
        .exec(&txn)
        .await
        .map_err(OpsError::from_write_err)?;

    if decrement.rows_affected == 0 {
        // A concurrent writer got there first; report what is left now.
        let current = product::Entity::find_by_id(new.product_id).one(&txn).await?;
        return Err(match current {
            Some(p) => OpsError::InsufficientStock {
                product_id: new.product_id,
                requested: new.quantity,
                available: p.stock,
            },
            None => OpsError::not_found("product", new.product_id),
        });
    }

    let now = Utc::now();
    let total_price = product.unit_price * Decimal::from(new.quantity);

    let recorded = sale::ActiveModel {
        product_id: Set(new.product_id),
        customer_name: Set(customer_name.clone()),
        quantity: Set(new.quantity),
        total_price: Set(total_price),
        sale_date: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(OpsError::from_write_err)?;

    financial_record::ActiveModel {
        record_type: Set(financial_record::RecordType::Income),
        amount: Set(total_price),
        category: Set(product.category.clone()),
        description: Set(format!(
            "Sale of {} x {} to {}",
            new.quantity, product.name, customer_name
        )),
        recorded_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(OpsError::from_write_err)?;

    txn.commit().await.map_err(OpsError::from_write_err)?;

    info!(
        "sale {} recorded: {} x product {} for {}",
        recorded.id, new.quantity, new.product_id, total_price
    );
    Ok(recorded)
}

/// All sales of one product, newest first. The reverse of the sale →
/// product reference, expressed as a query.
pub async fn sales_for_product(
    db: &DatabaseConnection,
    product_id: i32,
) -> Result<Vec<sale::Model>> {
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| OpsError::not_found("product", product_id))?;

    Ok(sale::Entity::find()
        .filter(sale::Column::ProductId.eq(product_id))
        .order_by_desc(sale::Column::SaleDate)
        .all(db)
        .await?)
}

#[derive(Debug, FromQueryResult)]
struct SaleProductRow {
    id: i32,
    product_id: i32,
    product_name: String,
    customer_name: String,
    quantity: i32,
    total_price: Decimal,
    sale_date: DateTime<Utc>,
}

/// Sales within an inclusive date range, joined with product names,
/// newest first.
#[instrument(skip(db))]
pub async fn recent_sales(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<SaleWithProduct>> {
    if !range.is_valid() {
        return Err(OpsError::validation("date range start must not be after end"));
    }

    let rows = sale::Entity::find()
        .select_only()
        .columns([
            sale::Column::Id,
            sale::Column::ProductId,
            sale::Column::CustomerName,
            sale::Column::Quantity,
            sale::Column::TotalPrice,
            sale::Column::SaleDate,
        ])
        .column_as(product::Column::Name, "product_name")
        .inner_join(product::Entity)
        .filter(sale::Column::SaleDate.gte(range.start_datetime()))
        .filter(sale::Column::SaleDate.lt(range.end_exclusive()))
        .order_by_desc(sale::Column::SaleDate)
        .into_model::<SaleProductRow>()
        .all(db)
        .await?;

    debug!("{} sales within {:?}", rows.len(), range);
    Ok(rows
        .into_iter()
        .map(|r| SaleWithProduct {
            id: r.id,
            product_id: r.product_id,
            product_name: r.product_name,
            customer_name: r.customer_name,
            quantity: r.quantity,
            total_price: r.total_price,
            sale_date: r.sale_date,
        })
        .collect())
}

async fn count_and_revenue_since(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
) -> Result<(i64, Decimal)> {
    let row: Option<(i64, Option<Decimal>)> = sale::Entity::find()
        .select_only()
        .column_as(sale::Column::Id.count(), "count")
        .column_as(sale::Column::TotalPrice.sum(), "revenue")
        .filter(sale::Column::SaleDate.gte(from))
        .into_tuple()
        .one(db)
        .await?;

    let (count, revenue) = row.unwrap_or((0, None));
    Ok((count, revenue.unwrap_or_default()))
}

/// Today / this-month sale counts and revenue, relative to `now`.
#[instrument(skip(db))]
pub async fn sales_summary(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<SalesSummary> {
    let today = now.date_naive();
    let today_start = Utc.from_utc_datetime(&today.and_hms_opt(0, 0, 0).expect("midnight"));
    let month_start = Utc.from_utc_datetime(
        &today
            .with_day(1)
            .expect("day 1 always exists")
            .and_hms_opt(0, 0, 0)
            .expect("midnight"),
    );

    let (today_count, today_revenue) = count_and_revenue_since(db, today_start).await?;
    let (month_count, month_revenue) = count_and_revenue_since(db, month_start).await?;

    Ok(SalesSummary {
        today_count,
        today_revenue,
        month_count,
        month_revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use crate::products::{self, NewProduct};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_product(db: &DatabaseConnection, price_cents: i64, stock: i32) -> product::Model {
        products::create_product(
            db,
            NewProduct {
                name: "USB cable".to_string(),
                category: "Electronics".to_string(),
                unit_price: Decimal::new(price_cents, 2),
                stock,
            },
            Role::Admin,
        )
        .await
        .unwrap()
    }

    fn sale_of(product_id: i32, customer: &str, quantity: i32) -> NewSale {
        NewSale {
            product_id,
            customer_name: customer.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn sale_decrements_stock_and_appends_income() {
        let db = setup_db().await;
        let product = seed_product(&db, 999, 20).await; // 9.99

        let sale = record_sale(&db, sale_of(product.id, "Alice", 5), Role::Cashier)
            .await
            .unwrap();
        assert_eq!(sale.quantity, 5);
        assert_eq!(sale.total_price, Decimal::new(4995, 2)); // 49.95

        let product = products::get_product(&db, product.id).await.unwrap();
        assert_eq!(product.stock, 15);

        let records = financial_record::Entity::find().all(&db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, financial_record::RecordType::Income);
        assert_eq!(records[0].amount, Decimal::new(4995, 2));
        assert_eq!(records[0].category, "Electronics");
        assert!(records[0].description.contains("USB cable"));
        assert!(records[0].description.contains("Alice"));
    }

    #[tokio::test]
    async fn oversell_fails_and_leaves_no_trace() {
        let db = setup_db().await;
        let product = seed_product(&db, 999, 3).await;

        let err = record_sale(&db, sale_of(product.id, "Bob", 5), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpsError::InsufficientStock {
                requested: 5,
                available: 3,
                ..
            }
        ));

        // Zero mutations observable: stock unchanged, no sale, no ledger entry.
        let product = products::get_product(&db, product.id).await.unwrap();
        assert_eq!(product.stock, 3);
        assert!(sale::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(financial_record::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stock_is_conserved_across_a_sequence_of_sales() {
        let db = setup_db().await;
        let product = seed_product(&db, 1250, 100).await;

        let quantities = [10, 15, 20, 1, 4];
        for (i, qty) in quantities.iter().enumerate() {
            record_sale(&db, sale_of(product.id, &format!("Customer {i}"), *qty), Role::Cashier)
                .await
                .unwrap();
        }

        let sold: i32 = quantities.iter().sum();
        let product = products::get_product(&db, product.id).await.unwrap();
        assert_eq!(product.stock, 100 - sold);

        // Ledger consistency: income from sales equals the sum of totals.
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
    async fn selling_down_to_zero_then_one_more_fails() {
        let db = setup_db().await;
        let product = seed_product(&db, 500, 8).await;

        record_sale(&db, sale_of(product.id, "Alice", 8), Role::Cashier)
            .await
            .unwrap();
        let product_after = products::get_product(&db, product.id).await.unwrap();
        assert_eq!(product_after.stock, 0);

        let err = record_sale(&db, sale_of(product.id, "Bob", 1), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::InsufficientStock { available: 0, .. }));
    }

    #[tokio::test]
    async fn manager_cannot_record_sales() {
        let db = setup_db().await;
        let product = seed_product(&db, 999, 20).await;

        let err = record_sale(&db, sale_of(product.id, "Alice", 1), Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized { .. }));

        // Authorization is checked before any mutation.
        let product = products::get_product(&db, product.id).await.unwrap();
        assert_eq!(product.stock, 20);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_any_write() {
        let db = setup_db().await;
        let product = seed_product(&db, 999, 20).await;

        let err = record_sale(&db, sale_of(product.id, "  ", 1), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));

        let err = record_sale(&db, sale_of(product.id, "Alice", 0), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));

        let err = record_sale(&db, sale_of(9999, "Alice", 1), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::NotFound { .. }));

        assert!(sale::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_sales_joins_product_names_and_respects_the_range() {
        let db = setup_db().await;
        let product = seed_product(&db, 999, 50).await;
        record_sale(&db, sale_of(product.id, "Alice", 2), Role::Cashier)
            .await
            .unwrap();
        record_sale(&db, sale_of(product.id, "Bob", 3), Role::Admin)
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let rows = recent_sales(&db, DateRange::new(today, today)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.product_name == "USB cable"));

        // A range that ends before today sees nothing.
        let last_year = NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).unwrap();
        let rows = recent_sales(&db, DateRange::new(last_year, last_year)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn sales_summary_counts_today_and_month() {
        let db = setup_db().await;
        let product = seed_product(&db, 1000, 50).await;
        record_sale(&db, sale_of(product.id, "Alice", 2), Role::Cashier)
            .await
            .unwrap();
        record_sale(&db, sale_of(product.id, "Bob", 1), Role::Cashier)
            .await
            .unwrap();

        let summary = sales_summary(&db, Utc::now()).await.unwrap();
        assert_eq!(summary.today_count, 2);
        assert_eq!(summary.today_revenue, Decimal::new(3000, 2));
        assert_eq!(summary.month_count, 2);
        assert_eq!(summary.month_revenue, Decimal::new(3000, 2));
    }
}
