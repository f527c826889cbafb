//! Read-only report queries over sales, inventory and the ledger.
//!
//! Everything here is side-effect-free and safe to run concurrently with
//! writes; each query sees a consistent snapshot of the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, instrument};

use common::{
    CategoryRevenue, DailySales, DateRange, LOW_STOCK_THRESHOLD, MonthlyRevenue, MonthlySummary,
    ProductRevenue,
};
use model::entities::financial_record::{self, RecordType};
use model::entities::{product, sale};

use crate::error::{OpsError, Result};

/// Products with stock below `threshold` (default
/// [`common::LOW_STOCK_THRESHOLD`]), lowest stock first.
#[instrument(skip(db))]
pub async fn low_stock_products(
    db: &DatabaseConnection,
    threshold: Option<i32>,
) -> Result<Vec<product::Model>> {
    let threshold = threshold.unwrap_or(LOW_STOCK_THRESHOLD);

    Ok(product::Entity::find()
        .filter(product::Column::Stock.lt(threshold))
        .order_by_asc(product::Column::Stock)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?)
}

/// Sale revenue summed per product category within an inclusive date
/// range. Categories without sales in the range are omitted.
#[instrument(skip(db))]
pub async fn revenue_by_category(
    db: &DatabaseConnection,
    range: DateRange,
) -> Result<Vec<CategoryRevenue>> {
    if !range.is_valid() {
        return Err(OpsError::validation("date range start must not be after end"));
    }

    let rows: Vec<(String, Option<Decimal>)> = sale::Entity::find()
        .select_only()
        .column(product::Column::Category)
        .column_as(sale::Column::TotalPrice.sum(), "revenue")
        .inner_join(product::Entity)
        .filter(sale::Column::SaleDate.gte(range.start_datetime()))
        .filter(sale::Column::SaleDate.lt(range.end_exclusive()))
        .group_by(product::Column::Category)
        .order_by_asc(product::Column::Category)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category,
            revenue: revenue.unwrap_or_default(),
        })
        .collect())
}

/// Ledger totals partitioned by record type for one calendar month.
#[instrument(skip(db))]
pub async fn monthly_income_expense(
    db: &DatabaseConnection,
    year: i32,
    month: u32,
) -> Result<MonthlySummary> {
    let month_start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| OpsError::validation(format!("invalid month: {year}-{month}")))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of month is always valid");

    let start = Utc.from_utc_datetime(&month_start.and_hms_opt(0, 0, 0).expect("midnight"));
    let end = Utc.from_utc_datetime(&next_month.and_hms_opt(0, 0, 0).expect("midnight"));

    let income = month_total(db, RecordType::Income, start, end).await?;
    let expense = month_total(db, RecordType::Expense, start, end).await?;

    Ok(MonthlySummary {
        year,
        month,
        income,
        expense,
        net_profit: income - expense,
    })
}

async fn month_total(
    db: &DatabaseConnection,
    kind: RecordType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Decimal> {
    let total: Option<Option<Decimal>> = financial_record::Entity::find()
        .select_only()
        .column_as(financial_record::Column::Amount.sum(), "total")
        .filter(financial_record::Column::RecordType.eq(kind))
        .filter(financial_record::Column::RecordedAt.gte(start))
        .filter(financial_record::Column::RecordedAt.lt(end))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or_default())
}

/// The `n` products with the highest summed sale revenue, descending.
/// Ties are broken by product id ascending, so the ranking is stable.
#[instrument(skip(db))]
pub async fn top_products_by_revenue(
    db: &DatabaseConnection,
    n: u64,
) -> Result<Vec<ProductRevenue>> {
    let rows: Vec<(i32, String, String, Option<i64>, Option<Decimal>)> = sale::Entity::find()
        .select_only()
        .column(product::Column::Id)
        .column(product::Column::Name)
        .column(product::Column::Category)
        .column_as(sale::Column::Quantity.sum(), "quantity_sold")
        .column_as(sale::Column::TotalPrice.sum(), "revenue")
        .inner_join(product::Entity)
        .group_by(product::Column::Id)
        .group_by(product::Column::Name)
        .group_by(product::Column::Category)
        .order_by(sale::Column::TotalPrice.sum(), Order::Desc)
        .order_by(product::Column::Id, Order::Asc)
        .limit(n)
        .into_tuple()
        .all(db)
        .await?;

    debug!("top-products query returned {} rows", rows.len());
    Ok(rows
        .into_iter()
        .map(|(product_id, name, category, quantity_sold, revenue)| ProductRevenue {
            product_id,
            name,
            category,
            quantity_sold: quantity_sold.unwrap_or_default(),
            revenue: revenue.unwrap_or_default(),
        })
        .collect())
}

/// Per-day sale count and revenue over the whole history, date ascending.
/// Grouping happens in Rust; day boundaries are UTC.
#[instrument(skip(db))]
pub async fn sales_trend(db: &DatabaseConnection) -> Result<Vec<DailySales>> {
    let rows: Vec<(DateTime<Utc>, Decimal)> = sale::Entity::find()
        .select_only()
        .column(sale::Column::SaleDate)
        .column(sale::Column::TotalPrice)
        .into_tuple()
        .all(db)
        .await?;

    let mut per_day: BTreeMap<NaiveDate, (i64, Decimal)> = BTreeMap::new();
    for (sale_date, total_price) in rows {
        let entry = per_day.entry(sale_date.date_naive()).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += total_price;
    }

    Ok(per_day
        .into_iter()
        .map(|(date, (count, revenue))| DailySales { date, count, revenue })
        .collect())
}

/// Per-month sale count and revenue over the whole history, oldest first.
#[instrument(skip(db))]
pub async fn monthly_revenue(db: &DatabaseConnection) -> Result<Vec<MonthlyRevenue>> {
    let rows: Vec<(DateTime<Utc>, Decimal)> = sale::Entity::find()
        .select_only()
        .column(sale::Column::SaleDate)
        .column(sale::Column::TotalPrice)
        .into_tuple()
        .all(db)
        .await?;

    let mut per_month: BTreeMap<(i32, u32), (i64, Decimal)> = BTreeMap::new();
    for (sale_date, total_price) in rows {
        let key = (sale_date.year(), sale_date.month());
        let entry = per_month.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += total_price;
    }

    Ok(per_month
        .into_iter()
        .map(|((year, month), (count, revenue))| MonthlyRevenue {
            year,
            month,
            count,
            revenue,
        })
        .collect())
}
