//! Common transport-layer types shared between the business core and the
//! HTTP layer. These structs mirror the report/query payloads so the API
//! handlers can serialize results without duplicating shapes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock level below which a product is considered low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// An inclusive date range used by report queries.
///
/// Both endpoints are calendar dates; `start_datetime`/`end_exclusive`
/// widen them to the UTC instants covering the whole days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the range is well-formed (`start <= end`).
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// UTC instant at the start of the first day.
    pub fn start_datetime(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_hms_opt(0, 0, 0).expect("midnight is valid"))
    }

    /// UTC instant at the start of the day after the last day.
    /// Filtering with `>= start_datetime()` and `< end_exclusive()` makes
    /// the range inclusive on both calendar days.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        let next = self.end.succ_opt().unwrap_or(self.end);
        Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0).expect("midnight is valid"))
    }
}

// ===================== Report rows =====================

/// Summed sale revenue for one product category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Decimal,
}

/// A product ranked by its total sale revenue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProductRevenue {
    pub product_id: i32,
    pub name: String,
    pub category: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Income vs. expense totals for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    /// `income - expense`.
    pub net_profit: Decimal,
}

/// All-time income, expense and profit totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FinancialSummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub profit: Decimal,
}

/// Sale count and revenue for a single day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub count: i64,
    pub revenue: Decimal,
}

/// Sale count and revenue for a single calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub count: i64,
    pub revenue: Decimal,
}

/// A sale joined with the name of the product sold.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SaleWithProduct {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub customer_name: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: DateTime<Utc>,
}

/// Today / this-month sale KPIs shown on the sales dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SalesSummary {
    pub today_count: i64,
    pub today_revenue: Decimal,
    pub month_count: i64,
    pub month_revenue: Decimal,
}
