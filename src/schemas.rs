use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use common::{
    CategoryRevenue, DailySales, FinancialSummary, MonthlyRevenue, MonthlySummary, ProductRevenue,
    SaleWithProduct, SalesSummary,
};
use moka::future::Cache;
use ops::OpsError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::auth::{LoginRequest, LoginResponse};
use crate::handlers::finance::{CreateFinancialRecordRequest, FinancialRecordResponse};
use crate::handlers::products::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::handlers::sales::{CreateSaleRequest, SaleResponse};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for report payloads. Reports may be served slightly stale
    /// but always internally consistent.
    pub cache: Cache<String, CachedData>,
}

/// Cached report payloads
#[derive(Clone, Debug)]
pub enum CachedData {
    CategoryRevenue(Vec<CategoryRevenue>),
    TopProducts(Vec<ProductRevenue>),
    SalesTrend(Vec<DailySales>),
    MonthlyRevenue(Vec<MonthlyRevenue>),
}

/// Query parameters for the product listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductListQuery {
    /// Substring match against product name or category
    pub search: Option<String>,
    /// Exact category filter
    pub category: Option<String>,
}

/// Query parameters for the sales history listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct SalesListQuery {
    /// Start date (YYYY-MM-DD, inclusive); defaults to `days` ago
    pub start_date: Option<NaiveDate>,
    /// End date (YYYY-MM-DD, inclusive); defaults to today
    pub end_date: Option<NaiveDate>,
    /// Lookback window when no explicit range is given (default 30)
    pub days: Option<i64>,
}

/// Query parameters shared by the report endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRangeQuery {
    /// Start date (YYYY-MM-DD, inclusive)
    pub start_date: NaiveDate,
    /// End date (YYYY-MM-DD, inclusive)
    pub end_date: NaiveDate,
    /// `csv` to download the report instead of JSON
    pub format: Option<String>,
}

/// Query parameters for the low-stock report
#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockQuery {
    /// Stock threshold (default 10)
    pub threshold: Option<i32>,
    /// `csv` to download the report instead of JSON
    pub format: Option<String>,
}

/// Query parameters for the top-products report
#[derive(Debug, Deserialize, ToSchema)]
pub struct TopProductsQuery {
    /// How many products to return (default 10)
    pub limit: Option<u64>,
    /// `csv` to download the report instead of JSON
    pub format: Option<String>,
}

/// Query parameters selecting a calendar month
#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthQuery {
    /// Year (e.g. 2024)
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
}

/// Query parameters for trend-style reports
#[derive(Debug, Deserialize, ToSchema)]
pub struct FormatQuery {
    /// `csv` to download the report instead of JSON
    pub format: Option<String>,
}

/// Query parameters for the ledger listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordsQuery {
    /// `income` or `expense`; omitted means both
    pub record_type: Option<String>,
    /// Maximum rows to return (default 100)
    pub limit: Option<u64>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Translates a business error into the HTTP error envelope. Storage
/// detail never crosses this boundary.
pub fn ops_error_response(err: OpsError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        OpsError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string()),
        OpsError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        OpsError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, "INSUFFICIENT_STOCK", err.to_string())
        }
        OpsError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "UNAUTHORIZED", err.to_string()),
        OpsError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        OpsError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORAGE_ERROR",
            "internal storage error".to_string(),
        ),
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::products::create_product,
        crate::handlers::products::get_products,
        crate::handlers::products::get_product_categories,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::get_product_sales,
        crate::handlers::sales::create_sale,
        crate::handlers::sales::get_sales,
        crate::handlers::sales::get_sales_summary,
        crate::handlers::finance::create_financial_record,
        crate::handlers::finance::get_financial_records,
        crate::handlers::finance::get_financial_summary,
        crate::handlers::finance::get_monthly_summary,
        crate::handlers::reports::get_low_stock,
        crate::handlers::reports::get_revenue_by_category,
        crate::handlers::reports::get_top_products,
        crate::handlers::reports::get_sales_trend,
        crate::handlers::reports::get_monthly_revenue,
    ),
    components(
        schemas(
            ApiResponse<LoginResponse>,
            ApiResponse<ProductResponse>,
            ApiResponse<SaleResponse>,
            ApiResponse<FinancialRecordResponse>,
            ApiResponse<MonthlySummary>,
            ApiResponse<FinancialSummary>,
            ApiResponse<SalesSummary>,
            ErrorResponse,
            HealthResponse,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            CreateSaleRequest,
            SaleResponse,
            CreateFinancialRecordRequest,
            FinancialRecordResponse,
            CategoryRevenue,
            ProductRevenue,
            MonthlySummary,
            MonthlyRevenue,
            FinancialSummary,
            DailySales,
            SaleWithProduct,
            SalesSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "products", description = "Inventory management endpoints"),
        (name = "sales", description = "Sale recording and history endpoints"),
        (name = "finance", description = "Financial ledger endpoints"),
        (name = "reports", description = "Reporting and analytics endpoints"),
    ),
    info(
        title = "ErpRust API",
        description = "Retail ERP backend - inventory, sales, finance and reporting",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
