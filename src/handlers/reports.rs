use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use common::{CategoryRevenue, DailySales, DateRange, MonthlyRevenue, ProductRevenue};
use ops::export::to_csv;
use tracing::{debug, instrument};

use crate::handlers::products::ProductResponse;
use crate::schemas::{
    ApiResponse, AppState, CachedData, ErrorResponse, FormatQuery, LowStockQuery, ReportRangeQuery,
    TopProductsQuery, ops_error_response,
};

fn wants_csv(format: Option<&str>) -> bool {
    matches!(format, Some("csv"))
}

fn csv_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/csv")], body).into_response()
}

fn json_response<T: serde::Serialize>(data: T, message: &str) -> Response {
    Json(ApiResponse::new(data, message)).into_response()
}

/// Products with stock below the threshold, lowest stock first
#[utoipa::path(
    get,
    path = "/api/v1/reports/low-stock",
    tag = "reports",
    params(
        ("threshold" = Option<i32>, Query, description = "Stock threshold (default 10)"),
        ("format" = Option<String>, Query, description = "`csv` for a CSV download"),
    ),
    responses(
        (status = 200, description = "Low-stock products retrieved successfully", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let products = ops::reports::low_stock_products(&state.db, query.threshold)
        .await
        .map_err(ops_error_response)?;

    debug!("{} products below threshold", products.len());
    if wants_csv(query.format.as_deref()) {
        return Ok(csv_response(to_csv(&products)));
    }

    let responses: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(json_response(
        responses,
        "Low-stock products retrieved successfully",
    ))
}

/// Sale revenue per product category within a date range
#[utoipa::path(
    get,
    path = "/api/v1/reports/revenue-by-category",
    tag = "reports",
    params(
        ("start_date" = String, Query, description = "Start date (YYYY-MM-DD, inclusive)"),
        ("end_date" = String, Query, description = "End date (YYYY-MM-DD, inclusive)"),
        ("format" = Option<String>, Query, description = "`csv` for a CSV download"),
    ),
    responses(
        (status = 200, description = "Category revenue retrieved successfully", body = ApiResponse<Vec<CategoryRevenue>>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_revenue_by_category(
    State(state): State<AppState>,
    Query(query): Query<ReportRangeQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let range = DateRange::new(query.start_date, query.end_date);
    let cache_key = format!("revenue_by_category_{}_{}", range.start, range.end);

    let rows = if let Some(CachedData::CategoryRevenue(rows)) = state.cache.get(&cache_key).await {
        rows
    } else {
        let rows = ops::reports::revenue_by_category(&state.db, range)
            .await
            .map_err(ops_error_response)?;
        state
            .cache
            .insert(cache_key, CachedData::CategoryRevenue(rows.clone()))
            .await;
        rows
    };

    if wants_csv(query.format.as_deref()) {
        return Ok(csv_response(to_csv(&rows)));
    }
    Ok(json_response(
        rows,
        "Category revenue retrieved successfully",
    ))
}

/// Top products ranked by total sale revenue
#[utoipa::path(
    get,
    path = "/api/v1/reports/top-products",
    tag = "reports",
    params(
        ("limit" = Option<u64>, Query, description = "How many products (default 10)"),
        ("format" = Option<String>, Query, description = "`csv` for a CSV download"),
    ),
    responses(
        (status = 200, description = "Top products retrieved successfully", body = ApiResponse<Vec<ProductRevenue>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_top_products(
    State(state): State<AppState>,
    Query(query): Query<TopProductsQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let limit = query.limit.unwrap_or(10);
    let cache_key = format!("top_products_{limit}");

    let rows = if let Some(CachedData::TopProducts(rows)) = state.cache.get(&cache_key).await {
        rows
    } else {
        let rows = ops::reports::top_products_by_revenue(&state.db, limit)
            .await
            .map_err(ops_error_response)?;
        state
            .cache
            .insert(cache_key, CachedData::TopProducts(rows.clone()))
            .await;
        rows
    };

    if wants_csv(query.format.as_deref()) {
        return Ok(csv_response(to_csv(&rows)));
    }
    Ok(json_response(rows, "Top products retrieved successfully"))
}

/// Per-day sale count and revenue over the whole history
#[utoipa::path(
    get,
    path = "/api/v1/reports/sales-trend",
    tag = "reports",
    params(
        ("format" = Option<String>, Query, description = "`csv` for a CSV download"),
    ),
    responses(
        (status = 200, description = "Sales trend retrieved successfully", body = ApiResponse<Vec<DailySales>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sales_trend(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = "sales_trend".to_string();

    let rows = if let Some(CachedData::SalesTrend(rows)) = state.cache.get(&cache_key).await {
        rows
    } else {
        let rows = ops::reports::sales_trend(&state.db)
            .await
            .map_err(ops_error_response)?;
        state
            .cache
            .insert(cache_key, CachedData::SalesTrend(rows.clone()))
            .await;
        rows
    };

    if wants_csv(query.format.as_deref()) {
        return Ok(csv_response(to_csv(&rows)));
    }
    Ok(json_response(rows, "Sales trend retrieved successfully"))
}

/// Per-month sale count and revenue over the whole history
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly-revenue",
    tag = "reports",
    params(
        ("format" = Option<String>, Query, description = "`csv` for a CSV download"),
    ),
    responses(
        (status = 200, description = "Monthly revenue retrieved successfully", body = ApiResponse<Vec<MonthlyRevenue>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_monthly_revenue(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let cache_key = "monthly_revenue".to_string();

    let rows = if let Some(CachedData::MonthlyRevenue(rows)) = state.cache.get(&cache_key).await {
        rows
    } else {
        let rows = ops::reports::monthly_revenue(&state.db)
            .await
            .map_err(ops_error_response)?;
        state
            .cache
            .insert(cache_key, CachedData::MonthlyRevenue(rows.clone()))
            .await;
        rows
    };

    if wants_csv(query.format.as_deref()) {
        return Ok(csv_response(to_csv(&rows)));
    }
    Ok(json_response(
        rows,
        "Monthly revenue retrieved successfully",
    ))
}
