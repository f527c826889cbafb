use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Duration, Utc};
use common::{DateRange, SaleWithProduct, SalesSummary};
use model::entities::sale;
use ops::sales::NewSale;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::handlers::auth::ActorRole;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SalesListQuery, ops_error_response};

/// Request body for recording a sale. The total price is computed
/// server-side from the product's current unit price.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSaleRequest {
    /// Product being sold
    pub product_id: i32,
    /// Customer the sale goes to
    pub customer_name: String,
    /// Units sold; must be positive and not exceed current stock
    pub quantity: i32,
}

/// Sale response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaleResponse {
    pub id: i32,
    pub product_id: i32,
    pub customer_name: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: DateTime<Utc>,
}

impl From<sale::Model> for SaleResponse {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            customer_name: model.customer_name,
            quantity: model.quantity,
            total_price: model.total_price,
            sale_date: model.sale_date,
        }
    }
}

/// Record a sale (admin or cashier)
///
/// Decrements product stock and appends the matching income ledger entry
/// atomically; on any failure nothing is written.
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    tag = "sales",
    request_body = CreateSaleRequest,
    params(
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 201, description = "Sale recorded successfully", body = ApiResponse<SaleResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed to record sales", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sale(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SaleResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!(
        "recording sale of {} x product {} as {}",
        request.quantity, request.product_id, actor
    );

    let recorded = ops::sales::record_sale(
        &state.db,
        NewSale {
            product_id: request.product_id,
            customer_name: request.customer_name,
            quantity: request.quantity,
        },
        actor,
    )
    .await
    .map_err(ops_error_response)?;

    info!("sale {} recorded for {}", recorded.id, recorded.total_price);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            SaleResponse::from(recorded),
            "Sale recorded successfully",
        )),
    ))
}

/// List sales within a date range, joined with product names
///
/// Defaults to the last 30 days when no explicit range is given.
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    tag = "sales",
    params(
        ("start_date" = Option<String>, Query, description = "Start date (YYYY-MM-DD, inclusive)"),
        ("end_date" = Option<String>, Query, description = "End date (YYYY-MM-DD, inclusive)"),
        ("days" = Option<i64>, Query, description = "Lookback window when no range is given (default 30)"),
    ),
    responses(
        (status = 200, description = "Sales retrieved successfully", body = ApiResponse<Vec<SaleWithProduct>>),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesListQuery>,
) -> Result<Json<ApiResponse<Vec<SaleWithProduct>>>, (StatusCode, Json<ErrorResponse>)> {
    let today = Utc::now().date_naive();
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => {
            let days = query.days.unwrap_or(30).max(0);
            DateRange::new(today - Duration::days(days), today)
        }
    };

    let sales = ops::sales::recent_sales(&state.db, range)
        .await
        .map_err(ops_error_response)?;

    Ok(Json(ApiResponse::new(
        sales,
        "Sales retrieved successfully",
    )))
}

/// Today / this-month sale KPIs
#[utoipa::path(
    get,
    path = "/api/v1/sales/summary",
    tag = "sales",
    responses(
        (status = 200, description = "Sales summary retrieved successfully", body = ApiResponse<SalesSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sales_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SalesSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let summary = ops::sales::sales_summary(&state.db, Utc::now())
        .await
        .map_err(ops_error_response)?;

    Ok(Json(ApiResponse::new(
        summary,
        "Sales summary retrieved successfully",
    )))
}
