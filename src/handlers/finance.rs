use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use common::{FinancialSummary, MonthlySummary};
use model::entities::financial_record::{self, RecordType};
use ops::auth::Operation;
use ops::finance::NewFinancialRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::handlers::auth::ActorRole;
use crate::schemas::{
    ApiResponse, AppState, ErrorResponse, MonthQuery, RecordsQuery, ops_error_response,
};

/// Request body for a manual ledger entry
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateFinancialRecordRequest {
    /// `income` or `expense`
    pub record_type: String,
    /// Strictly positive amount
    pub amount: Decimal,
    /// Ledger category, e.g. "Rent"
    pub category: String,
    /// Free-form description
    pub description: Option<String>,
}

/// Ledger entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FinancialRecordResponse {
    pub id: i32,
    pub record_type: String,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<financial_record::Model> for FinancialRecordResponse {
    fn from(model: financial_record::Model) -> Self {
        Self {
            id: model.id,
            record_type: model.record_type.as_str().to_string(),
            amount: model.amount,
            category: model.category,
            description: model.description,
            recorded_at: model.recorded_at,
        }
    }
}

fn invalid_record_type(raw: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("unknown record type: {raw}"),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Append a manual income or expense entry (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/finance/records",
    tag = "finance",
    request_body = CreateFinancialRecordRequest,
    params(
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 201, description = "Record created successfully", body = ApiResponse<FinancialRecordResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed to manage finance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_financial_record(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Json(request): Json<CreateFinancialRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FinancialRecordResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    let record_type: RecordType = request
        .record_type
        .parse()
        .map_err(|_| invalid_record_type(&request.record_type))?;

    let created = ops::finance::add_record(
        &state.db,
        NewFinancialRecord {
            record_type,
            amount: request.amount,
            category: request.category,
            description: request.description.unwrap_or_default(),
        },
        actor,
    )
    .await
    .map_err(ops_error_response)?;

    info!("ledger entry {} created", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            FinancialRecordResponse::from(created),
            "Record created successfully",
        )),
    ))
}

/// List ledger entries, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/finance/records",
    tag = "finance",
    params(
        ("record_type" = Option<String>, Query, description = "`income` or `expense`; omitted means both"),
        ("limit" = Option<u64>, Query, description = "Maximum rows (default 100)"),
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 200, description = "Records retrieved successfully", body = ApiResponse<Vec<FinancialRecordResponse>>),
        (status = 400, description = "Invalid record type", body = ErrorResponse),
        (status = 403, description = "Role not allowed to view finance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_financial_records(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<ApiResponse<Vec<FinancialRecordResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let record_type = match query.record_type.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<RecordType>().map_err(|_| invalid_record_type(raw))?),
    };

    let records = ops::finance::list_records(&state.db, record_type, query.limit, actor)
        .await
        .map_err(ops_error_response)?;

    let responses: Vec<FinancialRecordResponse> = records
        .into_iter()
        .map(FinancialRecordResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Records retrieved successfully",
    )))
}

/// All-time income, expense and profit totals (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/finance/summary",
    tag = "finance",
    params(
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 200, description = "Summary retrieved successfully", body = ApiResponse<FinancialSummary>),
        (status = 403, description = "Role not allowed to view finance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_financial_summary(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
) -> Result<Json<ApiResponse<FinancialSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let summary = ops::finance::financial_summary(&state.db, actor)
        .await
        .map_err(ops_error_response)?;

    Ok(Json(ApiResponse::new(
        summary,
        "Summary retrieved successfully",
    )))
}

/// Income vs. expense for one calendar month (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/finance/monthly",
    tag = "finance",
    params(
        ("year" = i32, Query, description = "Year, e.g. 2024"),
        ("month" = u32, Query, description = "Month (1-12)"),
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 200, description = "Monthly summary retrieved successfully", body = ApiResponse<MonthlySummary>),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 403, description = "Role not allowed to view finance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<MonthlySummary>>, (StatusCode, Json<ErrorResponse>)> {
    // The monthly rollup itself is an ungated report query; viewing the
    // ledger is what the role gate covers, so it is re-checked here.
    ops::auth::require(actor, Operation::ViewFinance).map_err(ops_error_response)?;

    let summary = ops::reports::monthly_income_expense(&state.db, query.year, query.month)
        .await
        .map_err(ops_error_response)?;

    Ok(Json(ApiResponse::new(
        summary,
        "Monthly summary retrieved successfully",
    )))
}
