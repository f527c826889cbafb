use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{product, sale};
use ops::products::{NewProduct, ProductFilter, ProductUpdate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::handlers::auth::ActorRole;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ProductListQuery, ops_error_response};

/// Request body for creating a new product
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProductRequest {
    /// Product name
    pub name: String,
    /// Product category, e.g. "Electronics"
    pub category: String,
    /// Unit price; must not be negative
    pub unit_price: Decimal,
    /// Initial stock; must not be negative
    pub stock: i32,
}

/// Request body for updating a product
#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    pub stock: Option<i32>,
}

/// Product response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub unit_price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            unit_price: model.unit_price,
            stock: model.stock,
            created_at: model.created_at,
        }
    }
}

/// Sale rows of one product (see `get_product_sales`)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSaleResponse {
    pub id: i32,
    pub customer_name: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: DateTime<Utc>,
}

impl From<sale::Model> for ProductSaleResponse {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            customer_name: model.customer_name,
            quantity: model.quantity,
            total_price: model.total_price,
            sale_date: model.sale_date,
        }
    }
}

/// Add a product to inventory (admin or manager)
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    params(
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed to add products", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("creating product '{}' as {}", request.name, actor);

    let created = ops::products::create_product(
        &state.db,
        NewProduct {
            name: request.name,
            category: request.category,
            unit_price: request.unit_price,
            stock: request.stock,
        },
        actor,
    )
    .await
    .map_err(ops_error_response)?;

    info!("product {} created", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProductResponse::from(created),
            "Product created successfully",
        )),
    ))
}

/// List products with optional search and category filters
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(
        ("search" = Option<String>, Query, description = "Substring match against name or category"),
        ("category" = Option<String>, Query, description = "Exact category filter"),
    ),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let products = ops::products::list_products(
        &state.db,
        ProductFilter {
            search: query.search,
            category: query.category,
        },
    )
    .await
    .map_err(ops_error_response)?;

    let responses: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Products retrieved successfully",
    )))
}

/// List distinct product categories
#[utoipa::path(
    get,
    path = "/api/v1/products/categories",
    tag = "products",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<String>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, (StatusCode, Json<ErrorResponse>)> {
    let categories = ops::products::categories(&state.db)
        .await
        .map_err(ops_error_response)?;
    Ok(Json(ApiResponse::new(
        categories,
        "Categories retrieved successfully",
    )))
}

/// Get a specific product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let found = ops::products::get_product(&state.db, product_id)
        .await
        .map_err(ops_error_response)?;
    Ok(Json(ApiResponse::new(
        ProductResponse::from(found),
        "Product retrieved successfully",
    )))
}

/// Edit a product (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Role not allowed to edit products", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let updated = ops::products::update_product(
        &state.db,
        product_id,
        ProductUpdate {
            name: request.name,
            category: request.category,
            unit_price: request.unit_price,
            stock: request.stock,
        },
        actor,
    )
    .await
    .map_err(ops_error_response)?;

    info!("product {} updated", updated.id);
    Ok(Json(ApiResponse::new(
        ProductResponse::from(updated),
        "Product updated successfully",
    )))
}

/// Delete a product (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("x-actor-role" = String, Header, description = "Acting role"),
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Role not allowed to delete products", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    ActorRole(actor): ActorRole,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    ops::products::delete_product(&state.db, product_id, actor)
        .await
        .map_err(ops_error_response)?;

    info!("product {} deleted", product_id);
    Ok(Json(ApiResponse::new(
        product_id.to_string(),
        "Product deleted successfully",
    )))
}

/// List the sales of one product, newest first
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}/sales",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Sales retrieved successfully", body = ApiResponse<Vec<ProductSaleResponse>>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product_sales(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductSaleResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let sales = ops::sales::sales_for_product(&state.db, product_id)
        .await
        .map_err(ops_error_response)?;

    let responses: Vec<ProductSaleResponse> =
        sales.into_iter().map(ProductSaleResponse::from).collect();
    Ok(Json(ApiResponse::new(
        responses,
        "Sales retrieved successfully",
    )))
}
