use crate::handlers::{
    auth::login,
    finance::{
        create_financial_record, get_financial_records, get_financial_summary, get_monthly_summary,
    },
    health::health_check,
    products::{
        create_product, delete_product, get_product, get_product_categories, get_product_sales,
        get_products, update_product,
    },
    reports::{
        get_low_stock, get_monthly_revenue, get_revenue_by_category, get_sales_trend,
        get_top_products,
    },
    sales::{create_sale, get_sales, get_sales_summary},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/v1/auth/login", post(login))
        // Product CRUD routes
        .route("/api/v1/products", post(create_product))
        .route("/api/v1/products", get(get_products))
        .route("/api/v1/products/categories", get(get_product_categories))
        .route("/api/v1/products/:product_id", get(get_product))
        .route("/api/v1/products/:product_id", put(update_product))
        .route("/api/v1/products/:product_id", delete(delete_product))
        .route("/api/v1/products/:product_id/sales", get(get_product_sales))
        // Sales routes
        .route("/api/v1/sales", post(create_sale))
        .route("/api/v1/sales", get(get_sales))
        .route("/api/v1/sales/summary", get(get_sales_summary))
        // Finance routes
        .route("/api/v1/finance/records", post(create_financial_record))
        .route("/api/v1/finance/records", get(get_financial_records))
        .route("/api/v1/finance/summary", get(get_financial_summary))
        .route("/api/v1/finance/monthly", get(get_monthly_summary))
        // Report routes
        .route("/api/v1/reports/low-stock", get(get_low_stock))
        .route(
            "/api/v1/reports/revenue-by-category",
            get(get_revenue_by_category),
        )
        .route("/api/v1/reports/top-products", get(get_top_products))
        .route("/api/v1/reports/sales-trend", get(get_sales_trend))
        .route("/api/v1/reports/monthly-revenue", get(get_monthly_revenue))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
