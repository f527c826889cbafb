use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::Json,
};
use model::entities::user::Role;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Header carrying the acting role for mutating requests.
///
/// The role is explicit per-request context, never ambient session state;
/// the business core re-checks it against the authorization table either
/// way, so spoofing the header past the UI gains nothing the role does
/// not already allow.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the acting role of the current request.
#[derive(Debug, Clone, Copy)]
pub struct ActorRole(pub Role);

#[async_trait]
impl<S> FromRequestParts<S> for ActorRole
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|value| value.to_str().ok());

        let Some(raw) = header else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: format!("missing {ACTOR_ROLE_HEADER} header"),
                    code: "MISSING_ROLE".to_string(),
                    success: false,
                }),
            ));
        };

        match raw.parse::<Role>() {
            Ok(role) => Ok(ActorRole(role)),
            Err(_) => {
                warn!("request carried unknown role '{}'", raw);
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: format!("unknown role: {raw}"),
                        code: "INVALID_ROLE".to_string(),
                        success: false,
                    }),
                ))
            }
        }
    }
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Authenticated user data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: i32,
    pub username: String,
    /// `admin`, `manager` or `cashier`
    pub role: String,
}

/// Authenticate a user by username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match ops::auth::login(&state.db, &request.username, &request.password).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::new(
            LoginResponse {
                id: user.id,
                username: user.username,
                role: user.role.as_str().to_string(),
            },
            "Login successful",
        ))),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "invalid username or password".to_string(),
                code: "INVALID_CREDENTIALS".to_string(),
                success: false,
            }),
        )),
        Err(err) => Err(crate::schemas::ops_error_response(err)),
    }
}
