use axum::{Form, Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{LoginForm, RegisterRequest, Token},
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserPublic,
    response::ApiResponse,
    services::{
        auth_service::{login_user, register_user},
        user_service::read_me,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login/test-token", post(test_token))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<UserPublic>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid payload")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserPublic>>)> {
    let resp = register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token", body = Token),
        (status = 400, description = "Incorrect email or password, or inactive user")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<Token>> {
    let token = login_user(&state, form).await?;
    Ok(Json(token))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/test-token",
    responses(
        (status = 200, description = "Token owner", body = ApiResponse<UserPublic>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn test_token(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    let resp = read_me(&state, &user).await?;
    Ok(Json(resp))
}
