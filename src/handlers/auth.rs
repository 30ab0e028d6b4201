use std::sync::Arc;

use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::{
    handlers::{method_not_allowed, JsonBody},
    models::users::LoginUserDto,
    AppState, Result,
};

pub fn auth_handler() -> Router {
    Router::new().route("/login", post(login).fallback(method_not_allowed))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse> {
    let mut credentials: LoginUserDto = serde_json::from_value(body).unwrap_or_default();
    credentials.email = credentials.email.trim().to_string();
    credentials.validate()?;

    let outcome = app_state
        .auth_service
        .login(&credentials.email, &credentials.password)
        .await;

    Ok(Json(outcome))
}

pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
