use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth::auth_handler, posts::posts_handler},
    AppState, Error,
};

// image data URLs run up to 16M characters; leave headroom for the JSON
// envelope around them
const MAX_BODY_BYTES: usize = 24_000_000;

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/posts", posts_handler())
        .nest("/auth", auth_handler())
        .fallback(api_not_found);

    let static_files = ServeDir::new("public").fallback(ServeFile::new("public/index.html"));

    Router::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}

async fn api_not_found() -> Error {
    Error::NotFound("There is nothing at this address.".to_string())
}
