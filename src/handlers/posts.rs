use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};

use crate::{
    handlers::{method_not_allowed, JsonBody},
    models::{
        posts::{CommentInput, PostInput},
        response::{CommentResponse, LikesResponse, PostResponse, PostsResponse, SuccessResponse},
    },
    AppState, Error, Result,
};

pub fn posts_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(list_posts)
                .post(create_post)
                .fallback(method_not_allowed),
        )
        .route(
            "/{id}",
            get(get_post)
                .put(update_post)
                .delete(delete_post)
                .fallback(method_not_allowed),
        )
        .route("/{id}/like", post(like_post).fallback(method_not_allowed))
        .route(
            "/{id}/comments",
            post(create_comment).fallback(method_not_allowed),
        )
        .route(
            "/{id}/comments/{comment_id}",
            delete(delete_comment).fallback(method_not_allowed),
        )
}

fn require_id(id: &str, message: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::BadRequest(message.to_string()));
    }
    Ok(())
}

async fn list_posts(Extension(app_state): Extension<Arc<AppState>>) -> Result<impl IntoResponse> {
    let posts = app_state.posts_service.list_posts().await?;
    Ok((StatusCode::OK, Json(PostsResponse { posts })))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse> {
    let input = PostInput::sanitize(&body)?;
    let post = app_state.posts_service.create_post(input).await?;
    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}

async fn get_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;

    let post = app_state.posts_service.get_post(&post_id).await?;
    Ok((StatusCode::OK, Json(PostResponse { post })))
}

async fn update_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;

    let input = PostInput::sanitize(&body)?;
    let post = app_state.posts_service.update_post(&post_id, input).await?;
    Ok((StatusCode::OK, Json(PostResponse { post })))
}

async fn delete_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;

    app_state.posts_service.delete_post(&post_id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

async fn like_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;

    let likes = app_state.posts_service.like_post(&post_id).await?;
    Ok((StatusCode::OK, Json(LikesResponse { likes })))
}

async fn create_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;

    let input = CommentInput::sanitize(&body)?;
    let comment = app_state
        .posts_service
        .add_comment(&post_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

async fn delete_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    require_id(&post_id, "The post id is not valid.")?;
    require_id(&comment_id, "The comment id is not valid.")?;

    app_state
        .posts_service
        .delete_comment(&post_id, &comment_id)
        .await?;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}
