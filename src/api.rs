// src/api.rs
// HTTP surface for the UI. Thin by design: every handler delegates to the
// Blog facade and maps the error taxonomy onto status codes — bad cursor
// is the caller's fault (400), a missing post is a normal outcome (404),
// anything upstream is a 500 with the detail kept in the logs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::blog::Blog;
use crate::error::BlogError;
use crate::highlight::decorate_code_blocks;
use crate::toc::extract_headings;
use crate::types::{PostDetail, TocItem};

#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<Blog>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{slug}", get(post_detail))
        .route("/api/tags", get(list_tags))
        .route("/admin/revalidate/{tag}", post(revalidate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct PostsQuery {
    #[serde(rename = "startYearMonth")]
    start_year_month: Option<String>,
}

/// Without a cursor: first page from the current month. With one: the page
/// starting the month before the cursor.
async fn list_posts(State(state): State<AppState>, Query(query): Query<PostsQuery>) -> Response {
    match query.start_year_month {
        Some(cursor) => match state.blog.more_posts(&cursor).await {
            Ok(result) => Json(result).into_response(),
            Err(error @ (BlogError::InvalidCursor(_) | BlogError::MonthOutOfRange(_))) => {
                error_response(StatusCode::BAD_REQUEST, &error.to_string())
            }
            Err(error) => {
                tracing::error!(%error, "failed to fetch posts");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch posts")
            }
        },
        None => Json(state.blog.initial_posts().await).into_response(),
    }
}

#[derive(Serialize)]
struct PostDetailResponse {
    #[serde(flatten)]
    post: PostDetail,
    headings: Vec<TocItem>,
}

async fn post_detail(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.blog.post_by_slug(&slug).await {
        Ok(Some(mut detail)) => {
            detail.content = decorate_code_blocks(&detail.content);
            let headings = extract_headings(&detail.content);
            Json(PostDetailResponse {
                post: detail,
                headings,
            })
            .into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "post not found"),
        Err(error) => {
            tracing::error!(%error, %slug, "failed to fetch post detail");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch post")
        }
    }
}

async fn list_tags(State(state): State<AppState>) -> Response {
    Json(state.blog.tags().await).into_response()
}

/// Drop cached month queries carrying the given invalidation tag.
async fn revalidate(State(state): State<AppState>, Path(tag): Path<String>) -> Response {
    let invalidated = state.blog.invalidate(&tag);
    Json(json!({ "tag": tag, "invalidated": invalidated })).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
