//! HTTP surface.
//!
//! Handlers only translate between HTTP and the service layer: they extract
//! path, query and body values, call one [`AppState`] operation and wrap the
//! result. Malformed query strings and bodies are reported through
//! [`AppError::InvalidRequest`] so every error response has the same JSON
//! shape.

use crate::server::error::AppError;
use crate::server::model::{Comment, CommentPatch, NewComment, NewLike, NewPost, Post, PostLike, PostPatch};
use crate::server::service::comment::{CommentView, parse_comment_id};
use crate::server::service::post::{PostView, parse_post_id};
use crate::server::service::{AppState, ListQuery};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use petfeed::{Direction, Page, SequentialId};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;


pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/posts", post(create_post).get(list_posts))
        .route(
            "/posts/{post_id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route(
            "/posts/{post_id}/comments",
            post(create_comment).get(list_comments),
        )
        .route("/posts/{post_id}/likes", post(like_post))
        .route("/posts/{post_id}/likes/{uid}", delete(unlike_post))
        .route(
            "/comments/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
        .route("/users/{uid}/journey", get(journey))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    viewer_id: Option<String>,
    cursor: Option<String>,
    direction: Option<Direction>,
    sort: Option<String>,
    limit: Option<i64>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        Self {
            viewer_id: params.viewer_id,
            cursor: params.cursor,
            direction: params.direction.unwrap_or_default(),
            sort: params.sort,
            limit: params.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ViewerParams {
    viewer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JourneyParams {
    date: String,
    viewer_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

type Created<T> = (StatusCode, Json<T>);

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<Created<Post>, AppError> {
    let post = state.create_post(body(payload)?)?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<PostView, SequentialId>>, AppError> {
    let query = ListQuery::from(params(query)?);
    Ok(Json(state.list_posts(&query)?))
}

async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    query: Result<Query<ViewerParams>, QueryRejection>,
) -> Result<Json<PostView>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let viewer = params(query)?.viewer_id;
    Ok(Json(state.get_post(&post_id, viewer.as_deref())?))
}

async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<PostPatch>, JsonRejection>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    Ok(Json(state.update_post(&post_id, body(payload)?)?))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.delete_post(&parse_post_id(&post_id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<Created<Comment>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let comment = state.create_comment(&post_id, body(payload)?)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<CommentView, u64>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let query = ListQuery::from(params(query)?);
    Ok(Json(state.list_comments(&post_id, &query)?))
}

async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    payload: Result<Json<CommentPatch>, JsonRejection>,
) -> Result<Json<Comment>, AppError> {
    let comment_id = parse_comment_id(&comment_id)?;
    Ok(Json(state.update_comment(comment_id, body(payload)?)?))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.delete_comment(parse_comment_id(&comment_id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<NewLike>, JsonRejection>,
) -> Result<Created<PostLike>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let like = state.like_post(&post_id, body(payload)?)?;
    Ok((StatusCode::CREATED, Json(like)))
}

async fn unlike_post(
    State(state): State<AppState>,
    Path((post_id, uid)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.unlike_post(&parse_post_id(&post_id)?, &uid)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn journey(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    query: Result<Query<JourneyParams>, QueryRejection>,
) -> Result<Json<Vec<Post>>, AppError> {
    let JourneyParams { date, viewer_id } = params(query)?;
    Ok(Json(state.journey(&uid, &date, viewer_id.as_deref())?))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}

fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}
