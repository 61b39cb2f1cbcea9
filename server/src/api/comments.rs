//! Comment endpoints, nested under a review of a title.
//!
//! - GET, POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
//! - GET, PATCH, DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
//!
//! The review must belong to the title in the path, otherwise 404.

use super::reviews::load_review;
use crate::auth::{CurrentActor, authorize, authorize_object};
use crate::metrics::record_comment_created;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
};
use yamdb_core::YamdbError;
use yamdb_core::catalog::TitleId;
use yamdb_core::feedback::{Comment, CommentId, CommentInput, Review, ReviewId};
use yamdb_core::pagination::{Page, PageQuery, PageRequest};
use yamdb_core::permissions::Policy;
use yamdb_web::{JsonBody, PathParams, QueryParams, WebResult};

const POLICY: Policy = Policy::AuthorModeratorAdminOrReadOnly;
const OBJECT_POLICY: Policy = Policy::OwnerOrReadOnlyOrOfficial;

async fn parent(state: &AppState, title_id: i64, review_id: i64) -> WebResult<Review> {
    load_review(state, TitleId(title_id), ReviewId(review_id)).await
}

async fn load_comment(state: &AppState, review: &Review, id: i64) -> WebResult<Comment> {
    let id = CommentId(id);
    let comment = state
        .feedback
        .get_comment(review.id, id)
        .await?
        .ok_or_else(|| YamdbError::not_found("comment", id))?;
    Ok(comment)
}

/// `GET /titles/{title_id}/reviews/{review_id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
    QueryParams(query): QueryParams<PageQuery>,
) -> WebResult<Json<Page<Comment>>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = parent(&state, title_id, review_id).await?;
    let page = PageRequest::from_query(query, state.pagination.comments);
    Ok(Json(state.feedback.list_comments(review.id, page).await?))
}

/// `POST /titles/{title_id}/reviews/{review_id}/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
    JsonBody(input): JsonBody<CommentInput>,
) -> WebResult<(StatusCode, Json<Comment>)> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let author = caller.principal()?;
    let review = parent(&state, title_id, review_id).await?;

    let comment = input.into_new_comment(review.id, author.id, state.clock.now())?;
    let comment = state.feedback.create_comment(comment).await?;
    record_comment_created();
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /titles/{title_id}/reviews/{review_id}/comments/{id}`
pub async fn get_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, review_id, id)): PathParams<(i64, i64, i64)>,
) -> WebResult<Json<Comment>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = parent(&state, title_id, review_id).await?;
    let comment = load_comment(&state, &review, id).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &comment)?;
    Ok(Json(comment))
}

/// `PATCH /titles/{title_id}/reviews/{review_id}/comments/{id}`
pub async fn update_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, review_id, id)): PathParams<(i64, i64, i64)>,
    JsonBody(input): JsonBody<CommentInput>,
) -> WebResult<Json<Comment>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = parent(&state, title_id, review_id).await?;
    let comment = load_comment(&state, &review, id).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &comment)?;

    let comment = state
        .feedback
        .update_comment(comment.id, input.into_patch()?)
        .await?;
    Ok(Json(comment))
}

/// `DELETE /titles/{title_id}/reviews/{review_id}/comments/{id}`
pub async fn delete_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, review_id, id)): PathParams<(i64, i64, i64)>,
) -> WebResult<StatusCode> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = parent(&state, title_id, review_id).await?;
    let comment = load_comment(&state, &review, id).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &comment)?;

    state.feedback.delete_comment(comment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
