//! Review endpoints.
//!
//! - GET /api/v1/titles/{title_id}/reviews - List a title's reviews
//! - POST /api/v1/titles/{title_id}/reviews - Review a title (authenticated, once per title)
//! - GET /api/v1/titles/{title_id}/reviews/{id} - One review
//! - PATCH /api/v1/titles/{title_id}/reviews/{id} - Edit (author, moderator or admin)
//! - DELETE /api/v1/titles/{title_id}/reviews/{id} - Delete with its comments (author, moderator or admin)

use crate::auth::{CurrentActor, authorize, authorize_object};
use crate::metrics::record_review_created;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
};
use yamdb_core::YamdbError;
use yamdb_core::catalog::TitleId;
use yamdb_core::feedback::{Review, ReviewId, ReviewInput};
use yamdb_core::pagination::{Page, PageQuery, PageRequest};
use yamdb_core::permissions::Policy;
use yamdb_web::{JsonBody, PathParams, QueryParams, WebResult};

const POLICY: Policy = Policy::AuthorModeratorAdminOrReadOnly;
const OBJECT_POLICY: Policy = Policy::OwnerOrReadOnlyOrOfficial;

/// Fail with 404 unless the title exists.
pub(crate) async fn ensure_title(state: &AppState, title: TitleId) -> WebResult<()> {
    if state.catalog.title_exists(title).await? {
        Ok(())
    } else {
        Err(YamdbError::not_found("title", title).into())
    }
}

/// Load a review of `title`, or 404.
pub(crate) async fn load_review(state: &AppState, title: TitleId, id: ReviewId) -> WebResult<Review> {
    let review = state
        .feedback
        .get_review(title, id)
        .await?
        .ok_or_else(|| YamdbError::not_found("review", id))?;
    Ok(review)
}

/// `GET /titles/{title_id}/reviews`
pub async fn list_reviews(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(title_id): PathParams<i64>,
    QueryParams(query): QueryParams<PageQuery>,
) -> WebResult<Json<Page<Review>>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let title = TitleId(title_id);
    ensure_title(&state, title).await?;
    let page = PageRequest::from_query(query, state.pagination.reviews);
    Ok(Json(state.feedback.list_reviews(title, page).await?))
}

/// `POST /titles/{title_id}/reviews`
pub async fn create_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(title_id): PathParams<i64>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> WebResult<(StatusCode, Json<Review>)> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let author = caller.principal()?;
    let title = TitleId(title_id);
    ensure_title(&state, title).await?;

    let review = input.into_new_review(title, author.id, state.clock.now())?;
    let review = state.feedback.create_review(review).await?;
    record_review_created(review.score);
    tracing::info!(
        review_id = review.id.0,
        title_id = title.0,
        author = %review.author,
        "Review created"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /titles/{title_id}/reviews/{id}`
pub async fn get_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, id)): PathParams<(i64, i64)>,
) -> WebResult<Json<Review>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = load_review(&state, TitleId(title_id), ReviewId(id)).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &review)?;
    Ok(Json(review))
}

/// `PATCH /titles/{title_id}/reviews/{id}`
pub async fn update_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, id)): PathParams<(i64, i64)>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> WebResult<Json<Review>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = load_review(&state, TitleId(title_id), ReviewId(id)).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &review)?;

    let review = state
        .feedback
        .update_review(review.id, input.into_patch()?)
        .await?;
    Ok(Json(review))
}

/// `DELETE /titles/{title_id}/reviews/{id}`
pub async fn delete_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams((title_id, id)): PathParams<(i64, i64)>,
) -> WebResult<StatusCode> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let review = load_review(&state, TitleId(title_id), ReviewId(id)).await?;
    authorize_object(&state, OBJECT_POLICY, &method, &caller.actor, &review)?;

    state.feedback.delete_review(review.id).await?;
    tracing::info!(review_id = review.id.0, title_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}
