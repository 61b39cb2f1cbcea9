//! Title endpoints.
//!
//! - GET /api/v1/titles - List titles; filters `category`, `genre` (slugs),
//!   `name` (substring) and `year`
//! - POST /api/v1/titles - Create a title (admin)
//! - GET /api/v1/titles/{id} - Title with rating, genres and category
//! - PATCH /api/v1/titles/{id} - Partial update (admin)
//! - DELETE /api/v1/titles/{id} - Delete with its reviews and comments (admin)
//!
//! Writes take genre and category slugs and answer with the read shape.

use crate::auth::{CurrentActor, authorize};
use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
};
use serde::Deserialize;
use yamdb_core::YamdbError;
use yamdb_core::catalog::{TitleFilter, TitleId, TitleInput, TitleView};
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::permissions::Policy;
use yamdb_web::{JsonBody, PathParams, QueryParams, WebResult};

const POLICY: Policy = Policy::AdminOrReadOnly;

/// Query parameters for listing titles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTitlesQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
    /// Name substring
    pub name: Option<String>,
    /// Release year
    pub year: Option<i32>,
}

impl ListTitlesQuery {
    fn into_parts(self, page_size: u32) -> (TitleFilter, PageRequest) {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        (
            TitleFilter {
                category: non_empty(self.category),
                genre: non_empty(self.genre),
                name: non_empty(self.name),
                year: self.year,
            },
            PageRequest::new(self.page.unwrap_or(1), page_size),
        )
    }
}

/// `GET /titles`
pub async fn list_titles(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    QueryParams(query): QueryParams<ListTitlesQuery>,
) -> WebResult<Json<Page<TitleView>>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let (filter, page) = query.into_parts(state.pagination.titles);
    Ok(Json(state.catalog.list_titles(filter, page).await?))
}

/// `POST /titles`
pub async fn create_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    JsonBody(input): JsonBody<TitleInput>,
) -> WebResult<(StatusCode, Json<TitleView>)> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let title = state.catalog.create_title(input.into_new_title()?).await?;
    tracing::info!(title_id = title.id.0, name = %title.name, "Title created");
    Ok((StatusCode::CREATED, Json(title)))
}

/// `GET /titles/{id}`
pub async fn get_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(id): PathParams<i64>,
) -> WebResult<Json<TitleView>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let id = TitleId(id);
    let title = state
        .catalog
        .get_title(id)
        .await?
        .ok_or_else(|| YamdbError::not_found("title", id))?;
    Ok(Json(title))
}

/// `PATCH /titles/{id}`
pub async fn update_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(id): PathParams<i64>,
    JsonBody(input): JsonBody<TitleInput>,
) -> WebResult<Json<TitleView>> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    let id = TitleId(id);
    if !state.catalog.title_exists(id).await? {
        return Err(YamdbError::not_found("title", id).into());
    }
    let title = state.catalog.update_title(id, input.into_patch()?).await?;
    Ok(Json(title))
}

/// `DELETE /titles/{id}`
pub async fn delete_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(id): PathParams<i64>,
) -> WebResult<StatusCode> {
    authorize(&state, POLICY, &method, &caller.actor)?;
    state.catalog.delete_title(TitleId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
