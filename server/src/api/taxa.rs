//! Categories and genres.
//!
//! - GET /api/v1/categories, /api/v1/genres - List by name, `?search=` on name
//! - POST /api/v1/categories, /api/v1/genres - Create (admin)
//! - DELETE /api/v1/categories/{slug}, /api/v1/genres/{slug} - Delete (admin)
//!
//! Both resources share one implementation parameterised by [`Taxonomy`].

use super::SearchQuery;
use crate::auth::{CurrentActor, authorize};
use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
};
use yamdb_core::catalog::{Taxon, TaxonInput, Taxonomy};
use yamdb_core::pagination::Page;
use yamdb_core::permissions::{Actor, Policy};
use yamdb_web::{JsonBody, PathParams, QueryParams, WebResult};

const POLICY: Policy = Policy::AdminOrReadOnly;

const fn page_size(state: &AppState, taxonomy: Taxonomy) -> u32 {
    match taxonomy {
        Taxonomy::Category => state.pagination.categories,
        Taxonomy::Genre => state.pagination.genres,
    }
}

async fn list(
    state: &AppState,
    taxonomy: Taxonomy,
    method: &Method,
    actor: &Actor,
    query: &SearchQuery,
) -> WebResult<Json<Page<Taxon>>> {
    authorize(state, POLICY, method, actor)?;
    let page = state
        .catalog
        .list_taxa(
            taxonomy,
            query.search(),
            query.page_request(page_size(state, taxonomy)),
        )
        .await?;
    Ok(Json(page))
}

async fn create(
    state: &AppState,
    taxonomy: Taxonomy,
    method: &Method,
    actor: &Actor,
    input: TaxonInput,
) -> WebResult<(StatusCode, Json<Taxon>)> {
    authorize(state, POLICY, method, actor)?;
    let taxon = state.catalog.create_taxon(taxonomy, input.validate()?).await?;
    tracing::info!(resource = taxonomy.resource(), slug = %taxon.slug, "Created");
    Ok((StatusCode::CREATED, Json(taxon)))
}

async fn delete(
    state: &AppState,
    taxonomy: Taxonomy,
    method: &Method,
    actor: &Actor,
    slug: String,
) -> WebResult<StatusCode> {
    authorize(state, POLICY, method, actor)?;
    state.catalog.delete_taxon(taxonomy, slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

/// `GET /categories`
pub async fn list_categories(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    QueryParams(query): QueryParams<SearchQuery>,
) -> WebResult<Json<Page<Taxon>>> {
    list(&state, Taxonomy::Category, &method, &caller.actor, &query).await
}

/// `POST /categories`
pub async fn create_category(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    JsonBody(input): JsonBody<TaxonInput>,
) -> WebResult<(StatusCode, Json<Taxon>)> {
    create(&state, Taxonomy::Category, &method, &caller.actor, input).await
}

/// `DELETE /categories/{slug}`
pub async fn delete_category(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(slug): PathParams<String>,
) -> WebResult<StatusCode> {
    delete(&state, Taxonomy::Category, &method, &caller.actor, slug).await
}

// ============================================================================
// Genres
// ============================================================================

/// `GET /genres`
pub async fn list_genres(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    QueryParams(query): QueryParams<SearchQuery>,
) -> WebResult<Json<Page<Taxon>>> {
    list(&state, Taxonomy::Genre, &method, &caller.actor, &query).await
}

/// `POST /genres`
pub async fn create_genre(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    JsonBody(input): JsonBody<TaxonInput>,
) -> WebResult<(StatusCode, Json<Taxon>)> {
    create(&state, Taxonomy::Genre, &method, &caller.actor, input).await
}

/// `DELETE /genres/{slug}`
pub async fn delete_genre(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(slug): PathParams<String>,
) -> WebResult<StatusCode> {
    delete(&state, Taxonomy::Genre, &method, &caller.actor, slug).await
}
