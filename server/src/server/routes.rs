//! Router configuration for YaMDb.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, metrics_handler, readiness_check};
use super::state::AppState;
use crate::api::{comments, reviews, taxa, titles, users};
use crate::auth::handlers;
use axum::{
    Router,
    routing::{delete, get, post},
};
use yamdb_web::with_request_tracing;

/// Prefix of every REST endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Build the complete Axum router.
///
/// Configures:
/// - Health, readiness and Prometheus endpoints at the root
/// - Signup and token exchange under `/api/v1/auth`
/// - Users, categories, genres, titles, reviews and comments under `/api/v1`
/// - Request ids and tracing spans on every request
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Registration
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/token", post(handlers::obtain_token))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::get_me).patch(users::update_me))
        .route(
            "/users/:username",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Categories and genres
        .route(
            "/categories",
            get(taxa::list_categories).post(taxa::create_category),
        )
        .route("/categories/:slug", delete(taxa::delete_category))
        .route("/genres", get(taxa::list_genres).post(taxa::create_genre))
        .route("/genres/:slug", delete(taxa::delete_genre))
        // Titles
        .route("/titles", get(titles::list_titles).post(titles::create_title))
        .route(
            "/titles/:id",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        // Reviews
        .route(
            "/titles/:title_id/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/titles/:title_id/reviews/:id",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        // Comments
        .route(
            "/titles/:title_id/reviews/:review_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments/:id",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        );

    let router = Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest(API_PREFIX, api_routes)
        .with_state(state);

    with_request_tracing(router)
}
