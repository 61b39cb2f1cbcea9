//! Storage abstractions.
//!
//! The traits return `Pin<Box<dyn Future>>` instead of using `async fn` so
//! they stay dyn-compatible: the server holds every store as
//! `Arc<dyn ...Repository>` and picks PostgreSQL or the in-memory store at
//! startup.
//!
//! Stores own the uniqueness invariants (usernames, emails, slugs, title
//! names, one review per author and title). A violation surfaces as
//! [`YamdbError::Validation`](crate::YamdbError::Validation) keyed by the
//! offending field, never as a database error.
//!
//! # Implementations
//!
//! - `PostgresStore` (in `yamdb-postgres`): production storage
//! - `InMemoryStore` (in `yamdb-testing`): tests and the `memory` backend

use crate::catalog::{NewTaxon, NewTitle, Taxon, Taxonomy, TitleFilter, TitleId, TitlePatch, TitleView};
use crate::error::Result;
use crate::feedback::{
    Comment, CommentId, CommentPatch, NewComment, NewReview, Review, ReviewId, ReviewPatch,
};
use crate::pagination::{Page, PageRequest};
use crate::user::{NewUser, User, UserId, UserPatch};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by repository methods.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Message for a duplicate username.
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
/// Message for a duplicate email.
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";
/// Message for a duplicate slug.
pub const SLUG_TAKEN: &str = "This slug is already in use.";
/// Message for a duplicate title name.
pub const TITLE_NAME_TAKEN: &str = "A title with that name already exists.";
/// Message for a second review of the same title by the same author.
pub const REVIEW_EXISTS: &str = "You have already reviewed this title.";

/// Message for a slug that matches no category or genre.
#[must_use]
pub fn unknown_slug(slug: &str) -> String {
    format!("Object with slug={slug} does not exist.")
}

/// User accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// Fails with a `username` or `email` field error if either is taken.
    fn create_user(&self, user: NewUser) -> RepoFuture<'_, User>;

    /// Look up a user by id.
    fn get_user(&self, id: UserId) -> RepoFuture<'_, Option<User>>;

    /// Look up a user by exact username.
    fn find_user_by_username(&self, username: String) -> RepoFuture<'_, Option<User>>;

    /// Look up a user by exact email.
    fn find_user_by_email(&self, email: String) -> RepoFuture<'_, Option<User>>;

    /// List users, newest first, optionally filtered by a username substring.
    fn list_users(&self, search: Option<String>, page: PageRequest)
    -> RepoFuture<'_, Page<User>>;

    /// Apply a partial update.
    ///
    /// Fails with `NotFound` for an unknown id and with field errors on
    /// uniqueness conflicts.
    fn update_user(&self, id: UserId, patch: UserPatch) -> RepoFuture<'_, User>;

    /// Delete a user together with their reviews and comments.
    fn delete_user(&self, id: UserId) -> RepoFuture<'_, ()>;

    /// Store or clear the confirmation code.
    fn set_confirmation_code(&self, id: UserId, code: Option<String>) -> RepoFuture<'_, ()>;
}

/// Categories, genres and titles.
pub trait CatalogRepository: Send + Sync {
    /// Insert a category or genre. Fails with a `slug` field error if taken.
    fn create_taxon(&self, taxonomy: Taxonomy, taxon: NewTaxon) -> RepoFuture<'_, Taxon>;

    /// List categories or genres by name, optionally filtered by a name substring.
    fn list_taxa(
        &self,
        taxonomy: Taxonomy,
        search: Option<String>,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<Taxon>>;

    /// Delete a category or genre by slug.
    ///
    /// Titles in a deleted category lose their category; a deleted genre is
    /// removed from every title.
    fn delete_taxon(&self, taxonomy: Taxonomy, slug: String) -> RepoFuture<'_, ()>;

    /// Insert a title. Unknown genre or category slugs are field errors.
    fn create_title(&self, title: NewTitle) -> RepoFuture<'_, TitleView>;

    /// Load a title with genres, category and rating.
    fn get_title(&self, id: TitleId) -> RepoFuture<'_, Option<TitleView>>;

    /// Returns `true` if the title exists.
    fn title_exists(&self, id: TitleId) -> RepoFuture<'_, bool>;

    /// List titles matching `filter`, ordered by id.
    fn list_titles(&self, filter: TitleFilter, page: PageRequest)
    -> RepoFuture<'_, Page<TitleView>>;

    /// Apply a partial update.
    fn update_title(&self, id: TitleId, patch: TitlePatch) -> RepoFuture<'_, TitleView>;

    /// Delete a title together with its reviews and their comments.
    fn delete_title(&self, id: TitleId) -> RepoFuture<'_, ()>;
}

/// Reviews and comments.
pub trait FeedbackRepository: Send + Sync {
    /// Insert a review.
    ///
    /// A second review by the same author for the same title fails with a
    /// `non_field_errors` validation error.
    fn create_review(&self, review: NewReview) -> RepoFuture<'_, Review>;

    /// Load a review of `title`.
    fn get_review(&self, title: TitleId, id: ReviewId) -> RepoFuture<'_, Option<Review>>;

    /// List the reviews of a title, oldest first.
    fn list_reviews(&self, title: TitleId, page: PageRequest) -> RepoFuture<'_, Page<Review>>;

    /// Apply a partial update.
    fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepoFuture<'_, Review>;

    /// Delete a review together with its comments.
    fn delete_review(&self, id: ReviewId) -> RepoFuture<'_, ()>;

    /// Insert a comment.
    fn create_comment(&self, comment: NewComment) -> RepoFuture<'_, Comment>;

    /// Load a comment of `review`.
    fn get_comment(&self, review: ReviewId, id: CommentId) -> RepoFuture<'_, Option<Comment>>;

    /// List the comments of a review, oldest first.
    fn list_comments(&self, review: ReviewId, page: PageRequest)
    -> RepoFuture<'_, Page<Comment>>;

    /// Apply a partial update.
    fn update_comment(&self, id: CommentId, patch: CommentPatch) -> RepoFuture<'_, Comment>;

    /// Delete a comment.
    fn delete_comment(&self, id: CommentId) -> RepoFuture<'_, ()>;
}

/// Liveness probe of the storage backend.
pub trait HealthCheck: Send + Sync {
    /// Succeeds if the backend answers.
    fn ping(&self) -> RepoFuture<'_, ()>;
}
