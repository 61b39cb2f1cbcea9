//! In-memory implementation of every repository trait.
//!
//! All tables sit behind one mutex, so each operation (uniqueness check
//! included) is atomic. Deletes cascade the same way the PostgreSQL schema
//! does.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use futures::future::ready;
use yamdb_core::catalog::{
    NewTaxon, NewTitle, Taxon, Taxonomy, TitleFilter, TitleId, TitlePatch, TitleView,
    contains_ignore_case,
};
use yamdb_core::error::{FieldErrors, NON_FIELD_ERRORS, Result, YamdbError};
use yamdb_core::feedback::{
    Comment, CommentId, CommentPatch, NewComment, NewReview, Review, ReviewId, ReviewPatch,
};
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::rating::average_score;
use yamdb_core::repository::{
    CatalogRepository, EMAIL_TAKEN, FeedbackRepository, HealthCheck, REVIEW_EXISTS, RepoFuture,
    SLUG_TAKEN, TITLE_NAME_TAKEN, USERNAME_TAKEN, UserRepository, unknown_slug,
};
use yamdb_core::user::{NewUser, User, UserId, UserPatch};

#[derive(Debug, Clone)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: Option<String>,
    category: Option<i64>,
    genres: BTreeSet<i64>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Taxon>,
    genres: BTreeMap<i64, Taxon>,
    titles: BTreeMap<i64, TitleRow>,
    reviews: BTreeMap<i64, Review>,
    comments: BTreeMap<i64, Comment>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_of(&self, id: UserId) -> String {
        self.users
            .get(&id.0)
            .map(|user| user.username.clone())
            .unwrap_or_default()
    }

    // ── users ──────────────────────────────────────────────────

    fn check_user_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<UserId>,
    ) -> Result<()> {
        let mut errors = FieldErrors::new();
        let others = self.users.values().filter(|u| Some(u.id) != except);
        for user in others {
            if username == Some(user.username.as_str()) {
                errors.push("username", USERNAME_TAKEN);
            }
            if email == Some(user.email.as_str()) {
                errors.push("email", EMAIL_TAKEN);
            }
        }
        errors.into_result()
    }

    fn create_user(&mut self, new: NewUser) -> Result<User> {
        self.check_user_unique(Some(&new.username), Some(&new.email), None)?;
        let id = self.next_id();
        let user = User {
            id: UserId(id),
            username: new.username,
            email: new.email,
            bio: new.bio,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            is_superuser: new.is_superuser,
            confirmation_code: None,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<User> {
        if !self.users.contains_key(&id.0) {
            return Err(YamdbError::not_found("user", id));
        }
        self.check_user_unique(patch.username.as_deref(), patch.email.as_deref(), Some(id))?;
        let user = self
            .users
            .get_mut(&id.0)
            .ok_or_else(|| YamdbError::not_found("user", id))?;
        patch.apply(user);
        Ok(user.clone())
    }

    fn delete_user(&mut self, id: UserId) -> Result<()> {
        if self.users.remove(&id.0).is_none() {
            return Err(YamdbError::not_found("user", id));
        }
        let reviews: Vec<i64> = self
            .reviews
            .values()
            .filter(|r| r.author_id == id)
            .map(|r| r.id.0)
            .collect();
        for review in reviews {
            self.remove_review(review);
        }
        self.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }

    // ── catalog ────────────────────────────────────────────────

    const fn taxa(&self, taxonomy: Taxonomy) -> &BTreeMap<i64, Taxon> {
        match taxonomy {
            Taxonomy::Category => &self.categories,
            Taxonomy::Genre => &self.genres,
        }
    }

    const fn taxa_mut(&mut self, taxonomy: Taxonomy) -> &mut BTreeMap<i64, Taxon> {
        match taxonomy {
            Taxonomy::Category => &mut self.categories,
            Taxonomy::Genre => &mut self.genres,
        }
    }

    fn taxon_by_slug(&self, taxonomy: Taxonomy, slug: &str) -> Option<&Taxon> {
        self.taxa(taxonomy).values().find(|t| t.slug == slug)
    }

    fn create_taxon(&mut self, taxonomy: Taxonomy, new: NewTaxon) -> Result<Taxon> {
        if self.taxon_by_slug(taxonomy, &new.slug).is_some() {
            return Err(YamdbError::field("slug", SLUG_TAKEN));
        }
        let id = self.next_id();
        let taxon = Taxon {
            id,
            name: new.name,
            slug: new.slug,
        };
        self.taxa_mut(taxonomy).insert(id, taxon.clone());
        Ok(taxon)
    }

    fn delete_taxon(&mut self, taxonomy: Taxonomy, slug: &str) -> Result<()> {
        let id = self
            .taxon_by_slug(taxonomy, slug)
            .map(|t| t.id)
            .ok_or_else(|| YamdbError::not_found(taxonomy.resource(), slug))?;
        self.taxa_mut(taxonomy).remove(&id);
        for title in self.titles.values_mut() {
            match taxonomy {
                Taxonomy::Category => {
                    if title.category == Some(id) {
                        title.category = None;
                    }
                }
                Taxonomy::Genre => {
                    title.genres.remove(&id);
                }
            }
        }
        Ok(())
    }

    fn resolve_genres(&self, slugs: &[String], errors: &mut FieldErrors) -> BTreeSet<i64> {
        slugs
            .iter()
            .filter_map(|slug| {
                let found = self.taxon_by_slug(Taxonomy::Genre, slug).map(|g| g.id);
                if found.is_none() {
                    errors.push("genre", unknown_slug(slug));
                }
                found
            })
            .collect()
    }

    fn resolve_category(&self, slug: Option<&str>, errors: &mut FieldErrors) -> Option<i64> {
        let slug = slug?;
        let found = self.taxon_by_slug(Taxonomy::Category, slug).map(|c| c.id);
        if found.is_none() {
            errors.push("category", unknown_slug(slug));
        }
        found
    }

    fn check_title_name(&self, name: &str, except: Option<i64>, errors: &mut FieldErrors) {
        if self
            .titles
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
        {
            errors.push("name", TITLE_NAME_TAKEN);
        }
    }

    fn title_view(&self, row: &TitleRow) -> TitleView {
        let mut genres: Vec<Taxon> = row
            .genres
            .iter()
            .filter_map(|id| self.genres.get(id).cloned())
            .collect();
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));
        TitleView {
            id: TitleId(row.id),
            name: row.name.clone(),
            year: row.year,
            rating: average_score(
                self.reviews
                    .values()
                    .filter(|r| r.title_id.0 == row.id)
                    .map(|r| r.score),
            ),
            genres,
            category: row.category.and_then(|id| self.categories.get(&id).cloned()),
            description: row.description.clone(),
        }
    }

    fn create_title(&mut self, new: NewTitle) -> Result<TitleView> {
        let mut errors = FieldErrors::new();
        self.check_title_name(&new.name, None, &mut errors);
        let genres = self.resolve_genres(&new.genres, &mut errors);
        let category = self.resolve_category(new.category.as_deref(), &mut errors);
        errors.into_result()?;

        let id = self.next_id();
        let row = TitleRow {
            id,
            name: new.name,
            year: new.year,
            description: new.description,
            category,
            genres,
        };
        let view = self.title_view(&row);
        self.titles.insert(id, row);
        Ok(view)
    }

    fn update_title(&mut self, id: TitleId, patch: TitlePatch) -> Result<TitleView> {
        let mut row = self
            .titles
            .get(&id.0)
            .cloned()
            .ok_or_else(|| YamdbError::not_found("title", id))?;

        let mut errors = FieldErrors::new();
        if let Some(name) = patch.name {
            self.check_title_name(&name, Some(id.0), &mut errors);
            row.name = name;
        }
        if let Some(genres) = &patch.genres {
            row.genres = self.resolve_genres(genres, &mut errors);
        }
        if let Some(category) = &patch.category {
            row.category = self.resolve_category(category.as_deref(), &mut errors);
        }
        errors.into_result()?;

        if let Some(year) = patch.year {
            row.year = year;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        let view = self.title_view(&row);
        self.titles.insert(id.0, row);
        Ok(view)
    }

    fn delete_title(&mut self, id: TitleId) -> Result<()> {
        if self.titles.remove(&id.0).is_none() {
            return Err(YamdbError::not_found("title", id));
        }
        let reviews: Vec<i64> = self
            .reviews
            .values()
            .filter(|r| r.title_id == id)
            .map(|r| r.id.0)
            .collect();
        for review in reviews {
            self.remove_review(review);
        }
        Ok(())
    }

    // ── feedback ───────────────────────────────────────────────

    fn review_view(&self, review: &Review) -> Review {
        Review {
            author: self.username_of(review.author_id),
            ..review.clone()
        }
    }

    fn comment_view(&self, comment: &Comment) -> Comment {
        Comment {
            author: self.username_of(comment.author_id),
            ..comment.clone()
        }
    }

    fn create_review(&mut self, new: NewReview) -> Result<Review> {
        if !self.titles.contains_key(&new.title_id.0) {
            return Err(YamdbError::not_found("title", new.title_id));
        }
        if self
            .reviews
            .values()
            .any(|r| r.title_id == new.title_id && r.author_id == new.author_id)
        {
            return Err(YamdbError::field(NON_FIELD_ERRORS, REVIEW_EXISTS));
        }
        let id = self.next_id();
        let review = Review {
            id: ReviewId(id),
            title_id: new.title_id,
            author_id: new.author_id,
            author: self.username_of(new.author_id),
            text: new.text,
            score: new.score,
            pub_date: new.pub_date,
        };
        self.reviews.insert(id, review.clone());
        Ok(review)
    }

    fn update_review(&mut self, id: ReviewId, patch: ReviewPatch) -> Result<Review> {
        let review = self
            .reviews
            .get_mut(&id.0)
            .ok_or_else(|| YamdbError::not_found("review", id))?;
        if let Some(text) = patch.text {
            review.text = text;
        }
        if let Some(score) = patch.score {
            review.score = score;
        }
        let review = review.clone();
        Ok(self.review_view(&review))
    }

    fn remove_review(&mut self, id: i64) -> bool {
        let removed = self.reviews.remove(&id).is_some();
        self.comments.retain(|_, c| c.review_id.0 != id);
        removed
    }

    fn create_comment(&mut self, new: NewComment) -> Result<Comment> {
        if !self.reviews.contains_key(&new.review_id.0) {
            return Err(YamdbError::not_found("review", new.review_id));
        }
        let id = self.next_id();
        let comment = Comment {
            id: CommentId(id),
            review_id: new.review_id,
            author_id: new.author_id,
            author: self.username_of(new.author_id),
            text: new.text,
            pub_date: new.pub_date,
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    fn update_comment(&mut self, id: CommentId, patch: CommentPatch) -> Result<Comment> {
        let comment = self
            .comments
            .get_mut(&id.0)
            .ok_or_else(|| YamdbError::not_found("comment", id))?;
        if let Some(text) = patch.text {
            comment.text = text;
        }
        let comment = comment.clone();
        Ok(self.comment_view(&comment))
    }
}

/// Thread-safe in-memory store.
///
/// Cloning shares the underlying tables.
///
/// # Example
///
/// ```
/// use yamdb_core::repository::UserRepository;
/// use yamdb_core::user::NewUser;
/// use yamdb_testing::InMemoryStore;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryStore::new();
/// let user = store.create_user(NewUser::signup("reader", "reader@yamdb.fake")).await?;
/// assert_eq!(store.find_user_by_username("reader".into()).await?, Some(user));
/// # Ok::<_, yamdb_core::YamdbError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| YamdbError::Internal("in-memory store lock poisoned".to_string()))?;
        f(&mut *tables)
    }

    fn run<T: Send + 'static>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> RepoFuture<'_, T> {
        Box::pin(ready(self.with(f)))
    }
}

impl UserRepository for InMemoryStore {
    fn create_user(&self, user: NewUser) -> RepoFuture<'_, User> {
        self.run(|t| t.create_user(user))
    }

    fn get_user(&self, id: UserId) -> RepoFuture<'_, Option<User>> {
        self.run(|t| Ok(t.users.get(&id.0).cloned()))
    }

    fn find_user_by_username(&self, username: String) -> RepoFuture<'_, Option<User>> {
        self.run(move |t| Ok(t.users.values().find(|u| u.username == username).cloned()))
    }

    fn find_user_by_email(&self, email: String) -> RepoFuture<'_, Option<User>> {
        self.run(move |t| Ok(t.users.values().find(|u| u.email == email).cloned()))
    }

    fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<User>> {
        self.run(move |t| {
            let users: Vec<User> = t
                .users
                .values()
                .rev()
                .filter(|u| {
                    search
                        .as_deref()
                        .is_none_or(|s| contains_ignore_case(&u.username, s))
                })
                .cloned()
                .collect();
            Page::from_vec(page, users)
        })
    }

    fn update_user(&self, id: UserId, patch: UserPatch) -> RepoFuture<'_, User> {
        self.run(move |t| t.update_user(id, patch))
    }

    fn delete_user(&self, id: UserId) -> RepoFuture<'_, ()> {
        self.run(move |t| t.delete_user(id))
    }

    fn set_confirmation_code(&self, id: UserId, code: Option<String>) -> RepoFuture<'_, ()> {
        self.run(move |t| {
            let user = t
                .users
                .get_mut(&id.0)
                .ok_or_else(|| YamdbError::not_found("user", id))?;
            user.confirmation_code = code;
            Ok(())
        })
    }
}

impl CatalogRepository for InMemoryStore {
    fn create_taxon(&self, taxonomy: Taxonomy, taxon: NewTaxon) -> RepoFuture<'_, Taxon> {
        self.run(move |t| t.create_taxon(taxonomy, taxon))
    }

    fn list_taxa(
        &self,
        taxonomy: Taxonomy,
        search: Option<String>,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<Taxon>> {
        self.run(move |t| {
            let mut taxa: Vec<Taxon> = t
                .taxa(taxonomy)
                .values()
                .filter(|x| {
                    search
                        .as_deref()
                        .is_none_or(|s| contains_ignore_case(&x.name, s))
                })
                .cloned()
                .collect();
            taxa.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Page::from_vec(page, taxa)
        })
    }

    fn delete_taxon(&self, taxonomy: Taxonomy, slug: String) -> RepoFuture<'_, ()> {
        self.run(move |t| t.delete_taxon(taxonomy, &slug))
    }

    fn create_title(&self, title: NewTitle) -> RepoFuture<'_, TitleView> {
        self.run(move |t| t.create_title(title))
    }

    fn get_title(&self, id: TitleId) -> RepoFuture<'_, Option<TitleView>> {
        self.run(move |t| Ok(t.titles.get(&id.0).map(|row| t.title_view(row))))
    }

    fn title_exists(&self, id: TitleId) -> RepoFuture<'_, bool> {
        self.run(move |t| Ok(t.titles.contains_key(&id.0)))
    }

    fn list_titles(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<TitleView>> {
        self.run(move |t| {
            let titles: Vec<TitleView> = t
                .titles
                .values()
                .map(|row| t.title_view(row))
                .filter(|view| filter.matches(view))
                .collect();
            Page::from_vec(page, titles)
        })
    }

    fn update_title(&self, id: TitleId, patch: TitlePatch) -> RepoFuture<'_, TitleView> {
        self.run(move |t| t.update_title(id, patch))
    }

    fn delete_title(&self, id: TitleId) -> RepoFuture<'_, ()> {
        self.run(move |t| t.delete_title(id))
    }
}

impl FeedbackRepository for InMemoryStore {
    fn create_review(&self, review: NewReview) -> RepoFuture<'_, Review> {
        self.run(move |t| t.create_review(review))
    }

    fn get_review(&self, title: TitleId, id: ReviewId) -> RepoFuture<'_, Option<Review>> {
        self.run(move |t| {
            Ok(t.reviews
                .get(&id.0)
                .filter(|r| r.title_id == title)
                .map(|r| t.review_view(r)))
        })
    }

    fn list_reviews(&self, title: TitleId, page: PageRequest) -> RepoFuture<'_, Page<Review>> {
        self.run(move |t| {
            let reviews: Vec<Review> = t
                .reviews
                .values()
                .filter(|r| r.title_id == title)
                .map(|r| t.review_view(r))
                .collect();
            Page::from_vec(page, reviews)
        })
    }

    fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepoFuture<'_, Review> {
        self.run(move |t| t.update_review(id, patch))
    }

    fn delete_review(&self, id: ReviewId) -> RepoFuture<'_, ()> {
        self.run(move |t| {
            if t.remove_review(id.0) {
                Ok(())
            } else {
                Err(YamdbError::not_found("review", id))
            }
        })
    }

    fn create_comment(&self, comment: NewComment) -> RepoFuture<'_, Comment> {
        self.run(move |t| t.create_comment(comment))
    }

    fn get_comment(&self, review: ReviewId, id: CommentId) -> RepoFuture<'_, Option<Comment>> {
        self.run(move |t| {
            Ok(t.comments
                .get(&id.0)
                .filter(|c| c.review_id == review)
                .map(|c| t.comment_view(c)))
        })
    }

    fn list_comments(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<Comment>> {
        self.run(move |t| {
            let comments: Vec<Comment> = t
                .comments
                .values()
                .filter(|c| c.review_id == review)
                .map(|c| t.comment_view(c))
                .collect();
            Page::from_vec(page, comments)
        })
    }

    fn update_comment(&self, id: CommentId, patch: CommentPatch) -> RepoFuture<'_, Comment> {
        self.run(move |t| t.update_comment(id, patch))
    }

    fn delete_comment(&self, id: CommentId) -> RepoFuture<'_, ()> {
        self.run(move |t| {
            t.comments
                .remove(&id.0)
                .map(|_| ())
                .ok_or_else(|| YamdbError::not_found("comment", id))
        })
    }
}

impl HealthCheck for InMemoryStore {
    fn ping(&self) -> RepoFuture<'_, ()> {
        Box::pin(ready(Ok(())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::test_clock;
    use yamdb_core::environment::Clock;

    async fn seed_title(store: &InMemoryStore) -> TitleView {
        store
            .create_taxon(
                Taxonomy::Genre,
                NewTaxon {
                    name: "Drama".to_string(),
                    slug: "drama".to_string(),
                },
            )
            .await
            .unwrap();
        store
            .create_title(NewTitle {
                name: "Solaris".to_string(),
                year: 1972,
                description: None,
                genres: vec!["drama".to_string()],
                category: None,
            })
            .await
            .unwrap()
    }

    fn review(title: TitleId, author: UserId, score: i32) -> NewReview {
        NewReview {
            title_id: title,
            author_id: author,
            text: "text".to_string(),
            score,
            pub_date: test_clock().now(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_both_reported() {
        let store = InMemoryStore::new();
        store
            .create_user(NewUser::signup("reader", "reader@yamdb.fake"))
            .await
            .unwrap();
        let other = store
            .create_user(NewUser::signup("writer", "writer@yamdb.fake"))
            .await
            .unwrap();
        let err = store
            .create_user(NewUser::signup("reader", "writer@yamdb.fake"))
            .await
            .unwrap_err();
        let YamdbError::Validation(errors) = err else {
            unreachable!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));

        // Updating a user to its own values is not a conflict.
        let patch = UserPatch {
            username: Some("writer".to_string()),
            ..UserPatch::default()
        };
        assert!(store.update_user(other.id, patch).await.is_ok());
    }

    #[tokio::test]
    async fn users_list_newest_first() {
        let store = InMemoryStore::new();
        for name in ["a1", "a2", "b3"] {
            store
                .create_user(NewUser::signup(name, format!("{name}@yamdb.fake")))
                .await
                .unwrap();
        }
        let page = store
            .list_users(Some("A".to_string()), PageRequest::new(1, 4))
            .await
            .unwrap();
        let names: Vec<_> = page.results.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["a2", "a1"]);
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn rating_is_rounded_mean() {
        let store = InMemoryStore::new();
        let title = seed_title(&store).await;
        assert_eq!(title.rating, None);
        for (i, score) in [7, 8].into_iter().enumerate() {
            let user = store
                .create_user(NewUser::signup(format!("u{i}"), format!("u{i}@yamdb.fake")))
                .await
                .unwrap();
            store.create_review(review(title.id, user.id, score)).await.unwrap();
        }
        let title = store.get_title(title.id).await.unwrap().unwrap();
        assert_eq!(title.rating, Some(8));
    }

    #[tokio::test]
    async fn second_review_by_same_author_is_rejected() {
        let store = InMemoryStore::new();
        let title = seed_title(&store).await;
        let user = store
            .create_user(NewUser::signup("critic", "critic@yamdb.fake"))
            .await
            .unwrap();
        store.create_review(review(title.id, user.id, 5)).await.unwrap();
        let err = store
            .create_review(review(title.id, user.id, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, YamdbError::Validation(ref e) if e.contains(NON_FIELD_ERRORS)));
        let page = store
            .list_reviews(title.id, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.count, 1);
    }

    #[tokio::test]
    async fn deletes_cascade() {
        let store = InMemoryStore::new();
        let title = seed_title(&store).await;
        let user = store
            .create_user(NewUser::signup("critic", "critic@yamdb.fake"))
            .await
            .unwrap();
        let review = store.create_review(review(title.id, user.id, 5)).await.unwrap();
        let comment = store
            .create_comment(NewComment {
                review_id: review.id,
                author_id: user.id,
                text: "agreed".to_string(),
                pub_date: test_clock().now(),
            })
            .await
            .unwrap();

        store.delete_title(title.id).await.unwrap();
        assert_eq!(store.get_review(title.id, review.id).await.unwrap(), None);
        assert_eq!(store.get_comment(review.id, comment.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_category_detaches_titles() {
        let store = InMemoryStore::new();
        store
            .create_taxon(
                Taxonomy::Category,
                NewTaxon {
                    name: "Films".to_string(),
                    slug: "movie".to_string(),
                },
            )
            .await
            .unwrap();
        let title = store
            .create_title(NewTitle {
                name: "Stalker".to_string(),
                year: 1979,
                description: None,
                genres: Vec::new(),
                category: Some("movie".to_string()),
            })
            .await
            .unwrap();
        assert!(title.category.is_some());

        store
            .delete_taxon(Taxonomy::Category, "movie".to_string())
            .await
            .unwrap();
        let title = store.get_title(title.id).await.unwrap().unwrap();
        assert_eq!(title.category, None);
    }

    #[tokio::test]
    async fn unknown_slugs_are_field_errors() {
        let store = InMemoryStore::new();
        let err = store
            .create_title(NewTitle {
                name: "Mirror".to_string(),
                year: 1975,
                description: None,
                genres: vec!["nope".to_string()],
                category: Some("nada".to_string()),
            })
            .await
            .unwrap_err();
        let YamdbError::Validation(errors) = err else {
            unreachable!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("genre"));
        assert!(errors.contains("category"));
    }

    #[tokio::test]
    async fn review_author_follows_username_changes() {
        let store = InMemoryStore::new();
        let title = seed_title(&store).await;
        let user = store
            .create_user(NewUser::signup("critic", "critic@yamdb.fake"))
            .await
            .unwrap();
        let created = store.create_review(review(title.id, user.id, 5)).await.unwrap();
        store
            .update_user(
                user.id,
                UserPatch {
                    username: Some("critic2".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        let loaded = store.get_review(title.id, created.id).await.unwrap().unwrap();
        assert_eq!(loaded.author, "critic2");
    }
}
