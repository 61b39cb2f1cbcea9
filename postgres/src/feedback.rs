//! `reviews` and `comments`.

use crate::error::StoreResult;
use crate::{PostgresStore, bind_i64, row_count, run};
use sqlx::Row;
use sqlx::postgres::PgRow;
use yamdb_core::YamdbError;
use yamdb_core::catalog::TitleId;
use yamdb_core::feedback::{
    Comment, CommentId, CommentPatch, NewComment, NewReview, Review, ReviewId, ReviewPatch,
};
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::repository::{FeedbackRepository, RepoFuture};
use yamdb_core::user::UserId;

// The CTE `r` is an insert, an update or the table itself; the author's
// username is joined in at read time.
const REVIEW_SELECT: &str = r"
    SELECT r.id, r.title_id, r.author_id, u.username AS author, r.text, r.score, r.pub_date
    FROM r JOIN users u ON u.id = r.author_id
";

const COMMENT_SELECT: &str = r"
    SELECT c.id, c.review_id, c.author_id, u.username AS author, c.text, c.pub_date
    FROM c JOIN users u ON u.id = c.author_id
";

fn review_from_row(row: &PgRow) -> StoreResult<Review> {
    Ok(Review {
        id: ReviewId(row.try_get("id")?),
        title_id: TitleId(row.try_get("title_id")?),
        author_id: UserId(row.try_get("author_id")?),
        author: row.try_get("author")?,
        text: row.try_get("text")?,
        score: row.try_get("score")?,
        pub_date: row.try_get("pub_date")?,
    })
}

fn comment_from_row(row: &PgRow) -> StoreResult<Comment> {
    Ok(Comment {
        id: CommentId(row.try_get("id")?),
        review_id: ReviewId(row.try_get("review_id")?),
        author_id: UserId(row.try_get("author_id")?),
        author: row.try_get("author")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
    })
}

impl PostgresStore {
    async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        if !self.has_parent("titles", review.title_id.0).await? {
            return Err(YamdbError::not_found("title", review.title_id).into());
        }
        let row = sqlx::query(&format!(
            r"
            WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score, pub_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            {REVIEW_SELECT}
            "
        ))
        .bind(review.title_id.0)
        .bind(review.author_id.0)
        .bind(&review.text)
        .bind(review.score)
        .bind(review.pub_date)
        .fetch_one(&self.pool)
        .await?;

        let review = review_from_row(&row)?;
        tracing::info!(review_id = review.id.0, title_id = review.title_id.0, "Review created");
        Ok(review)
    }

    async fn fetch_review(&self, title: TitleId, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query(&format!(
            "WITH r AS (SELECT * FROM reviews WHERE id = $1 AND title_id = $2) {REVIEW_SELECT}"
        ))
        .bind(id.0)
        .bind(title.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(review_from_row).transpose()
    }

    async fn select_reviews(&self, title: TitleId, page: PageRequest) -> StoreResult<Page<Review>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title.0)
            .fetch_one(&self.pool)
            .await?;
        let count = row_count(count);
        page.check(count)?;

        let rows = sqlx::query(&format!(
            r"
            WITH r AS (
                SELECT * FROM reviews WHERE title_id = $1 ORDER BY id LIMIT $2 OFFSET $3
            )
            {REVIEW_SELECT} ORDER BY r.id
            "
        ))
        .bind(title.0)
        .bind(bind_i64(page.limit()))
        .bind(bind_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let reviews = rows.iter().map(review_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(Page::new(page, count, reviews))
    }

    async fn patch_review(&self, id: ReviewId, patch: ReviewPatch) -> StoreResult<Review> {
        let row = sqlx::query(&format!(
            r"
            WITH r AS (
                UPDATE reviews SET text = COALESCE($2, text), score = COALESCE($3, score)
                WHERE id = $1
                RETURNING *
            )
            {REVIEW_SELECT}
            "
        ))
        .bind(id.0)
        .bind(patch.text)
        .bind(patch.score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| YamdbError::not_found("review", id))?;
        review_from_row(&row)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        if !self.has_parent("reviews", comment.review_id.0).await? {
            return Err(YamdbError::not_found("review", comment.review_id).into());
        }
        let row = sqlx::query(&format!(
            r"
            WITH c AS (
                INSERT INTO comments (review_id, author_id, text, pub_date)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {COMMENT_SELECT}
            "
        ))
        .bind(comment.review_id.0)
        .bind(comment.author_id.0)
        .bind(&comment.text)
        .bind(comment.pub_date)
        .fetch_one(&self.pool)
        .await?;
        comment_from_row(&row)
    }

    async fn fetch_comment(&self, review: ReviewId, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "WITH c AS (SELECT * FROM comments WHERE id = $1 AND review_id = $2) {COMMENT_SELECT}"
        ))
        .bind(id.0)
        .bind(review.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn select_comments(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> StoreResult<Page<Comment>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review.0)
            .fetch_one(&self.pool)
            .await?;
        let count = row_count(count);
        page.check(count)?;

        let rows = sqlx::query(&format!(
            r"
            WITH c AS (
                SELECT * FROM comments WHERE review_id = $1 ORDER BY id LIMIT $2 OFFSET $3
            )
            {COMMENT_SELECT} ORDER BY c.id
            "
        ))
        .bind(review.0)
        .bind(bind_i64(page.limit()))
        .bind(bind_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.iter().map(comment_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(Page::new(page, count, comments))
    }

    async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> StoreResult<Comment> {
        let row = sqlx::query(&format!(
            r"
            WITH c AS (
                UPDATE comments SET text = COALESCE($2, text) WHERE id = $1 RETURNING *
            )
            {COMMENT_SELECT}
            "
        ))
        .bind(id.0)
        .bind(patch.text)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| YamdbError::not_found("comment", id))?;
        comment_from_row(&row)
    }

    async fn remove(&self, table: &'static str, resource: &'static str, id: i64) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(YamdbError::not_found(resource, id).into());
        }
        tracing::info!(resource, id, "Deleted");
        Ok(())
    }

    async fn has_parent(&self, table: &'static str, id: i64) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar(&format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

impl FeedbackRepository for PostgresStore {
    fn create_review(&self, review: NewReview) -> RepoFuture<'_, Review> {
        run(self.insert_review(review))
    }

    fn get_review(&self, title: TitleId, id: ReviewId) -> RepoFuture<'_, Option<Review>> {
        run(self.fetch_review(title, id))
    }

    fn list_reviews(&self, title: TitleId, page: PageRequest) -> RepoFuture<'_, Page<Review>> {
        run(self.select_reviews(title, page))
    }

    fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepoFuture<'_, Review> {
        run(self.patch_review(id, patch))
    }

    fn delete_review(&self, id: ReviewId) -> RepoFuture<'_, ()> {
        run(self.remove("reviews", "review", id.0))
    }

    fn create_comment(&self, comment: NewComment) -> RepoFuture<'_, Comment> {
        run(self.insert_comment(comment))
    }

    fn get_comment(&self, review: ReviewId, id: CommentId) -> RepoFuture<'_, Option<Comment>> {
        run(self.fetch_comment(review, id))
    }

    fn list_comments(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<Comment>> {
        run(self.select_comments(review, page))
    }

    fn update_comment(&self, id: CommentId, patch: CommentPatch) -> RepoFuture<'_, Comment> {
        run(self.patch_comment(id, patch))
    }

    fn delete_comment(&self, id: CommentId) -> RepoFuture<'_, ()> {
        run(self.remove("comments", "comment", id.0))
    }
}
