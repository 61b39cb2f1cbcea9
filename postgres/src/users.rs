//! `users` table.

use crate::error::{StorageError, StoreResult};
use crate::{PostgresStore, bind_i64, row_count, run};
use sqlx::postgres::PgRow;
use sqlx::Row;
use yamdb_core::error::FieldErrors;
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::repository::{EMAIL_TAKEN, RepoFuture, USERNAME_TAKEN, UserRepository};
use yamdb_core::user::{NewUser, User, UserId, UserPatch};
use yamdb_core::{Role, YamdbError};

const USER_COLUMNS: &str =
    "id, username, email, role, bio, first_name, last_name, is_superuser, confirmation_code";

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    let role: Role = role
        .parse()
        .map_err(|e| StorageError::CorruptRow(format!("users.role: {e}")))?;
    Ok(User {
        id: UserId(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        bio: row.try_get("bio")?,
        role,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        is_superuser: row.try_get("is_superuser")?,
        confirmation_code: row.try_get("confirmation_code")?,
    })
}

impl PostgresStore {
    /// Report every taken field at once instead of the first violated constraint.
    async fn check_user_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<UserId>,
    ) -> StoreResult<()> {
        let row = sqlx::query(
            r"
            SELECT
                COALESCE(BOOL_OR(username = $1), FALSE) AS username_taken,
                COALESCE(BOOL_OR(email = $2), FALSE) AS email_taken
            FROM users
            WHERE (username = $1 OR email = $2) AND id <> $3
            ",
        )
        .bind(username)
        .bind(email)
        .bind(except.map_or(0, |id| id.0))
        .fetch_one(&self.pool)
        .await?;

        let mut errors = FieldErrors::new();
        if row.try_get::<bool, _>("username_taken")? {
            errors.push("username", USERNAME_TAKEN);
        }
        if row.try_get::<bool, _>("email_taken")? {
            errors.push("email", EMAIL_TAKEN);
        }
        errors.into_result().map_err(StorageError::from)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.check_user_unique(Some(user.username.as_str()), Some(user.email.as_str()), None)
            .await?;
        let row = sqlx::query(&format!(
            r"
            INSERT INTO users (username, email, role, bio, first_name, last_name, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.bio)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await?;
        user_from_row(&row)
    }

    async fn fetch_user(&self, column: &'static str, value: UserKey) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let query = sqlx::query(&sql);
        let row = match value {
            UserKey::Id(id) => query.bind(id),
            UserKey::Text(text) => query.bind(text),
        }
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn select_users(&self, search: Option<String>, page: PageRequest) -> StoreResult<Page<User>> {
        const FILTER: &str = "$1::TEXT IS NULL OR strpos(lower(username), lower($1)) > 0";

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {FILTER}"))
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?;
        let count = row_count(count);
        page.check(count)?;

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {FILTER} ORDER BY id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(search.as_deref())
        .bind(bind_i64(page.limit()))
        .bind(bind_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let users = rows.iter().map(user_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(Page::new(page, count, users))
    }

    async fn patch_user(&self, id: UserId, patch: UserPatch) -> StoreResult<User> {
        self.check_user_unique(patch.username.as_deref(), patch.email.as_deref(), Some(id))
            .await?;
        let row = sqlx::query(&format!(
            r"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                bio = COALESCE($5, bio),
                first_name = COALESCE($6, first_name),
                last_name = COALESCE($7, last_name)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id.0)
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.role.as_ref().map(Role::as_str))
        .bind(patch.bio)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| YamdbError::not_found("user", id))?;
        user_from_row(&row)
    }

    async fn remove_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(YamdbError::not_found("user", id).into());
        }
        tracing::info!(user_id = id.0, "User deleted");
        Ok(())
    }

    async fn store_code(&self, id: UserId, code: Option<String>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
            .bind(id.0)
            .bind(code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(YamdbError::not_found("user", id).into());
        }
        Ok(())
    }
}

enum UserKey {
    Id(i64),
    Text(String),
}

impl UserRepository for PostgresStore {
    fn create_user(&self, user: NewUser) -> RepoFuture<'_, User> {
        run(self.insert_user(user))
    }

    fn get_user(&self, id: UserId) -> RepoFuture<'_, Option<User>> {
        run(self.fetch_user("id", UserKey::Id(id.0)))
    }

    fn find_user_by_username(&self, username: String) -> RepoFuture<'_, Option<User>> {
        run(self.fetch_user("username", UserKey::Text(username)))
    }

    fn find_user_by_email(&self, email: String) -> RepoFuture<'_, Option<User>> {
        run(self.fetch_user("email", UserKey::Text(email)))
    }

    fn list_users(&self, search: Option<String>, page: PageRequest) -> RepoFuture<'_, Page<User>> {
        run(self.select_users(search, page))
    }

    fn update_user(&self, id: UserId, patch: UserPatch) -> RepoFuture<'_, User> {
        run(self.patch_user(id, patch))
    }

    fn delete_user(&self, id: UserId) -> RepoFuture<'_, ()> {
        run(self.remove_user(id))
    }

    fn set_confirmation_code(&self, id: UserId, code: Option<String>) -> RepoFuture<'_, ()> {
        run(self.store_code(id, code))
    }
}
