//! Storage errors and their mapping onto [`YamdbError`].

use thiserror::Error;
use yamdb_core::error::{FieldErrors, NON_FIELD_ERRORS};
use yamdb_core::repository::{
    EMAIL_TAKEN, REVIEW_EXISTS, SLUG_TAKEN, TITLE_NAME_TAKEN, USERNAME_TAKEN,
};
use yamdb_core::YamdbError;

/// Result type alias for queries.
pub type StoreResult<T> = std::result::Result<T, StorageError>;

/// Errors raised inside the PostgreSQL store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Query or connection failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row holds a value the domain model rejects.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Domain failure detected by a query (unknown slug, missing parent...).
    #[error(transparent)]
    Domain(#[from] YamdbError),
}

impl From<StorageError> for YamdbError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Domain(error) => error,
            StorageError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                unique_violation(db.constraint()).map_or_else(
                    || Self::Database(db.to_string()),
                    Self::Validation,
                )
            }
            other => Self::Database(other.to_string()),
        }
    }
}

/// Field error for a violated `UNIQUE` constraint of the schema.
fn unique_violation(constraint: Option<&str>) -> Option<FieldErrors> {
    let (field, message) = match constraint? {
        "users_username_key" => ("username", USERNAME_TAKEN),
        "users_email_key" => ("email", EMAIL_TAKEN),
        "categories_slug_key" | "genres_slug_key" => ("slug", SLUG_TAKEN),
        "titles_name_key" => ("name", TITLE_NAME_TAKEN),
        "unique_review" => (NON_FIELD_ERRORS, REVIEW_EXISTS),
        _ => return None,
    };
    Some(FieldErrors::single(field, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_become_field_errors() {
        let errors = unique_violation(Some("unique_review"));
        assert!(errors.is_some_and(|e| e.contains(NON_FIELD_ERRORS)));
        assert!(unique_violation(Some("genres_slug_key")).is_some_and(|e| e.contains("slug")));
        assert!(unique_violation(Some("something_else")).is_none());
        assert!(unique_violation(None).is_none());
    }

    #[test]
    fn domain_errors_pass_through() {
        let error: YamdbError = StorageError::from(YamdbError::not_found("title", 3)).into();
        assert_eq!(error, YamdbError::not_found("title", 3));
    }

    #[test]
    fn other_failures_are_database_errors() {
        let error: YamdbError = StorageError::CorruptRow("role=root".to_string()).into();
        assert!(matches!(error, YamdbError::Database(_)));
    }
}
