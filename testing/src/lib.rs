//! # YaMDb Testing
//!
//! Testing utilities for YaMDb.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every repository trait over in-memory tables
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: ready-made users, genres and titles
//!
//! ## Example
//!
//! ```
//! use yamdb_core::repository::CatalogRepository;
//! use yamdb_testing::{InMemoryStore, fixtures};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//! let title = fixtures::seed_title(&store, "Solaris").await?;
//! assert_eq!(store.get_title(title.id).await?.map(|t| t.rating), Some(None));
//! # Ok::<_, yamdb_core::YamdbError>(())
//! # }).unwrap();
//! ```

use chrono::{DateTime, Utc};
use yamdb_core::environment::Clock;

mod memory;

pub use memory::InMemoryStore;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use yamdb_testing::mocks::FixedClock;
    /// use yamdb_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock at 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Seed data shared by unit and integration tests.
pub mod fixtures {
    use yamdb_core::Result;
    use yamdb_core::catalog::{NewTaxon, NewTitle, Taxon, Taxonomy, TitleView};
    use yamdb_core::repository::{CatalogRepository, UserRepository};
    use yamdb_core::role::Role;
    use yamdb_core::user::{NewUser, User};

    /// A new account with the given role and a `<username>@yamdb.fake` address.
    #[must_use]
    pub fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            role,
            ..NewUser::signup(username, format!("{username}@yamdb.fake"))
        }
    }

    /// Insert an account with the given role.
    ///
    /// # Errors
    ///
    /// Propagates store errors, e.g. a taken username.
    pub async fn seed_user<R>(store: &R, username: &str, role: Role) -> Result<User>
    where
        R: UserRepository + ?Sized,
    {
        store.create_user(new_user(username, role)).await
    }

    /// Insert a category or genre whose name is the capitalised slug.
    ///
    /// # Errors
    ///
    /// Propagates store errors, e.g. a taken slug.
    pub async fn seed_taxon<R>(store: &R, taxonomy: Taxonomy, slug: &str) -> Result<Taxon>
    where
        R: CatalogRepository + ?Sized,
    {
        let mut name = slug.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        store
            .create_taxon(
                taxonomy,
                NewTaxon {
                    name,
                    slug: slug.to_string(),
                },
            )
            .await
    }

    /// Insert a 1972 title in the `drama` genre, creating the genre if needed.
    ///
    /// # Errors
    ///
    /// Propagates store errors, e.g. a taken title name.
    pub async fn seed_title<R>(store: &R, name: &str) -> Result<TitleView>
    where
        R: CatalogRepository + ?Sized,
    {
        // A taken slug only means an earlier call created the genre.
        let _ = seed_taxon(store, Taxonomy::Genre, "drama").await;
        store
            .create_title(NewTitle {
                name: name.to_string(),
                year: 1972,
                description: None,
                genres: vec!["drama".to_string()],
                category: None,
            })
            .await
    }
}

pub use mocks::{FixedClock, test_clock};
