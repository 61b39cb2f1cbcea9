//! # YaMDb Core
//!
//! Domain model of the YaMDb review service: users and roles, the title
//! catalog, reviews and comments, the authorization predicates guarding
//! them, and the repository traits storage backends implement.
//!
//! ## Core Concepts
//!
//! - **Title**: a reviewable work, grouped by one category and many genres
//! - **Review**: one per user per title, scored 1 to 10
//! - **Rating**: rounded mean of a title's review scores
//! - **Policy**: pure predicate deciding whether an actor may act
//!
//! Nothing in this crate performs I/O. Storage lives behind the traits in
//! [`repository`] and time behind [`environment::Clock`].
//!
//! ## Example
//!
//! ```
//! use yamdb_core::rating::average_score;
//! use yamdb_core::validation::validate_username;
//!
//! assert!(validate_username("me").is_err());
//! assert_eq!(average_score([6, 9]), Some(8));
//! ```

pub mod catalog;
pub mod error;
pub mod feedback;
pub mod pagination;
pub mod permissions;
pub mod rating;
pub mod repository;
pub mod role;
pub mod user;
pub mod validation;

pub use chrono::{DateTime, Utc};
pub use error::{FieldErrors, Result, YamdbError};
pub use role::Role;

/// Environment traits injected into services.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use yamdb_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// assert!(clock.now() <= chrono::Utc::now());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
