//! Authentication for the YaMDb server.
//!
//! - [`handlers`]: signup and token exchange endpoints
//! - [`middleware`]: the [`CurrentActor`] extractor and permission guards

pub mod handlers;
pub mod middleware;

pub use middleware::{CurrentActor, authorize, authorize_object};
