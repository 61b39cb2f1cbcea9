//! Business metrics for YaMDb.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `yamdb_signups_total{outcome}` - Signups by outcome (created, resent, invalid, email_failed)
//! - `yamdb_tokens_issued_total` - Access tokens issued
//! - `yamdb_token_rejections_total` - Wrong confirmation codes
//! - `yamdb_reviews_created_total` - Reviews posted
//! - `yamdb_comments_created_total` - Comments posted
//!
//! The auth counters are incremented inside `yamdb-auth`; this module only
//! describes them so `/metrics` carries their help text.

use metrics::describe_counter;
use yamdb_auth::metrics::{SIGNUPS_TOTAL, TOKEN_REJECTIONS_TOTAL, TOKENS_ISSUED_TOTAL};

/// Counter of created reviews.
pub const REVIEWS_CREATED_TOTAL: &str = "yamdb_reviews_created_total";

/// Counter of created comments.
pub const COMMENTS_CREATED_TOTAL: &str = "yamdb_comments_created_total";

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, after the recorder
/// is installed and before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        SIGNUPS_TOTAL,
        "Total number of signups by outcome (created, resent, invalid, email_failed)"
    );
    describe_counter!(TOKENS_ISSUED_TOTAL, "Total number of access tokens issued");
    describe_counter!(
        TOKEN_REJECTIONS_TOTAL,
        "Total number of token requests rejected for a wrong confirmation code"
    );
    describe_counter!(REVIEWS_CREATED_TOTAL, "Total number of reviews created");
    describe_counter!(COMMENTS_CREATED_TOTAL, "Total number of comments created");

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a review created event.
///
/// # Arguments
///
/// * `score` - Score given by the review
pub fn record_review_created(score: i32) {
    metrics::counter!(REVIEWS_CREATED_TOTAL).increment(1);
    tracing::debug!(score, "Recorded review_created metric");
}

/// Record a comment created event.
pub fn record_comment_created() {
    metrics::counter!(COMMENTS_CREATED_TOTAL).increment(1);
    tracing::debug!("Recorded comment_created metric");
}
