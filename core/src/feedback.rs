//! Reviews and comments.

use crate::catalog::TitleId;
use crate::error::{FieldErrors, Result};
use crate::user::UserId;
use crate::validation::{required, validate_score, validate_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database identifier of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub i64);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content with an author, checked by object-level permissions.
pub trait Authored {
    /// The user who wrote the content.
    fn author_id(&self) -> UserId;
}

/// A user's review of a title. At most one per (title, author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Identifier.
    pub id: ReviewId,
    /// Reviewed title.
    #[serde(skip)]
    pub title_id: TitleId,
    /// Author id.
    #[serde(skip)]
    pub author_id: UserId,
    /// Author username.
    pub author: String,
    /// Body.
    pub text: String,
    /// Score in `1..=10`.
    pub score: i32,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

impl Authored for Review {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

/// A comment on a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Identifier.
    pub id: CommentId,
    /// Commented review.
    #[serde(skip)]
    pub review_id: ReviewId,
    /// Author id.
    #[serde(skip)]
    pub author_id: UserId,
    /// Author username.
    pub author: String,
    /// Body.
    pub text: String,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

impl Authored for Comment {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

/// Validated new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed title.
    pub title_id: TitleId,
    /// Author.
    pub author_id: UserId,
    /// Body.
    pub text: String,
    /// Score.
    pub score: i32,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// Partial update of a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    /// New body.
    pub text: Option<String>,
    /// New score.
    pub score: Option<i32>,
}

/// Review payload as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    /// Body.
    pub text: Option<String>,
    /// Score.
    pub score: Option<i32>,
}

impl ReviewInput {
    /// Validate a payload for review creation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when a field is missing or malformed.
    pub fn into_new_review(
        self,
        title_id: TitleId,
        author_id: UserId,
        pub_date: DateTime<Utc>,
    ) -> Result<NewReview> {
        let mut errors = FieldErrors::new();
        let text = required(&mut errors, "text", self.text.clone());
        let score = required(&mut errors, "score", self.score);
        self.check(&mut errors);
        errors.into_result()?;
        Ok(NewReview {
            title_id,
            author_id,
            text: text.unwrap_or_default(),
            score: score.unwrap_or_default(),
            pub_date,
        })
    }

    /// Validate a payload for a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when a field is malformed.
    pub fn into_patch(self) -> Result<ReviewPatch> {
        let mut errors = FieldErrors::new();
        self.check(&mut errors);
        errors.into_result()?;
        Ok(ReviewPatch {
            text: self.text,
            score: self.score,
        })
    }

    fn check(&self, errors: &mut FieldErrors) {
        if let Some(text) = &self.text {
            errors.check("text", validate_text(text));
        }
        if let Some(score) = self.score {
            errors.check("score", validate_score(score));
        }
    }
}

/// Validated new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Commented review.
    pub review_id: ReviewId,
    /// Author.
    pub author_id: UserId,
    /// Body.
    pub text: String,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// Partial update of a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    /// New body.
    pub text: Option<String>,
}

/// Comment payload as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    /// Body.
    pub text: Option<String>,
}

impl CommentInput {
    /// Validate a payload for comment creation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when the text is missing or blank.
    pub fn into_new_comment(
        self,
        review_id: ReviewId,
        author_id: UserId,
        pub_date: DateTime<Utc>,
    ) -> Result<NewComment> {
        let mut errors = FieldErrors::new();
        let text = required(&mut errors, "text", self.text);
        if let Some(text) = &text {
            errors.check("text", validate_text(text));
        }
        errors.into_result()?;
        Ok(NewComment {
            review_id,
            author_id,
            text: text.unwrap_or_default(),
            pub_date,
        })
    }

    /// Validate a payload for a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] when the text is blank.
    pub fn into_patch(self) -> Result<CommentPatch> {
        let mut errors = FieldErrors::new();
        if let Some(text) = &self.text {
            errors.check("text", validate_text(text));
        }
        errors.into_result()?;
        Ok(CommentPatch { text: self.text })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::YamdbError;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn review_score_out_of_range_is_field_error() {
        let input = ReviewInput {
            text: Some("Great".to_string()),
            score: Some(11),
        };
        let Err(YamdbError::Validation(errors)) =
            input.into_new_review(TitleId(1), UserId(1), now())
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains("score"));
        assert!(!errors.contains("text"));
    }

    #[test]
    fn review_requires_text_and_score() {
        let Err(YamdbError::Validation(errors)) =
            ReviewInput::default().into_new_review(TitleId(1), UserId(1), now())
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains("text"));
        assert!(errors.contains("score"));
    }

    #[test]
    fn review_patch_may_change_score_only() {
        let patch = ReviewInput {
            text: None,
            score: Some(4),
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.score, Some(4));
        assert_eq!(patch.text, None);
    }

    #[test]
    fn comment_rejects_blank_text() {
        let input = CommentInput {
            text: Some("   ".to_string()),
        };
        assert!(input.into_new_comment(ReviewId(1), UserId(1), now()).is_err());
    }

    #[test]
    fn review_serializes_author_by_username() {
        let review = Review {
            id: ReviewId(3),
            title_id: TitleId(1),
            author_id: UserId(9),
            author: "critic".to_string(),
            text: "Fine".to_string(),
            score: 6,
            pub_date: now(),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["author"], "critic");
        assert_eq!(json["id"], 3);
        assert!(json.get("title_id").is_none());
        assert_eq!(review.author_id(), UserId(9));
    }
}
