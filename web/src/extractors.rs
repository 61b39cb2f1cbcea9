//! Custom Axum extractors.
//!
//! - [`BearerToken`]: the optional `Authorization: Bearer <token>` credential
//! - [`RequestId`]: the `x-request-id` assigned by the tracing middleware
//! - [`JsonBody`], [`PathParams`], [`QueryParams`]: the stock extractors with
//!   rejections rendered as [`AppError`] bodies
//!
//! # Examples
//!
//! ```ignore
//! use yamdb_web::extractors::{BearerToken, JsonBody, PathParams};
//!
//! async fn handler(
//!     token: BearerToken,
//!     PathParams(id): PathParams<i64>,
//!     JsonBody(input): JsonBody<ReviewInput>,
//! ) -> Result<Json<Review>, AppError> {
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::REQUEST_ID_HEADER;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::de::DeserializeOwned;

/// Authorization scheme accepted by [`BearerToken`].
pub const BEARER_PREFIX: &str = "Bearer ";

/// Bearer credential from the `Authorization` header.
///
/// `None` when the header is absent or uses another scheme, so anonymous
/// requests reach handlers that allow them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };
        let header = header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

        let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
            return Ok(Self(None));
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(Some(token.to_string())))
    }
}

/// Request id assigned by [`crate::middleware::with_request_tracing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(Self(id))
    }
}

/// JSON request body; malformed JSON is a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters; a segment that does not parse is a 404 [`AppError`].
#[derive(Debug, Clone, Copy)]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string; a malformed query is a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    async fn bearer(header: Option<&str>) -> Result<BearerToken, AppError> {
        let mut builder = HttpRequest::builder();
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        assert_eq!(
            bearer(Some("Bearer abc.def.ghi")).await.unwrap(),
            BearerToken(Some("abc.def.ghi".to_string()))
        );
    }

    #[tokio::test]
    async fn missing_or_foreign_scheme_is_anonymous() {
        assert_eq!(bearer(None).await.unwrap(), BearerToken(None));
        assert_eq!(bearer(Some("Basic Zm9vOmJhcg==")).await.unwrap(), BearerToken(None));
    }

    #[tokio::test]
    async fn empty_bearer_is_rejected() {
        let err = bearer(Some("Bearer ")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        text: String,
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = HttpRequest::builder()
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = JsonBody::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_json_is_accepted() {
        let req = HttpRequest::builder()
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text":"hello"}"#))
            .unwrap();
        assert!(JsonBody::<Payload>::from_request(req, &()).await.is_ok());
    }
}
