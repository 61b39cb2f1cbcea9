//! YaMDb - a review and rating service for creative works
//!
//! REST API over the YaMDb domain:
//!
//! - **Registration**: email confirmation codes exchanged for bearer tokens
//! - **Users**: admin management plus self-service `/users/me`
//! - **Catalog**: categories, genres and titles with a computed rating
//! - **Feedback**: one review per user per title, comments on reviews
//!
//! # Architecture
//!
//! ```text
//!   HTTP (axum) ──► CurrentActor ──► Policy check ──► handler
//!                                                       │
//!                        ┌──────────────────────────────┤
//!                        ▼                              ▼
//!               Registration (yamdb-auth)      Repository traits (yamdb-core)
//!                                                       │
//!                                      ┌────────────────┴───────────┐
//!                                      ▼                            ▼
//!                             PostgresStore                 InMemoryStore
//! ```
//!
//! [`bootstrap::build_state`] wires a [`Config`] into an [`AppState`];
//! [`build_router`] turns that into the router served by the binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod metrics;
pub mod server;

pub use config::Config;
pub use server::{AppState, build_router};
