//! Application state for the YaMDb HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Repositories (users, catalog, feedback) behind trait objects
//! - The registration service (signup, tokens, bearer authentication)
//! - Permission policies and page sizes

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use yamdb_auth::Registration;
use yamdb_core::environment::{Clock, SystemClock};
use yamdb_core::pagination::PaginationConfig;
use yamdb_core::permissions::Permissions;
use yamdb_core::repository::{
    CatalogRepository, FeedbackRepository, HealthCheck, UserRepository,
};

/// Application state shared across all HTTP handlers.
///
/// It's cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// User accounts
    pub users: Arc<dyn UserRepository>,

    /// Categories, genres and titles
    pub catalog: Arc<dyn CatalogRepository>,

    /// Reviews and comments
    pub feedback: Arc<dyn FeedbackRepository>,

    /// Storage liveness probe for `/ready`
    pub health: Arc<dyn HealthCheck>,

    /// Signup, token exchange and bearer authentication
    pub registration: Arc<Registration>,

    /// Permission policies
    pub permissions: Arc<Permissions>,

    /// Page sizes per endpoint family
    pub pagination: PaginationConfig,

    /// Source of `pub_date` timestamps
    pub clock: Arc<dyn Clock>,

    /// Prometheus renderer for `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state over one store implementing every
    /// repository trait.
    #[must_use]
    pub fn new<S>(store: Arc<S>, registration: Registration) -> Self
    where
        S: UserRepository + CatalogRepository + FeedbackRepository + HealthCheck + 'static,
    {
        Self {
            users: store.clone(),
            catalog: store.clone(),
            feedback: store.clone(),
            health: store,
            registration: Arc::new(registration),
            permissions: Arc::new(Permissions::default()),
            pagination: PaginationConfig::default(),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    /// Use custom permission policies.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    /// Use custom page sizes.
    #[must_use]
    pub const fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Use a custom clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Serve metrics from `handle` at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registration", &self.registration)
            .field("permissions", &self.permissions)
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}
