//! Application assembly.
//!
//! Turns a [`Config`] into a ready [`AppState`]: opens storage, picks the
//! mail transport, builds the registration service and seeds the
//! bootstrap administrator.

use crate::config::{Config, EmailBackend, StorageBackend};
use crate::server::AppState;
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use yamdb_auth::Registration;
use yamdb_auth::providers::{ConsoleEmailProvider, EmailProvider, SmtpEmailProvider};
use yamdb_core::environment::{Clock, SystemClock};
use yamdb_core::permissions::Permissions;
use yamdb_core::repository::{
    CatalogRepository, FeedbackRepository, HealthCheck, UserRepository,
};
use yamdb_postgres::PostgresStore;
use yamdb_testing::InMemoryStore;

/// Build the application state described by `config`.
///
/// # Errors
///
/// Fails if the database is unreachable, a migration fails, the SMTP
/// transport cannot be configured, or the bootstrap administrator cannot
/// be created.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    if config.auth.uses_dev_secret() {
        warn!("AUTH_TOKEN_SECRET is not set; using the development secret");
    }

    let mailer = build_mailer(config)?;

    match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let store = PostgresStore::connect(
                &config.storage.database_url,
                &config.storage.pool_settings(),
            )
            .await
            .context("failed to connect to PostgreSQL")?;

            if config.storage.run_migrations {
                info!("Running database migrations...");
                store.migrate().await.context("failed to run migrations")?;
                info!("Migrations complete");
            }

            assemble(Arc::new(store), config, mailer).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            assemble(Arc::new(InMemoryStore::new()), config, mailer).await
        }
    }
}

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn EmailProvider>> {
    match config.email.backend {
        EmailBackend::Console => {
            info!("Confirmation emails are logged, not sent");
            Ok(Arc::new(ConsoleEmailProvider::new()))
        }
        EmailBackend::Smtp => {
            let provider = SmtpEmailProvider::new(&config.email.smtp())
                .context("failed to configure SMTP transport")?;
            info!(host = %config.email.smtp_host, port = config.email.smtp_port, "SMTP transport configured");
            Ok(Arc::new(provider))
        }
    }
}

async fn assemble<S>(
    store: Arc<S>,
    config: &Config,
    mailer: Arc<dyn EmailProvider>,
) -> anyhow::Result<AppState>
where
    S: UserRepository + CatalogRepository + FeedbackRepository + HealthCheck + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registration = Registration::new(
        config.auth.auth_config(&config.email.from),
        store.clone(),
        mailer,
        clock.clone(),
    );

    if let Some(admin) = &config.auth.bootstrap_admin {
        registration
            .ensure_superuser(&admin.username, &admin.email)
            .await
            .with_context(|| format!("failed to bootstrap administrator {}", admin.username))?;
    }

    Ok(AppState::new(store, registration)
        .with_permissions(Permissions::new(config.safe_methods.clone()))
        .with_pagination(config.pagination)
        .with_clock(clock))
}
