//! Application assembly: storage backend selection and the router with its
//! middleware stack.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware::from_fn};
use secrecy::ExposeSecret;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::db::{self, MemStorage, PgStorage, Storage};
use crate::middleware::{
    AppSessionStore, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::routes;
use crate::seed::{self, SampleCatalog, SeedError};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Errors raised while preparing the storage backend.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to load sample catalog: {0}")]
    Seed(#[from] SeedError),

    #[error("Failed to create bootstrap admin: {0}")]
    Admin(#[from] AuthError),
}

/// The storage backend and its matching session store.
pub struct Backend {
    pub storage: Arc<dyn Storage>,
    pub sessions: AppSessionStore,
}

impl Backend {
    /// Connect to `PostgreSQL` when a database URL is configured, otherwise
    /// build an in-memory store.
    ///
    /// The in-memory store is seeded with the sample catalog when
    /// `sample_data` is set and always gets a bootstrap admin account. A
    /// generated admin password is logged once at WARN level.
    ///
    /// Migrations are not run here; use `cl-cli migrate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or seeding fails.
    pub async fn connect(config: &StorefrontConfig) -> Result<Self, StartupError> {
        if let Some(url) = &config.database_url {
            let pool = db::create_pool(url).await?;
            tracing::info!("Database pool created");
            return Ok(Self {
                storage: Arc::new(PgStorage::new(pool.clone())),
                sessions: AppSessionStore::postgres(pool),
            });
        }

        let storage = MemStorage::new();
        if config.sample_data {
            let report = SampleCatalog::builtin()?.load(&storage).await?;
            tracing::info!(
                products = report.products,
                batches = report.batches,
                documents = report.documents,
                "Sample catalog loaded"
            );
        }

        let generated = seed::ensure_admin(&storage, config.admin_password.as_ref()).await?;
        if let Some(password) = generated {
            tracing::warn!(
                username = seed::BOOTSTRAP_ADMIN_USERNAME,
                password = %password.expose_secret(),
                "Generated admin password (set STOREFRONT_ADMIN_PASSWORD to choose one)"
            );
        }

        tracing::info!("Using in-memory storage");
        Ok(Self {
            storage: Arc::new(storage),
            sessions: AppSessionStore::memory(),
        })
    }
}

/// Build the full application router.
///
/// Layers, outermost first: Sentry, tracing span, request ID, session,
/// security headers.
pub fn build_router(state: AppState, sessions: AppSessionStore) -> Router {
    let session_layer = create_session_layer(sessions, state.config());
    let images = ServeDir::new(&state.config().images_dir);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                span.record("status", response.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                );
                DefaultOnResponse::default().on_response(response, latency, span);
            },
        );

    Router::new()
        .merge(routes::routes())
        .nest_service("/images", images)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(from_fn(request_id_middleware))
                .layer(session_layer)
                .layer(from_fn(security_headers_middleware)),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
