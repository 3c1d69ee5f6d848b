//! Critiq HTTP API
//!
//! The entry point for all external API requests.
//! Handles:
//! - Signup and token exchange
//! - Role-based authorization on every mutating request
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use critiq_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{DbPool, Repository},
    errors::ApiError,
    metrics,
    notify::{self, Notifier},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub repo: Repository,
    pub jwt: Arc<JwtManager>,
    pub notifier: Arc<dyn Notifier>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting Critiq API v{}", critiq_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Metrics exporter listening on {}", addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db.clone());

    // Token issuer
    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or(ApiError::Configuration {
            message: "auth.jwt_secret is not set".to_string(),
        })?;
    let jwt = Arc::new(JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs));

    // Notification collaborator
    let notifier = notify::build_notifier(&config.mail)?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        repo,
        jwt,
        notifier,
    };

    // Build the router
    let app = create_router(state, &config);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, config: &AppConfig) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Auth endpoints
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/token", post(handlers::auth::token))

        // User endpoints (admin surface + own profile)
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/me",
            get(handlers::users::me).patch(handlers::users::patch_me),
        )
        .route(
            "/users/{username}",
            get(handlers::users::get_user)
                .patch(handlers::users::patch_user)
                .delete(handlers::users::delete_user),
        )

        // Reference data endpoints
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/{slug}",
            delete(handlers::categories::delete_category),
        )
        .route(
            "/genres",
            get(handlers::genres::list_genres).post(handlers::genres::create_genre),
        )
        .route("/genres/{slug}", delete(handlers::genres::delete_genre))

        // Title endpoints
        .route(
            "/titles",
            get(handlers::titles::list_titles).post(handlers::titles::create_title),
        )
        .route(
            "/titles/{id}",
            get(handlers::titles::get_title)
                .patch(handlers::titles::patch_title)
                .delete(handlers::titles::delete_title),
        )

        // Review endpoints
        .route(
            "/titles/{title_id}/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(handlers::reviews::get_review)
                .patch(handlers::reviews::patch_review)
                .delete(handlers::reviews::delete_review),
        )

        // Comment endpoints
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(handlers::comments::get_comment)
                .patch(handlers::comments::patch_comment)
                .delete(handlers::comments::delete_comment),
        );

    // Compose the app
    let mut app = Router::new()
        .nest("/api/v1", api_routes)
        // route_layer so MatchedPath is populated when metrics run
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state);

    // Rate limiting
    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        );
        app = app.layer(axum::middleware::from_fn(move |request, next| {
            let limiter = limiter.clone();
            async move { middleware::rate_limit::rate_limit_middleware(request, next, limiter).await }
        }));
    }

    app
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
