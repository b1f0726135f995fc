//! Story-Tell API Server
//!
//! Backend-for-frontend for the Story-Tell feed: sign-up/sign-in, composing
//! posts with AI-generated images, listing and liking posts.
//! Persistence, auth and image generation are delegated to Supabase.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    SupabaseAuthProvider, SupabaseClient, SupabaseImageGenerator, SupabaseLikeRepository,
    SupabasePostRepository,
};
use app::{DynFeedService, DynSessionService, FeedService, SessionPolicy, SessionService};
use config::Config;
use domain::ports::AuthProvider;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub feed_service: Arc<DynFeedService>,
    pub session_service: Arc<DynSessionService>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Sign-up and sign-in; rate limited in production
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/signin", post(handlers::sign_in))
}

/// Auth routes behind a per-peer-IP governor: `burst` requests, then one more
/// every `per_second` seconds. Needs connect info on the served router.
fn rate_limited_auth_routes(per_second: u64, burst: u32) -> anyhow::Result<Router<AppState>> {
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .context("Invalid auth rate limit configuration")?,
    );
    Ok(auth_routes().layer(GovernorLayer {
        config: governor_config,
    }))
}

fn router(state: AppState, auth_routes: Router<AppState>) -> Router {
    Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(auth_routes)
        // Session routes
        .merge(
            Router::new()
                .route("/auth/signout", post(handlers::sign_out))
                // Feed
                .route("/feed", get(handlers::get_feed))
                .route("/posts/:id/like", post(handlers::like_post))
                // Draft
                .route("/draft", get(handlers::get_draft))
                .route("/draft/content", put(handlers::set_content))
                .route("/draft/images", post(handlers::generate_image))
                .route("/draft/images/:index", delete(handlers::remove_image))
                .route("/draft/submit", post(handlers::submit_draft))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::auth_middleware,
                )),
        )
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storytell_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Story-Tell API...");

    // Load configuration
    let config = Config::from_env()?;

    // Create adapters
    let supabase = Arc::new(SupabaseClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let post_repo = Arc::new(SupabasePostRepository::new(supabase.clone()));
    let like_repo = Arc::new(SupabaseLikeRepository::new(supabase.clone()));
    let image_generator = Arc::new(SupabaseImageGenerator::new(supabase.clone()));
    let auth_provider: Arc<dyn AuthProvider> = Arc::new(SupabaseAuthProvider::new(supabase.clone()));

    // Create application services
    let feed_service: Arc<DynFeedService> = Arc::new(FeedService::new(
        post_repo,
        like_repo,
        image_generator,
    ));
    let session_service: Arc<DynSessionService> = Arc::new(
        SessionService::new(auth_provider).with_policy(SessionPolicy {
            idle_timeout: chrono::Duration::seconds(config.session_idle_timeout_secs),
            max_per_user: config.max_sessions_per_user,
        }),
    );

    let state = AppState {
        feed_service,
        session_service,
    };

    // Rate limiting for the auth routes (per peer IP)
    let limited_auth_routes =
        rate_limited_auth_routes(config.auth_rate_per_second, config.auth_rate_burst)?;

    let app = router(state, limited_auth_routes);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
