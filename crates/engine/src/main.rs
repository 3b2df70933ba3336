//! Grimoire Engine - rules reference server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grimoire_engine::api;
use grimoire_engine::app::App;
use grimoire_engine::infrastructure::{
    clock::SystemClock,
    config::AppConfig,
    ports::ClockPort,
    sqlite::{self, SqliteRepositories},
};

/// How often expired entity resolutions are swept from the cache.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grimoire_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Grimoire Engine");

    let config = AppConfig::from_env()?;
    tracing::info!(env = %config.env, database = %config.database_url, "Configuration loaded");

    let pool = sqlite::connect(&config.database_url).await?;
    sqlite::init_schema(&pool).await?;
    tracing::info!("Connected to SQLite");

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let repos = SqliteRepositories::new(pool, clock.clone());

    let server_host = config.server_host.clone();
    let server_port = config.server_port;
    let cors = build_cors_layer(config.cors_allowed_origins.as_deref());
    let admin = config.admin.clone();

    let app = Arc::new(App::new(config, repos.into(), clock));

    if let Some(admin) = admin {
        app.use_cases.auth.bootstrap_admin(&admin).await?;
    }

    if let Err(e) = app.use_cases.lookups.reload().await {
        tracing::warn!(error = %e, "Failed to warm lookup cache, will load on first request");
    }

    // Sweep expired resolutions so the cache doesn't grow with dead entries
    let cache = app.resolution_cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Swept expired entity resolutions");
            }
        }
    });

    let mut router = api::http::router(app).layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS has no valid origins, CORS disabled");
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
