//! Whodunit Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whodunit_engine::api;
use whodunit_engine::app::{App, Repositories};
use whodunit_engine::infrastructure::{
    clock::SystemClock,
    config::AppConfig,
    importers::ScenarioBundle,
    ollama::OllamaClient,
    ports::ClockPort,
    resilient_llm::{ResilientLlmClient, RetryConfig},
    sqlite::SqliteStore,
};
use whodunit_engine::use_cases::dialogue::DialogueConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whodunit_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Whodunit Engine");

    let config = AppConfig::from_env()?;

    // Open the store
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    tracing::info!(path = %config.database_path.display(), "Opening SQLite store");
    let store = SqliteStore::open(&config.database_path)
        .await
        .context("Failed to open SQLite store")?;

    if let Some(bundle_path) = &config.scenario_bundle_path {
        let bundle = ScenarioBundle::load(bundle_path)
            .await
            .with_context(|| format!("Failed to load scenario bundle {}", bundle_path.display()))?;
        bundle
            .import(store.content.as_ref())
            .await
            .context("Failed to import scenario bundle")?;
    }

    // Create infrastructure clients
    let ollama_client = Arc::new(OllamaClient::new(
        &config.ollama_base_url,
        &config.ollama_model,
        Duration::from_secs(config.llm_timeout_secs),
    ));
    let retry_config = RetryConfig::default().with_max_retries(config.llm_max_retries);
    tracing::info!(
        model = %ollama_client.model(),
        "LLM client configured with retry: max_retries={}, base_delay_ms={}",
        retry_config.max_retries,
        retry_config.base_delay_ms
    );
    let llm = Arc::new(ResilientLlmClient::new(ollama_client, retry_config));
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    // Create application
    let app = Arc::new(App::new(
        Repositories::from(store),
        llm,
        clock,
        DialogueConfig {
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        },
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(&config.cors_allowed_origins) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
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

fn build_cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        // Clients send X-User-Id and JSON bodies, both of which trigger preflights.
        .allow_headers([
            HeaderName::from_static(api::http::USER_ID_HEADER),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(cors.allow_origin(origins))
}
