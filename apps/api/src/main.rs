mod applications;
mod auth;
mod config;
mod db;
mod discovery;
mod errors;
mod generation;
mod llm_client;
mod mailer;
mod models;
mod routes;
mod settings;
mod state;
mod storage;
mod template;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::pipeline::Pipeline;
use crate::auth::store::{MemoryUserStore, PgUserStore, UserStore};
use crate::config::{Config, S3Config, StorageBackend};
use crate::db::{create_pool, ensure_schema};
use crate::discovery::{DiscoveryCredentials, DiscoveryEndpoints};
use crate::generation::sentence::LlmSentenceGenerator;
use crate::llm_client::LlmClient;
use crate::mailer::SmtpMailer;
use crate::routes::build_router;
use crate::settings::UserSettings;
use crate::state::AppState;
use crate::storage::s3::S3FileStore;
use crate::storage::{FileStore, MemoryFileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireUp API v{}", env!("CARGO_PKG_VERSION"));

    // Accounts: PostgreSQL when configured, otherwise in memory
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            ensure_schema(&db).await?;
            Arc::new(PgUserStore::new(db))
        }
        None => {
            warn!("DATABASE_URL not set; user accounts will not survive a restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    // Resume storage
    let files: Arc<dyn FileStore> = match &config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory file storage");
            Arc::new(MemoryFileStore::new())
        }
        StorageBackend::S3(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 client initialized (bucket: {})", s3.bucket);
            Arc::new(S3FileStore::new(client, s3.bucket.clone()))
        }
    };

    let http = reqwest::Client::new();

    // Initialize LLM client
    let llm = LlmClient::new(http.clone(), config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let settings = UserSettings {
        discovery: DiscoveryCredentials {
            primary_api_key: config.primary_discovery_api_key.clone(),
            secondary_api_key: config.secondary_discovery_api_key.clone(),
        },
        ..UserSettings::default()
    };

    // Build app state
    let state = AppState {
        settings: Arc::new(RwLock::new(settings)),
        pipeline: Arc::new(RwLock::new(Pipeline::new())),
        sentences: Arc::new(LlmSentenceGenerator(llm)),
        mailer: Arc::new(SmtpMailer::new(config.smtp_host.clone())),
        files,
        users,
        http,
        discovery_endpoints: DiscoveryEndpoints {
            primary_base_url: config.primary_discovery_url.clone(),
            secondary_base_url: config.secondary_discovery_url.clone(),
        },
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "hireup-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
