// Main entry point for the signup API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use signup_core::domains::auth::{
    InMemoryRegistrationService, JwtService, PostgresRegistrationService, VerifiedPhoneStore,
};
use signup_core::kernel::{BaseRegistrationService, ServerDeps, TwilioAdapter};
use signup_core::server::{build_app, AppOptions};
use signup_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

/// How often expired phone verification marks are purged
const VERIFIED_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,signup_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nextrip signup API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        otp_check_policy = ?config.otp_check_policy,
        rate_limit_enabled = config.rate_limit_enabled,
        "Configuration loaded"
    );

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    // Connect to database (optional)
    let db_pool = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations complete");
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory");
            None
        }
    };

    let registration: Arc<dyn BaseRegistrationService> = match &db_pool {
        Some(pool) => Arc::new(PostgresRegistrationService::new(
            pool.clone(),
            jwt_service.clone(),
        )),
        None => Arc::new(InMemoryRegistrationService::new(jwt_service.clone())),
    };

    let twilio = Arc::new(TwilioService::new(TwilioOptions {
        account_sid: config.twilio_account_sid.clone(),
        auth_token: config.twilio_auth_token.clone(),
        service_id: config.twilio_verify_service_sid.clone(),
    }));

    let verified_phones =
        VerifiedPhoneStore::new(chrono::Duration::minutes(config.verified_ttl_minutes));

    // Purge expired verification marks in the background
    let cleanup_store = verified_phones.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(VERIFIED_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_store.cleanup_expired().await;
        }
    });

    let deps = ServerDeps::new(
        db_pool,
        Arc::new(TwilioAdapter::new(twilio)),
        registration,
        verified_phones,
        config.otp_check_policy,
    );

    let app = build_app(
        deps,
        AppOptions {
            allowed_origins: config.allowed_origins.clone(),
            rate_limit_enabled: config.rate_limit_enabled,
        },
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
