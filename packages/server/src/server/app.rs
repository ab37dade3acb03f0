//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    health_handler, register_handler, send_otp_handler, send_otp_probe_handler,
    verify_otp_handler,
};
use crate::server::static_pages::{not_found_handler, privacy_handler, terms_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// HTTP-level switches that are not part of the service wiring
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
///
/// The OTP endpoints are rate limited per client IP when enabled; health
/// and the static pages are not.
pub fn build_app(deps: ServerDeps, options: AppOptions) -> Router {
    let app_state = AppState {
        deps: Arc::new(deps),
    };

    let mut api = Router::new()
        .route(
            "/api/phone-number/send-otp",
            get(send_otp_probe_handler).post(send_otp_handler),
        )
        .route("/api/phone-number/verify-otp", post(verify_otp_handler))
        .route("/api/phone-number/register", post(register_handler));

    if options.rate_limit_enabled {
        // OTP: 5 requests per minute per IP (one every 12s, burst of 5)
        let rate_limit_config = GovernorConfigBuilder::default()
            .per_second(12)
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish();

        match rate_limit_config {
            Some(config) => {
                api = api.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!("Rate limiter configuration rejected; OTP routes are not rate limited"),
        }
    }

    Router::new()
        .merge(api)
        .route("/health", get(health_handler))
        .route("/terms", get(terms_handler))
        .route("/privacy", get(privacy_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}
