use axum::http::{HeaderValue, Method, header};
use platform_db::DatabaseSettings;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub database: DatabaseSettings,
}

impl AppConfig {
    pub fn load() -> Self {
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );
        Self {
            cors_allowed_origins,
            database: DatabaseSettings::from_env(),
        }
    }

    /// CORS for the employee routes. Origins that are not valid header values are skipped.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins = self
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        let allow_origin = if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
