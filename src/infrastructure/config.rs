use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Legacy compatibility mode: commit each borrow line independently
    /// instead of all-or-nothing per batch.
    pub legacy_per_line_borrow: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://stockroom.db?mode=rwc".to_string()
            } else {
                format!("sqlite://stockroom_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            profile,
            legacy_per_line_borrow: env::var("LEGACY_PER_LINE_BORROW")
                .map(|v| v == "1" || v == "true")
                .unwrap_or(false),
        }
    }
}
