//! Environment-driven configuration, read once at startup.

use std::env;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_RUN_ENV: &str = "development";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_BASE_URL: &str = "https://paravi.ruh.ac.lk/fosmis2019";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub run_env: String,
    /// Origins allowed by the CORS layer, exact matches only.
    pub cors_origins: Vec<String>,
    pub fosmis_base_url: String,
}

impl AppConfig {
    /// Reads configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_RUN_ENV.to_string());
        let cors_origins =
            env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());
        let fosmis_base_url =
            env::var("FOSMIS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        AppConfig {
            port,
            run_env,
            cors_origins: parse_origin_list(&cors_origins),
            fosmis_base_url,
        }
    }

    /// True outside deployed environments; gates the self keep-alive pings.
    pub fn is_dev(&self) -> bool {
        self.run_env == "development"
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
