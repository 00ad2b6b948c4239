// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;

/// Uploaded photos larger than this are rejected (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means the in-memory stores are used.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub submit_timeout_ms: u64,
    pub seed_on_startup: bool,
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            rust_log: "info".to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
            seed_on_startup: false,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Parses an optional variable, falling back to `default` and noting
/// unparsable values in `warnings`.
fn parsed_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring invalid value for {}: {:?}", key, value));
            default
        }),
        None => default,
    }
}

impl Config {
    /// Loads configuration from the process environment (and `.env`).
    ///
    /// Also returns a warning per variable that was set but could not be
    /// parsed. These are returned rather than logged because logging is
    /// configured from the result.
    pub fn from_env() -> (Self, Vec<String>) {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let rust_log = lookup("RUST_LOG").unwrap_or(defaults.rust_log);

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let config = Self {
            database_url,
            rust_log,
            port: parsed_var(&lookup, "PORT", defaults.port, &mut warnings),
            upload_dir,
            max_upload_bytes: parsed_var(
                &lookup,
                "MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
                &mut warnings,
            ),
            submit_timeout_ms: parsed_var(
                &lookup,
                "SUBMIT_TIMEOUT_MS",
                defaults.submit_timeout_ms,
                &mut warnings,
            ),
            seed_on_startup: parsed_var(
                &lookup,
                "SEED_ON_STARTUP",
                defaults.seed_on_startup,
                &mut warnings,
            ),
            cors_origins,
        };

        (config, warnings)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}
