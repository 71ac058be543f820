//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Document-understanding service configuration.
    pub gemini: GeminiSettings,
    /// Staging area for uploaded documents.
    #[serde(default)]
    pub staging: StagingSettings,
    /// Ingestion pipeline tuning.
    #[serde(default)]
    pub ingestion: IngestionSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma separated list of allowed CORS origins, `*` for any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> String {
    "*".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Document-understanding service configuration.
#[derive(Clone, Deserialize)]
pub struct GeminiSettings {
    /// API key sent with every request.
    pub api_key: String,
    /// Model used for content generation.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL of the resumable upload endpoint.
    #[serde(default = "default_upload_base")]
    pub upload_base: String,
    /// Timeout for every outbound request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Delay between file status polls, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Maximum number of file status polls.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"[hidden]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("upload_base", &self.upload_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .finish()
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_upload_base() -> String {
    "https://generativelanguage.googleapis.com/upload/v1beta".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    2
}

fn default_max_poll_attempts() -> u32 {
    30
}

/// Staging area configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StagingSettings {
    /// Root directory for staged documents.
    #[serde(default = "default_staging_root")]
    pub root: String,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            root: default_staging_root(),
        }
    }
}

fn default_staging_root() -> String {
    std::env::temp_dir()
        .join("cognitax-staging")
        .to_string_lossy()
        .into_owned()
}

/// What to do with a transaction entry that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedEntryPolicy {
    /// Fail the whole upload.
    #[default]
    Abort,
    /// Drop the entry and keep going.
    Skip,
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionSettings {
    /// Policy for malformed transaction entries.
    #[serde(default)]
    pub malformed_entry_policy: MalformedEntryPolicy,
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Age after which a `processing` upload is considered abandoned.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,
    /// How often the reconciliation sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            malformed_entry_policy: MalformedEntryPolicy::default(),
            max_upload_bytes: default_max_upload_bytes(),
            stale_after_secs: default_stale_after(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_stale_after() -> u64 {
    900 // 15 minutes
}

fn default_sweep_interval() -> u64 {
    300
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("COGNITAX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 3] = [
        ("COGNITAX__DATABASE__URL", Some("postgres://localhost/cognitax_test")),
        ("COGNITAX__JWT__SECRET", Some("test-secret")),
        ("COGNITAX__GEMINI__API_KEY", Some("test-key")),
    ];

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(REQUIRED, || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.database.url, "postgres://localhost/cognitax_test");
            assert_eq!(config.jwt.access_token_expiry_secs, 604_800);
            assert_eq!(config.gemini.model, "gemini-2.0-flash");
            assert_eq!(config.gemini.poll_interval_secs, 2);
            assert_eq!(config.gemini.max_poll_attempts, 30);
            assert_eq!(config.gemini.request_timeout_secs, 120);
            assert_eq!(
                config.ingestion.malformed_entry_policy,
                MalformedEntryPolicy::Abort
            );
        });
    }

    #[test]
    fn test_load_reads_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("COGNITAX__SERVER__PORT", Some("9000")));
        vars.push(("COGNITAX__INGESTION__MALFORMED_ENTRY_POLICY", Some("skip")));
        vars.push(("COGNITAX__GEMINI__MAX_POLL_ATTEMPTS", Some("5")));
        temp_env::with_vars(vars, || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.gemini.max_poll_attempts, 5);
            assert_eq!(
                config.ingestion.malformed_entry_policy,
                MalformedEntryPolicy::Skip
            );
        });
    }

    #[test]
    fn test_load_fails_without_required_sections() {
        temp_env::with_vars_unset(
            ["COGNITAX__DATABASE__URL", "COGNITAX__JWT__SECRET", "COGNITAX__GEMINI__API_KEY"],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_gemini_settings_debug_hides_key() {
        temp_env::with_vars(REQUIRED, || {
            let config = AppConfig::load().unwrap();
            let debug = format!("{:?}", config.gemini);
            assert!(!debug.contains("test-key"));
            assert!(debug.contains("[hidden]"));
        });
    }
}
