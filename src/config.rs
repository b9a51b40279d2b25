use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::pricing::currency::validate_currency_code;
use crate::workflow::ApprovalPolicy;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Quote approval thresholds, both compared strictly.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ApprovalConfig {
    /// Base currency grand total above which a quote needs approval
    #[serde(default = "default_quote_value_threshold")]
    #[validate(custom = "validate_non_negative")]
    pub quote_value_threshold: Decimal,

    /// Line discount percent above which a quote needs approval
    #[serde(default = "default_quote_discount_threshold")]
    #[validate(custom = "validate_percent")]
    pub quote_discount_threshold: Decimal,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            quote_value_threshold: default_quote_value_threshold(),
            quote_discount_threshold: default_quote_discount_threshold(),
        }
    }
}

impl ApprovalConfig {
    pub fn policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::new(self.quote_value_threshold, self.quote_discount_threshold)
    }
}

/// Exporter details printed on every document letterhead.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, default = "CompanyProfile::sample")]
pub struct CompanyProfile {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// GSTIN or equivalent
    pub tax_id: Option<String>,
    /// Importer-Exporter Code
    pub iec_code: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub bank_swift: Option<String>,
    pub bank_ifsc: Option<String>,
    /// Name printed under "For <company>" in the signature block
    pub signatory: Option<String>,
}

impl CompanyProfile {
    pub fn sample() -> Self {
        Self {
            name: "Tradedocs Exports Pvt. Ltd.".to_string(),
            address: "Plot 12, SIPCOT Industrial Estate\nChennai 600058, India".to_string(),
            phone: Some("+91 44 2625 0000".to_string()),
            email: Some("exports@tradedocs.example".to_string()),
            tax_id: Some("33AABCT1234F1Z5".to_string()),
            iec_code: Some("0412345678".to_string()),
            bank_name: Some("State Bank of India, Ambattur".to_string()),
            bank_account: Some("00000012345678901".to_string()),
            bank_swift: Some("SBININBB474".to_string()),
            bank_ifsc: Some("SBIN0001234".to_string()),
            signatory: Some("Authorised Signatory".to_string()),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default = "default_true_bool")]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Default page size for paginated API responses
    #[serde(default = "default_api_page_size")]
    pub api_default_page_size: u64,

    /// Maximum page size allowed for paginated API responses
    #[serde(default = "default_api_max_page_size")]
    pub api_max_page_size: u64,

    /// Maximum upload size in bytes for CSV files
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Accounting currency used for approval thresholds and base amounts
    #[serde(default = "default_base_currency")]
    #[validate(custom = "validate_currency_code")]
    pub base_currency: String,

    /// Currency assumed for new documents when none is given
    #[serde(default = "default_currency")]
    #[validate(custom = "validate_currency_code")]
    pub default_currency: String,

    #[serde(default)]
    #[validate]
    pub approval: ApprovalConfig,

    #[serde(default = "CompanyProfile::sample")]
    #[validate]
    pub company: CompanyProfile,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the essentials.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            api_default_page_size: default_api_page_size(),
            api_max_page_size: default_api_max_page_size(),
            max_upload_bytes: default_max_upload_bytes(),
            base_currency: default_base_currency(),
            default_currency: default_currency(),
            approval: ApprovalConfig::default(),
            company: CompanyProfile::sample(),
        }
    }

    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        self.approval.policy()
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Clamps a requested page size to the configured bounds.
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.api_default_page_size)
            .clamp(1, self.api_max_page_size.max(1))
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.api_default_page_size > self.api_max_page_size {
            let mut err = ValidationError::new("api_default_page_size");
            err.message = Some("api_default_page_size cannot exceed api_max_page_size".into());
            errors.add("api_default_page_size", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    30
}

fn default_true_bool() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_api_page_size() -> u64 {
    20
}

fn default_api_max_page_size() -> u64 {
    100
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_base_currency() -> String {
    "INR".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_quote_value_threshold() -> Decimal {
    ApprovalPolicy::default().value_threshold
}

fn default_quote_discount_threshold() -> Decimal {
    ApprovalPolicy::default().discount_threshold
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("value cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validate_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percent");
        err.message = Some("value must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("tradedocs_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Same layering as [`load_config`], reading the files from `dir`.
pub fn load_config_from(dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let default_file = dir.join("default");
    let env_file = dir.join(run_env);
    let config = Config::builder()
        .set_default("database_url", "sqlite://tradedocs.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!(
        environment = %app_config.environment,
        base_currency = %app_config.base_currency,
        "Configuration loaded successfully"
    );
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let mut cfg = base_config();
        cfg.environment = "development".into();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
        assert_eq!(cfg.base_currency, "INR");
        assert_eq!(cfg.default_currency, "USD");
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_dev_allows_override_flag() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn non_dev_with_origins_passes() {
        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some("https://example.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn rejects_bad_currency_and_log_level() {
        let mut cfg = base_config();
        cfg.base_currency = "rupees".into();
        cfg.log_level = "loud".into();
        let errors = cfg.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("base_currency"));
        assert!(fields.contains_key("log_level"));
    }

    #[test]
    fn rejects_out_of_range_discount_threshold() {
        let mut cfg = base_config();
        cfg.approval.quote_discount_threshold = dec!(120);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_event_channel_capacity_is_rejected() {
        let mut cfg = base_config();
        cfg.environment = "development".into();
        cfg.event_channel_capacity = 0;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("event_channel_capacity"));

        cfg.event_channel_capacity = 1;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn page_size_is_clamped() {
        let cfg = base_config();
        assert_eq!(cfg.page_size(None), 20);
        assert_eq!(cfg.page_size(Some(0)), 1);
        assert_eq!(cfg.page_size(Some(1000)), 100);
    }

    #[test]
    fn approval_policy_comes_from_config() {
        let mut cfg = base_config();
        cfg.approval.quote_value_threshold = dec!(1000);
        let policy = cfg.approval_policy();
        assert!(policy.requires_approval(dec!(1000.01), dec!(0)));
        assert!(!policy.requires_approval(dec!(1000), dec!(0)));
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = config_dir(&[
            (
                "default.toml",
                r#"
                database_url = "sqlite::memory:"
                environment = "development"
                port = 9090

                [approval]
                quote_value_threshold = "750000"
                "#,
            ),
            ("staging.toml", "port = 9191\n"),
        ]);

        let cfg = load_config_from(dir.path(), "staging").unwrap();
        assert_eq!(cfg.port, 9191);
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.approval.quote_value_threshold, dec!(750000));
        assert_eq!(cfg.approval.quote_discount_threshold, dec!(10));
    }

    #[test]
    fn missing_directory_falls_back_to_built_in_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("absent"), "development").unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn unknown_approval_keys_are_rejected() {
        let dir = config_dir(&[(
            "default.toml",
            "environment = \"development\"\n[approval]\nvalue_limit = \"1\"\n",
        )]);
        assert!(load_config_from(dir.path(), "development").is_err());
    }
}
