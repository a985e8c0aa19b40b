use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::errors::{LinkforgeError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Which code generation strategy the node runs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GeneratorStrategy {
    /// Single process only
    Counter,
    /// Time + node + sequence, safe across nodes
    #[default]
    Distributed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CacheType {
    #[default]
    Memory,
    Null,
}

/// What the click tracker does with an event when its queue is full
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    DiscardOldest,
    DiscardNewest,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnalyticsSourceKind {
    /// Remote aggregation service
    #[default]
    Http,
    /// Aggregate the local click_events table
    Local,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OwnerMode {
    #[default]
    Static,
    Http,
}

/// Static configuration (TOML file + environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub click_tracker: ClickTrackerConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub owners: OwnersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// Load configuration from a TOML file and environment variables
    ///
    /// Priority: ENV > file > defaults
    /// ENV prefix: LF, separator: __
    /// Example: LF__GENERATOR__NODE_ID=7
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// Reject values no component can run with
    pub fn validate(&self) -> Result<()> {
        if self.generator.node_id > crate::generator::MAX_NODE_ID {
            return Err(LinkforgeError::validation(format!(
                "generator.node_id must be within 0..={}, got {}",
                crate::generator::MAX_NODE_ID,
                self.generator.node_id
            )));
        }
        if self.generator.max_allocation_attempts == 0 {
            return Err(LinkforgeError::validation(
                "generator.max_allocation_attempts must be at least 1",
            ));
        }
        if self.links.default_expiry_days == 0
            || self.links.default_expiry_days > self.links.max_expiry_days
        {
            return Err(LinkforgeError::validation(format!(
                "links.default_expiry_days must be within 1..={}",
                self.links.max_expiry_days
            )));
        }
        if self.click_tracker.workers == 0 {
            return Err(LinkforgeError::validation(
                "click_tracker.workers must be at least 1",
            ));
        }
        if self.click_tracker.queue_capacity == 0 {
            return Err(LinkforgeError::validation(
                "click_tracker.queue_capacity must be at least 1",
            ));
        }

        let cb = &self.analytics.circuit_breaker;
        if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 100.0) {
            return Err(LinkforgeError::validation(format!(
                "analytics.circuit_breaker.failure_rate_threshold must be within (0, 100], got {}",
                cb.failure_rate_threshold
            )));
        }
        if cb.sliding_window_size == 0 {
            return Err(LinkforgeError::validation(
                "analytics.circuit_breaker.sliding_window_size must be at least 1",
            ));
        }
        if cb.permitted_calls_half_open == 0 {
            return Err(LinkforgeError::validation(
                "analytics.circuit_breaker.permitted_calls_half_open must be at least 1",
            ));
        }
        Ok(())
    }

    /// Render the defaults as a TOML document
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LinkforgeError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    #[serde(default)]
    pub cache_type: CacheType,
    /// Upper bound on how long an entry stays cached, in seconds
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub strategy: GeneratorStrategy,
    /// Must be unique per process in a deployment
    #[serde(default = "default_node_id")]
    pub node_id: u64,
    #[serde(default = "default_counter_offset")]
    pub counter_offset: u64,
    /// Custom epoch for the distributed strategy, unix milliseconds
    #[serde(default = "default_epoch_ms")]
    pub epoch_ms: u64,
    #[serde(default = "default_max_backward_wait_ms")]
    pub max_backward_wait_ms: u64,
    #[serde(default = "default_max_allocation_attempts")]
    pub max_allocation_attempts: u32,
}

impl GeneratorConfig {
    pub fn max_backward_wait(&self) -> Duration {
        Duration::from_millis(self.max_backward_wait_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: u32,
    #[serde(default = "default_max_expiry_days")]
    pub max_expiry_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickTrackerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tracker_workers")]
    pub workers: usize,
    #[serde(default = "default_tracker_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
    #[serde(default = "default_analytics_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub source: AnalyticsSourceKind,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

impl AnalyticsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Percentage of failed calls in the window that opens the circuit
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f64,
    #[serde(default = "default_sliding_window_size")]
    pub sliding_window_size: usize,
    #[serde(default = "default_minimum_calls")]
    pub minimum_calls: usize,
    #[serde(default = "default_wait_duration_open_ms")]
    pub wait_duration_open_ms: u64,
    #[serde(default = "default_permitted_calls_half_open")]
    pub permitted_calls_half_open: usize,
}

impl CircuitBreakerConfig {
    pub fn wait_duration_open(&self) -> Duration {
        Duration::from_millis(self.wait_duration_open_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnersConfig {
    #[serde(default)]
    pub mode: OwnerMode,
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    /// username -> owner id, used by the static directory
    #[serde(default)]
    pub users: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_database_url() -> String {
    "sqlite://linkforge.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_capacity() -> u64 {
    10000
}

fn default_node_id() -> u64 {
    1
}

fn default_counter_offset() -> u64 {
    1_000_000
}

fn default_epoch_ms() -> u64 {
    // 2025-01-01T00:00:00Z
    1_735_689_600_000
}

fn default_max_backward_wait_ms() -> u64 {
    5
}

fn default_max_allocation_attempts() -> u32 {
    10
}

fn default_expiry_days() -> u32 {
    7
}

fn default_max_expiry_days() -> u32 {
    3650
}

fn default_tracker_workers() -> usize {
    2
}

fn default_tracker_queue_capacity() -> usize {
    100
}

fn default_analytics_base_url() -> String {
    "http://127.0.0.1:8082".to_string()
}

fn default_analytics_timeout_ms() -> u64 {
    2000
}

fn default_failure_rate_threshold() -> f64 {
    50.0
}

fn default_sliding_window_size() -> usize {
    10
}

fn default_minimum_calls() -> usize {
    5
}

fn default_wait_duration_open_ms() -> u64 {
    30_000
}

fn default_permitted_calls_half_open() -> usize {
    3
}

fn default_auth_base_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::default(),
            default_ttl: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: GeneratorStrategy::default(),
            node_id: default_node_id(),
            counter_offset: default_counter_offset(),
            epoch_ms: default_epoch_ms(),
            max_backward_wait_ms: default_max_backward_wait_ms(),
            max_allocation_attempts: default_max_allocation_attempts(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: default_expiry_days(),
            max_expiry_days: default_max_expiry_days(),
        }
    }
}

impl Default for ClickTrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: default_tracker_workers(),
            queue_capacity: default_tracker_queue_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_base_url(),
            timeout_ms: default_analytics_timeout_ms(),
            source: AnalyticsSourceKind::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: default_failure_rate_threshold(),
            sliding_window_size: default_sliding_window_size(),
            minimum_calls: default_minimum_calls(),
            wait_duration_open_ms: default_wait_duration_open_ms(),
            permitted_calls_half_open: default_permitted_calls_half_open(),
        }
    }
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            mode: OwnerMode::default(),
            auth_base_url: default_auth_base_url(),
            users: HashMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: true,
            max_backups: default_max_backups(),
        }
    }
}
