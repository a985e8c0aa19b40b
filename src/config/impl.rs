use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the process-wide configuration
///
/// Returns the in-memory defaults when `init_config()` has not run yet.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the process-wide configuration from a TOML file plus `LF__*`
/// environment overrides. Only the binary uses this; library components take
/// their settings as arguments.
pub fn init_config(path: Option<&str>) -> Arc<StaticConfig> {
    let loaded = StaticConfig::load(path.unwrap_or(super::DEFAULT_CONFIG_PATH));
    let slot = CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()));
    slot.store(Arc::new(loaded));
    slot.load_full()
}
