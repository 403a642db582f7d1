// ==========================================
// Kitchen AI - Configuration Layer
// ==========================================
// Storage: config_kv table, global scope
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::{config_keys, ConfigManager, StaticConfig, DEFAULT_ORGANIZATION_ID};
pub use import_config_trait::{ConfigResult, ImportConfigReader, ImportSettings};
