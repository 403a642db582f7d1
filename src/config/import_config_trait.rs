// ==========================================
// Kitchen AI - Import Config Reader Trait
// ==========================================
// Read side only: what the import pipeline needs from configuration.
// Implementations: ConfigManager (config_kv table), StaticConfig
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Rows per upsert request
    ///
    /// # Default
    /// - 100
    async fn get_batch_size(&self) -> ConfigResult<usize>;

    /// Organization stamped on every imported record
    ///
    /// # Default
    /// - "default"
    async fn get_organization_id(&self) -> ConfigResult<String>;

    /// Workbook sheet read when none is named; first sheet when None
    async fn get_default_sheet(&self) -> ConfigResult<Option<String>>;
}

/// Resolved snapshot of every import setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub batch_size: usize,
    pub organization_id: String,
    pub default_sheet: Option<String>,
}

impl ImportSettings {
    pub async fn load(reader: &dyn ImportConfigReader) -> ConfigResult<Self> {
        Ok(Self {
            batch_size: reader.get_batch_size().await?,
            organization_id: reader.get_organization_id().await?,
            default_sheet: reader.get_default_sheet().await?,
        })
    }
}
