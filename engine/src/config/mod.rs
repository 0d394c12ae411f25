// Engine configuration module
pub mod chart;
pub mod settings;

use serde::Deserialize;

pub use chart::ChartConfig;
pub use settings::{BackfillAnchor, EngineSettings, PaginationSettings, WindowCounts, MAX_SERIES_LEN};

use crate::error::EngineResult;

/// Whole configuration document: engine settings plus the host chart inputs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub version: String,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Loads the configuration embedded at build time.
    pub fn load_default() -> EngineResult<Self> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json_str(config_str)
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.engine.validate()?;
        config.chart.validate()?;
        tracing::debug!(version = %config.version, "Configuration loaded");
        Ok(config)
    }
}
