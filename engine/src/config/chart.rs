// Host-facing chart inputs. Immutable once a session is mounted; later
// changes arrive through the session's setters.
use serde::Deserialize;
use shared::locale::Locale;
use shared::models::{ColorScheme, TimeFrame};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub symbol: String,
    pub height: u32,
    pub initial_timeframe: TimeFrame,
    pub color_scheme: ColorScheme,
    pub locale: Locale,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            symbol: "BTC/USDT".to_string(),
            height: 500,
            initial_timeframe: TimeFrame::Day1,
            color_scheme: ColorScheme::GreenRed,
            locale: Locale::ZhTw,
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("chart.symbol must not be empty".to_string()));
        }
        if self.height == 0 {
            return Err(EngineError::ConfigError("chart.height must be greater than 0".to_string()));
        }
        Ok(())
    }
}
