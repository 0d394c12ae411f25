// Engine settings: synthetic data shape and pagination timing.
use serde::Deserialize;
use shared::models::TimeFrame;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Upper bound for any generated series: a seeded window or one backward batch.
pub const MAX_SERIES_LEN: usize = 100_000;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub base_price: f64,
    pub window_counts: WindowCounts,
    pub pagination: PaginationSettings,
    pub backfill_anchor: BackfillAnchor,
}

/// Size of the pristine seeded window per timeframe.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct WindowCounts {
    #[serde(rename = "15m")]
    pub minute15: usize,
    #[serde(rename = "1h")]
    pub hour1: usize,
    #[serde(rename = "4h")]
    pub hour4: usize,
    #[serde(rename = "1d")]
    pub day1: usize,
}

impl WindowCounts {
    pub fn for_timeframe(&self, timeframe: TimeFrame) -> usize {
        match timeframe {
            TimeFrame::Minute15 => self.minute15,
            TimeFrame::Hour1 => self.hour1,
            TimeFrame::Hour4 => self.hour4,
            TimeFrame::Day1 => self.day1,
        }
    }
}

impl Default for WindowCounts {
    fn default() -> Self {
        WindowCounts {
            minute15: 96,
            hour1: 72,
            hour4: 60,
            day1: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PaginationSettings {
    /// Backward loading starts once the visible left edge drops below this logical index.
    pub edge_threshold: f64,
    pub batch_size: usize,
    /// Quiet period after mount during which the initial auto-fit cannot trigger a load.
    pub settle_ms: u64,
    pub cooldown_ms: u64,
}

impl PaginationSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            edge_threshold: 5.0,
            batch_size: 30,
            settle_ms: 500,
            cooldown_ms: 500,
        }
    }
}

/// Starting price of a backward batch.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackfillAnchor {
    /// Randomized around the base price; history is not price-continuous at the seam.
    #[default]
    Randomized,
    /// Rescaled so the newest generated close meets the current earliest open.
    Continuous,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            base_price: 100_000.0,
            window_counts: WindowCounts::default(),
            pagination: PaginationSettings::default(),
            backfill_anchor: BackfillAnchor::default(),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(EngineError::ConfigError(format!(
                "base_price must be a positive number, got {}",
                self.base_price
            )));
        }
        if !self.pagination.edge_threshold.is_finite() {
            return Err(EngineError::ConfigError(
                "pagination.edge_threshold must be finite".to_string(),
            ));
        }
        if !(1..=MAX_SERIES_LEN).contains(&self.pagination.batch_size) {
            return Err(EngineError::ConfigError(format!(
                "pagination.batch_size must be between 1 and {}, got {}",
                MAX_SERIES_LEN, self.pagination.batch_size
            )));
        }
        for timeframe in TimeFrame::ALL {
            let count = self.window_counts.for_timeframe(timeframe);
            if count > MAX_SERIES_LEN {
                return Err(EngineError::ConfigError(format!(
                    "window_counts.{} must be at most {}, got {}",
                    timeframe, MAX_SERIES_LEN, count
                )));
            }
        }
        Ok(())
    }
}
