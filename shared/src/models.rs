use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Time of a bar as handed to the renderer: a calendar date for daily bars,
/// Unix seconds for everything finer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimePoint {
    Date(NaiveDate),
    Unix(i64),
}

impl TimePoint {
    /// Builds the representation `timeframe` uses for the instant `millis`.
    /// Daily timeframes truncate to the UTC calendar date.
    pub fn from_epoch_millis(timeframe: TimeFrame, millis: i64) -> Result<Self, ModelError> {
        if timeframe.is_daily() {
            DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|dt| TimePoint::Date(dt.date_naive()))
                .ok_or(ModelError::TimeOutOfRange(millis))
        } else {
            Ok(TimePoint::Unix(millis.div_euclid(1000)))
        }
    }

    /// Resolved epoch in milliseconds. Dates resolve to UTC midnight.
    pub fn epoch_millis(&self) -> i64 {
        match self {
            TimePoint::Date(date) => date.and_time(NaiveTime::MIN).and_utc().timestamp_millis(),
            TimePoint::Unix(secs) => secs.saturating_mul(1000),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.epoch_millis())
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePoint::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            TimePoint::Unix(secs) => write!(f, "{}", secs),
        }
    }
}

impl FromStr for TimePoint {
    type Err = ModelError;

    // "2026-01-01" or "1767225600"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(secs) = trimmed.parse::<i64>() {
            return Ok(TimePoint::Unix(secs));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(TimePoint::Date)
            .map_err(|_| ModelError::InvalidTimePoint(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: TimePoint,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn epoch_millis(&self) -> i64 {
        self.time.epoch_millis()
    }

    /// Raw direction of the bar, independent of any color scheme.
    pub fn color_tag(&self) -> ColorTag {
        if self.close >= self.open {
            ColorTag::Up
        } else {
            ColorTag::Down
        }
    }

    /// `low <= min(open, close)` and `high >= max(open, close)`.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeBar {
    pub time: TimePoint,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_tag: Option<ColorTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 4] = [
        TimeFrame::Minute15,
        TimeFrame::Hour1,
        TimeFrame::Hour4,
        TimeFrame::Day1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
        }
    }

    pub fn interval_ms(&self) -> i64 {
        match self {
            TimeFrame::Minute15 => 15 * 60 * 1000,
            TimeFrame::Hour1 => 60 * 60 * 1000,
            TimeFrame::Hour4 => 4 * 60 * 60 * 1000,
            TimeFrame::Day1 => 24 * 60 * 60 * 1000,
        }
    }

    pub fn volatility(&self) -> f64 {
        match self {
            TimeFrame::Minute15 => 0.005,
            TimeFrame::Hour1 => 0.01,
            TimeFrame::Hour4 => 0.02,
            TimeFrame::Day1 => 0.03,
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, TimeFrame::Day1)
    }

    /// First character code of the label times 1000. "15m", "1h" and "1d"
    /// all share the same base seed.
    pub fn seed_base(&self) -> i64 {
        let first = self.label().chars().next().map_or(0, |c| c as i64);
        first * 1000
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::ALL
            .into_iter()
            .find(|tf| tf.label() == s.trim())
            .ok_or_else(|| ModelError::UnknownTimeframe(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    #[default]
    GreenRed,
    RedGreen,
}

impl ColorScheme {
    /// Display classification of a bar. `RedGreen` inverts the meaning, so a
    /// falling bar counts as "up" there.
    pub fn is_up(&self, bar: &Bar) -> bool {
        match self {
            ColorScheme::GreenRed => bar.close >= bar.open,
            ColorScheme::RedGreen => bar.close < bar.open,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorScheme::GreenRed => "greenRed",
            ColorScheme::RedGreen => "redGreen",
        }
    }
}

impl FromStr for ColorScheme {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "greenRed" => Ok(ColorScheme::GreenRed),
            "redGreen" => Ok(ColorScheme::RedGreen),
            other => Err(ModelError::UnknownColorScheme(other.to_string())),
        }
    }
}

/// Candles plus the volume histogram for one timeframe. Both sequences are
/// ascending by resolved epoch and index-aligned by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub candlestick: Vec<Bar>,
    pub volume: Vec<VolumeBar>,
}

impl Dataset {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candlestick: Vec::with_capacity(capacity),
            volume: Vec::with_capacity(capacity),
        }
    }

    /// Appends a bar and its volume entry at the same time.
    pub fn push(&mut self, bar: Bar, volume: f64) {
        self.volume.push(VolumeBar {
            time: bar.time,
            value: volume,
            color_tag: Some(bar.color_tag()),
        });
        self.candlestick.push(bar);
    }

    pub fn len(&self) -> usize {
        self.candlestick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candlestick.is_empty()
    }

    pub fn earliest(&self) -> Option<&Bar> {
        self.candlestick.first()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.candlestick.last()
    }

    /// Strictly ascending by resolved epoch.
    pub fn is_time_sorted(&self) -> bool {
        self.candlestick
            .windows(2)
            .all(|w| w[0].epoch_millis() < w[1].epoch_millis())
    }

    pub fn is_aligned(&self) -> bool {
        self.candlestick.len() == self.volume.len()
            && self
                .candlestick
                .iter()
                .zip(&self.volume)
                .all(|(bar, vol)| bar.epoch_millis() == vol.time.epoch_millis())
    }

    pub fn check_aligned(&self) -> Result<(), ModelError> {
        if self.is_aligned() {
            Ok(())
        } else {
            Err(ModelError::MisalignedSeries {
                bars: self.candlestick.len(),
                volumes: self.volume.len(),
            })
        }
    }

    /// Index of the bar whose resolved epoch equals `epoch_ms`.
    pub fn position_of(&self, epoch_ms: i64) -> Option<usize> {
        self.candlestick
            .binary_search_by_key(&epoch_ms, |bar| bar.epoch_millis())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(time: TimePoint, open: f64, close: f64) -> Bar {
        Bar { time, open, high: open.max(close), low: open.min(close), close }
    }

    #[test]
    fn test_time_point_resolution() {
        let date = TimePoint::Date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(date.epoch_millis(), 1_767_225_600_000);
        assert_eq!(TimePoint::Unix(1_767_225_600).epoch_millis(), 1_767_225_600_000);
    }

    #[test]
    fn test_time_point_from_epoch_per_timeframe() {
        let ms = 1_767_225_600_000 + 3 * 60 * 60 * 1000;
        assert_eq!(
            TimePoint::from_epoch_millis(TimeFrame::Day1, ms).unwrap(),
            TimePoint::Date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        );
        assert_eq!(
            TimePoint::from_epoch_millis(TimeFrame::Hour1, ms).unwrap(),
            TimePoint::Unix(1_767_236_400)
        );
    }

    #[test]
    fn test_time_point_wire_shape() {
        let date: TimePoint = "2026-01-02".parse().unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2026-01-02\"");
        assert_eq!(serde_json::to_string(&TimePoint::Unix(42)).unwrap(), "42");

        let back: TimePoint = serde_json::from_str("\"2026-01-02\"").unwrap();
        assert_eq!(back, date);
        let back: TimePoint = serde_json::from_str("42").unwrap();
        assert_eq!(back, TimePoint::Unix(42));
        assert!("yesterday".parse::<TimePoint>().is_err());
    }

    #[test]
    fn test_timeframe_constants() {
        assert_eq!(TimeFrame::Minute15.interval_ms(), 900_000);
        assert_eq!(TimeFrame::Hour1.interval_ms(), 3_600_000);
        assert_eq!(TimeFrame::Hour4.interval_ms(), 14_400_000);
        assert_eq!(TimeFrame::Day1.interval_ms(), 86_400_000);
        assert_eq!(TimeFrame::Hour4.volatility(), 0.02);
        assert_eq!(TimeFrame::Day1.seed_base(), 49_000);
        assert_eq!(TimeFrame::Hour4.seed_base(), 52_000);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("4h".parse::<TimeFrame>().unwrap(), TimeFrame::Hour4);
        assert_eq!(
            "2h".parse::<TimeFrame>(),
            Err(ModelError::UnknownTimeframe("2h".to_string()))
        );
        let json = serde_json::to_string(&TimeFrame::Minute15).unwrap();
        assert_eq!(json, "\"15m\"");
    }

    #[test]
    fn test_color_scheme_inverts_classification() {
        let falling = bar(TimePoint::Unix(0), 100.0, 90.0);
        assert!(!ColorScheme::GreenRed.is_up(&falling));
        assert!(ColorScheme::RedGreen.is_up(&falling));
        let flat = bar(TimePoint::Unix(0), 100.0, 100.0);
        assert!(ColorScheme::GreenRed.is_up(&flat));
        assert!(!ColorScheme::RedGreen.is_up(&flat));
        assert_eq!("redGreen".parse::<ColorScheme>().unwrap(), ColorScheme::RedGreen);
    }

    #[test]
    fn test_dataset_push_keeps_alignment() {
        let mut ds = Dataset::with_capacity(2);
        ds.push(bar(TimePoint::Unix(60), 1.0, 2.0), 10.0);
        ds.push(bar(TimePoint::Unix(120), 2.0, 1.5), 20.0);
        assert!(ds.is_aligned());
        assert!(ds.is_time_sorted());
        assert_eq!(ds.volume[0].color_tag, Some(ColorTag::Up));
        assert_eq!(ds.volume[1].color_tag, Some(ColorTag::Down));
        assert_eq!(ds.position_of(120_000), Some(1));
        assert_eq!(ds.position_of(90_000), None);

        ds.volume.pop();
        assert_eq!(
            ds.check_aligned(),
            Err(ModelError::MisalignedSeries { bars: 2, volumes: 1 })
        );
    }
}
