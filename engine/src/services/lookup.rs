// Point lookups behind the crosshair tooltip and the price header.
use serde::Serialize;
use shared::models::{ColorScheme, Dataset, TimeFrame, TimePoint};
use shared::utils::format_time;

/// Everything the tooltip shows for one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub time: TimePoint,
    pub time_label: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub change_percent: f64,
    pub is_up: bool,
}

/// Percentage change from `prev_close` to `close`; 0 when `prev_close` is 0.
pub fn change_percent(close: f64, prev_close: f64) -> f64 {
    if prev_close == 0.0 {
        return 0.0;
    }
    (close - prev_close) / prev_close * 100.0
}

/// Resolves the bar at exactly `cursor`'s epoch. `None` when no bar matches.
pub fn resolve(
    dataset: &Dataset,
    cursor: &TimePoint,
    timeframe: TimeFrame,
    scheme: ColorScheme,
) -> Option<Metrics> {
    let epoch = cursor.epoch_millis();
    let index = dataset.position_of(epoch)?;
    let bar = &dataset.candlestick[index];

    let prev_close = match index {
        0 => bar.open,
        i => dataset.candlestick[i - 1].close,
    };

    // Aligned index first, search as fallback.
    let volume = dataset
        .volume
        .get(index)
        .filter(|v| v.time.epoch_millis() == epoch)
        .or_else(|| dataset.volume.iter().find(|v| v.time.epoch_millis() == epoch))
        .map_or(0.0, |v| v.value);

    Some(Metrics {
        time: bar.time,
        time_label: format_time(&bar.time, timeframe),
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume,
        change_percent: change_percent(bar.close, prev_close),
        is_up: scheme.is_up(bar),
    })
}

/// Header line: latest price and its move against the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub latest_price: f64,
    pub previous_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub is_positive: bool,
}

pub fn summarize(dataset: &Dataset, scheme: ColorScheme) -> PriceSummary {
    let bars = &dataset.candlestick;
    let latest_price = bars.last().map_or(0.0, |b| b.close);
    let previous_price = bars.len().checked_sub(2).map_or(0.0, |i| bars[i].close);
    let change = latest_price - previous_price;
    let is_positive = match scheme {
        ColorScheme::GreenRed => change >= 0.0,
        ColorScheme::RedGreen => change < 0.0,
    };

    PriceSummary {
        latest_price,
        previous_price,
        change,
        change_percent: change_percent(latest_price, previous_price),
        is_positive,
    }
}
