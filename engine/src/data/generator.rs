// Synthetic OHLCV generation. Both entry points share one bar synthesis
// step so identical seeds and offsets give bit-identical series.
use shared::models::{Bar, Dataset, TimeFrame, TimePoint};
use shared::utils::round_to_cents;
use shared::ModelError;

use super::random::seeded_random;
use crate::config::MAX_SERIES_LEN;
use crate::error::{EngineError, EngineResult};

/// 2026-01-01T00:00:00Z, the first bar of every seeded window.
pub const FIXED_BASE_EPOCH_MS: i64 = 1_767_225_600_000;

/// Random draws consumed per bar: change, high, low, volume.
const SEED_STRIDE: i64 = 4;

struct BarSynth {
    timeframe: TimeFrame,
    seed: i64,
    price: f64,
}

impl BarSynth {
    fn new(timeframe: TimeFrame, seed: i64, price: f64) -> Self {
        Self { timeframe, seed, price }
    }

    fn next_bar(&mut self, time: TimePoint) -> (Bar, f64) {
        let volatility = self.timeframe.volatility();

        let change = (seeded_random(self.seed + 1) - 0.5) * 2.0 * volatility;
        let open = self.price;
        let close = open * (1.0 + change);
        let high = open.max(close) * (1.0 + seeded_random(self.seed + 2) * volatility * 0.5);
        let low = open.min(close) * (1.0 - seeded_random(self.seed + 3) * volatility * 0.5);
        let volume = (seeded_random(self.seed + 4) * 50_000.0).floor() + 10_000.0;

        self.seed += SEED_STRIDE;
        self.price = close;

        let bar = Bar {
            time,
            open: round_to_cents(open),
            high: round_to_cents(high),
            low: round_to_cents(low),
            close: round_to_cents(close),
        };
        (bar, volume)
    }
}

fn check_len(count: usize) -> EngineResult<()> {
    if count > MAX_SERIES_LEN {
        return Err(EngineError::ConfigError(format!(
            "cannot generate {} bars, limit is {}",
            count, MAX_SERIES_LEN
        )));
    }
    Ok(())
}

fn offset_epoch(base_ms: i64, steps: i64, interval_ms: i64) -> EngineResult<i64> {
    steps
        .checked_mul(interval_ms)
        .and_then(|delta| base_ms.checked_add(delta))
        .ok_or_else(|| ModelError::TimeOutOfRange(base_ms).into())
}

/// `count` consecutive bars walking forward from the fixed epoch anchor,
/// starting at `base_price`.
pub fn seed_window(timeframe: TimeFrame, base_price: f64, count: usize) -> EngineResult<Dataset> {
    check_len(count)?;
    let interval = timeframe.interval_ms();
    let mut synth = BarSynth::new(timeframe, timeframe.seed_base(), base_price);
    let mut dataset = Dataset::with_capacity(count);

    for i in 0..count {
        let epoch = offset_epoch(FIXED_BASE_EPOCH_MS, i as i64, interval)?;
        let (bar, volume) = synth.next_bar(TimePoint::from_epoch_millis(timeframe, epoch)?);
        dataset.push(bar, volume);
    }

    tracing::debug!(%timeframe, count, base_price, "Seeded synthetic window");
    Ok(dataset)
}

/// `count` consecutive bars ending one interval before `before_epoch_ms`,
/// oldest first. The starting price is randomized around `base_price`; see
/// [`anchor_to_open`] for a continuous seam.
pub fn extend_backward(
    timeframe: TimeFrame,
    base_price: f64,
    before_epoch_ms: i64,
    count: usize,
    seed_offset: i64,
) -> EngineResult<Dataset> {
    check_len(count)?;
    let interval = timeframe.interval_ms();
    let seed0 = timeframe.seed_base() + seed_offset;
    let start_price = base_price * (0.9 + seeded_random(seed0) * 0.2);
    let mut synth = BarSynth::new(timeframe, seed0, start_price);
    let mut dataset = Dataset::with_capacity(count);

    for steps_back in (1..=count as i64).rev() {
        let epoch = offset_epoch(before_epoch_ms, -steps_back, interval)?;
        let (bar, volume) = synth.next_bar(TimePoint::from_epoch_millis(timeframe, epoch)?);
        dataset.push(bar, volume);
    }

    tracing::debug!(
        %timeframe,
        count,
        seed_offset,
        before_epoch_ms,
        start_price,
        "Generated backward batch"
    );
    Ok(dataset)
}

/// Rescales every price in `batch` by one positive factor so its newest close
/// equals `next_open`. Direction tags are recomputed after re-rounding.
pub fn anchor_to_open(batch: &mut Dataset, next_open: f64) {
    let Some(last_close) = batch.latest().map(|bar| bar.close) else {
        return;
    };
    if !(last_close > 0.0 && next_open > 0.0 && next_open.is_finite()) {
        tracing::warn!(last_close, next_open, "Cannot anchor backward batch, leaving prices as generated");
        return;
    }

    let factor = next_open / last_close;
    for bar in batch.candlestick.iter_mut() {
        bar.open = round_to_cents(bar.open * factor);
        bar.high = round_to_cents(bar.high * factor);
        bar.low = round_to_cents(bar.low * factor);
        bar.close = round_to_cents(bar.close * factor);
    }
    if let Some(last) = batch.candlestick.last_mut() {
        last.close = round_to_cents(next_open);
        last.high = last.high.max(last.close);
        last.low = last.low.min(last.close);
    }
    for (bar, vol) in batch.candlestick.iter().zip(batch.volume.iter_mut()) {
        vol.color_tag = Some(bar.color_tag());
    }
}
