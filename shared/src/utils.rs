// Small helpers shared by the engine and the presentation layer.
use crate::models::{TimeFrame, TimePoint};

/// Rounds a price to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Tooltip label for a bar time, in UTC. Coarser timeframes drop the parts
/// that never vary for them.
pub fn format_time(time: &TimePoint, timeframe: TimeFrame) -> String {
    let Some(dt) = time.to_datetime() else {
        return time.to_string();
    };
    match timeframe {
        TimeFrame::Day1 => dt.format("%Y-%m-%d").to_string(),
        TimeFrame::Hour4 | TimeFrame::Hour1 => dt.format("%Y-%m-%d %H:00").to_string(),
        TimeFrame::Minute15 => dt.format("%Y-%m-%d %H:%M").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(100.005_1), 100.01);
        assert_eq!(round_to_cents(99.994), 99.99);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_format_time_per_timeframe() {
        // 2026-01-01 13:45:00 UTC
        let t = TimePoint::Unix(1_767_275_100);
        assert_eq!(format_time(&t, TimeFrame::Minute15), "2026-01-01 13:45");
        assert_eq!(format_time(&t, TimeFrame::Hour1), "2026-01-01 13:00");
        assert_eq!(format_time(&t, TimeFrame::Hour4), "2026-01-01 13:00");

        let d: TimePoint = "2025-12-31".parse().unwrap();
        assert_eq!(format_time(&d, TimeFrame::Day1), "2025-12-31");
    }
}
