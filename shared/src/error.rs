use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown timeframe: '{0}'. Use '15m', '1h', '4h' or '1d'.")]
    UnknownTimeframe(String),

    #[error("Unknown color scheme: '{0}'. Use 'greenRed' or 'redGreen'.")]
    UnknownColorScheme(String),

    #[error("Unknown locale: '{0}'. Use 'zh-TW' or 'en'.")]
    UnknownLocale(String),

    #[error("Invalid time point: '{0}'")]
    InvalidTimePoint(String),

    #[error("Epoch {0} ms is outside the representable calendar range")]
    TimeOutOfRange(i64),

    #[error("Series misaligned: {bars} bars vs {volumes} volume entries")]
    MisalignedSeries { bars: usize, volumes: usize },
}
