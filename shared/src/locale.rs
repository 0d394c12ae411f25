// Label lookup for the two supported UI locales. Pure table, no state.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::models::TimeFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::ZhTw, Locale::En];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::ZhTw => "zh-TW",
            Locale::En => "en",
        }
    }

    /// Short label shown on the locale switch.
    pub fn switch_label(&self) -> &'static str {
        match self {
            Locale::ZhTw => "繁中",
            Locale::En => "EN",
        }
    }

    /// BCP 47 tag handed to the time-scale localization of the renderer.
    pub fn time_scale_locale(&self) -> &'static str {
        match self {
            Locale::ZhTw => "zh-TW",
            Locale::En => "en-US",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == s.trim())
            .ok_or_else(|| ModelError::UnknownLocale(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    AppName,
    Notifications,
    Time,
    Open,
    Close,
    High,
    Low,
    Change,
    Volume,
    Frame(TimeFrame),
    /// 1-based month number; out-of-range values are clamped.
    Month(u32),
}

const MONTHS_ZH: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];
const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn translate(locale: Locale, key: TranslationKey) -> &'static str {
    use TranslationKey::*;
    match (locale, key) {
        (_, AppName) => "CryptoChart",
        (Locale::ZhTw, Notifications) => "通知",
        (Locale::En, Notifications) => "Notifications",
        (Locale::ZhTw, Time) => "時間",
        (Locale::En, Time) => "Time",
        (Locale::ZhTw, Open) => "開盤",
        (Locale::En, Open) => "Open",
        (Locale::ZhTw, Close) => "收盤",
        (Locale::En, Close) => "Close",
        (Locale::ZhTw, High) => "最高",
        (Locale::En, High) => "High",
        (Locale::ZhTw, Low) => "最低",
        (Locale::En, Low) => "Low",
        (Locale::ZhTw, Change) => "漲跌幅",
        (Locale::En, Change) => "Change",
        (Locale::ZhTw, Volume) => "成交量",
        (Locale::En, Volume) => "Volume",
        (Locale::ZhTw, Frame(tf)) => match tf {
            TimeFrame::Minute15 => "15 分鐘",
            TimeFrame::Hour1 => "1 小時",
            TimeFrame::Hour4 => "4 小時",
            TimeFrame::Day1 => "1 天",
        },
        (Locale::En, Frame(tf)) => match tf {
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "1H",
            TimeFrame::Hour4 => "4H",
            TimeFrame::Day1 => "1D",
        },
        (locale, Month(m)) => {
            let idx = m.clamp(1, 12) as usize - 1;
            match locale {
                Locale::ZhTw => MONTHS_ZH[idx],
                Locale::En => MONTHS_EN[idx],
            }
        }
    }
}
