// Scheme-specific chart colors. The stored data only carries up/down tags;
// which color an "up" bar gets is decided here.
use serde::Serialize;

use crate::models::{ColorScheme, ColorTag};

const TEAL: &str = "#26a69a";
const RED: &str = "#ef5350";
const TEAL_ALPHA: &str = "rgba(38, 166, 154, 0.5)";
const RED_ALPHA: &str = "rgba(239, 83, 80, 0.5)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemePalette {
    pub up: &'static str,
    pub down: &'static str,
    // Volume histogram colors.
    pub up_alpha: &'static str,
    pub down_alpha: &'static str,
}

impl SchemePalette {
    pub fn green_red() -> Self {
        Self {
            up: TEAL,
            down: RED,
            up_alpha: TEAL_ALPHA,
            down_alpha: RED_ALPHA,
        }
    }

    pub fn red_green() -> Self {
        Self {
            up: RED,
            down: TEAL,
            up_alpha: RED_ALPHA,
            down_alpha: TEAL_ALPHA,
        }
    }

    pub fn candle_color(&self, tag: ColorTag) -> &'static str {
        match tag {
            ColorTag::Up => self.up,
            ColorTag::Down => self.down,
        }
    }

    pub fn volume_color(&self, tag: ColorTag) -> &'static str {
        match tag {
            ColorTag::Up => self.up_alpha,
            ColorTag::Down => self.down_alpha,
        }
    }
}

impl ColorScheme {
    pub fn palette(&self) -> SchemePalette {
        match self {
            ColorScheme::GreenRed => SchemePalette::green_red(),
            ColorScheme::RedGreen => SchemePalette::red_green(),
        }
    }
}
