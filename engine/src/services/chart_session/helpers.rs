// Conversions from stored datasets to what the rendering collaborator draws.
use serde::Serialize;
use shared::models::{Bar, ColorScheme, Dataset, TimePoint};
use shared::theme::SchemePalette;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColoredVolume {
    pub time: TimePoint,
    pub value: f64,
    pub color: &'static str,
}

/// Ordered candles plus the volume histogram with colors already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub candlestick: Vec<Bar>,
    pub volume: Vec<ColoredVolume>,
    pub palette: SchemePalette,
}

pub fn to_render_frame(dataset: &Dataset, scheme: ColorScheme) -> RenderFrame {
    let palette = scheme.palette();
    let volume = dataset
        .volume
        .iter()
        .zip(&dataset.candlestick)
        .map(|(vol, bar)| {
            let tag = vol.color_tag.unwrap_or_else(|| bar.color_tag());
            ColoredVolume {
                time: vol.time,
                value: vol.value,
                color: palette.volume_color(tag),
            }
        })
        .collect();

    RenderFrame {
        candlestick: dataset.candlestick.clone(),
        volume,
        palette,
    }
}
