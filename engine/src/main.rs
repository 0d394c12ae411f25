// Headless chart driver: mounts a session from the embedded configuration,
// scrolls to the left edge a few times and logs what a renderer would draw.
use anyhow::{bail, Context};
use candle_engine::config::AppConfig;
use candle_engine::services::{ChartEvent, ChartSession, LogicalRange, PaginationState};
use shared::locale::TranslationKey;
use shared::models::TimeFrame;
use std::time::Duration;
use tracing::info;

const EDGE_SCROLLS: usize = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting candle chart engine...");

    let config = AppConfig::load_default().context("Failed to load default configuration")?;
    info!(
        version = %config.version,
        symbol = %config.chart.symbol,
        locale = config.chart.locale.switch_label(),
        time_scale = config.chart.locale.time_scale_locale(),
        "Loaded configuration"
    );

    // Optional first argument overrides the initial timeframe, e.g. `4h`.
    let timeframe = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<TimeFrame>()
            .with_context(|| format!("Invalid timeframe argument '{}'", arg))?,
        None => config.chart.initial_timeframe,
    };

    let session = ChartSession::with_config(&config).await?;
    if timeframe != session.timeframe().await {
        session.switch_timeframe(timeframe).await?;
    }
    let mut events = session.subscribe();

    let pagination = config.engine.pagination;
    tokio::time::sleep(pagination.settle()).await;

    for _ in 0..EDGE_SCROLLS {
        if !session.visible_range_changed(LogicalRange::new(0.0, 40.0)).await {
            bail!("Edge scroll did not start a history load");
        }
        loop {
            match events.recv().await.context("Chart event channel closed")? {
                ChartEvent::HistoryPrepended { added, total, .. } => {
                    info!(%timeframe, added, total, "History extended");
                    break;
                }
                other => tracing::debug!(?other, "Chart event"),
            }
        }
        tokio::time::sleep(pagination.cooldown()).await;
        while session.pagination_state().await != PaginationState::Idle {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    let frame = session.render_frame().await;
    if let (Some(first), Some(last)) = (frame.candlestick.first(), frame.candlestick.last()) {
        info!(
            bars = frame.candlestick.len(),
            first = %first.time,
            last = %last.time,
            last_color = frame.palette.candle_color(last.color_tag()),
            "Render frame ready"
        );
    }

    let summary = session.summary().await;
    info!(
        latest = summary.latest_price,
        change = summary.change,
        change_percent = summary.change_percent,
        positive = summary.is_positive,
        "Price summary"
    );

    if let Some(bar) = frame.candlestick.first() {
        if let Some(metrics) = session.cursor_moved(Some(bar.time)).await {
            info!(
                label = session.label(TranslationKey::Close).await,
                time = %metrics.time_label,
                close = metrics.close,
                change_percent = metrics.change_percent,
                volume = metrics.volume,
                "Cursor on earliest bar"
            );
        }
    }

    session.dispose().await;
    info!("Chart engine stopped.");
    Ok(())
}
