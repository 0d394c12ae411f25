// Handler for crosshair moves: resolves tooltip metrics for the active cursor.
use shared::models::TimePoint;

use super::{ChartEvent, SessionContext};
use crate::services::lookup::{resolve, Metrics};

pub(super) async fn handle_cursor_moved(ctx: &SessionContext, cursor: Option<TimePoint>) -> Option<Metrics> {
    if ctx.is_disposed() {
        return None;
    }

    let mut state = ctx.state.lock().await;
    state.cursor = cursor;

    let metrics = match cursor {
        Some(time) => {
            let registry = ctx.registry.read().await;
            let resolved = registry
                .peek(state.timeframe)
                .and_then(|dataset| resolve(dataset, &time, state.timeframe, state.color_scheme));
            if resolved.is_none() {
                tracing::trace!(timeframe = %state.timeframe, %time, "No bar under cursor");
            }
            resolved
        }
        None => None,
    };

    ctx.publish(ChartEvent::TooltipChanged(metrics.clone()));
    metrics
}

/// Metrics for the stored cursor against the current dataset.
pub(super) async fn current_tooltip(ctx: &SessionContext) -> Option<Metrics> {
    let state = ctx.state.lock().await;
    let cursor = state.cursor?;
    let registry = ctx.registry.read().await;
    registry
        .peek(state.timeframe)
        .and_then(|dataset| resolve(dataset, &cursor, state.timeframe, state.color_scheme))
}
