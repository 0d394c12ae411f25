// Handler for viewport range changes: backward pagination.
use shared::models::{Dataset, TimeFrame};
use tokio::time::Instant;

use super::{ChartEvent, SessionContext};
use crate::config::{BackfillAnchor, EngineSettings};
use crate::data::generator;
use crate::data::DatasetRegistry;
use crate::error::EngineResult;
use crate::services::lookup::resolve;
use crate::services::pagination::{LoadTicket, LogicalRange, TaskHandle};

/// Feeds the pagination machine and, on `Idle -> Loading`, spawns the load.
pub(super) async fn handle_visible_range(ctx: &SessionContext, range: LogicalRange) -> Option<TaskHandle> {
    if ctx.is_disposed() {
        return None;
    }

    let mut state = ctx.state.lock().await;
    let timeframe = state.timeframe;
    let dataset_len = ctx.registry.read().await.peek(timeframe).map_or(0, Dataset::len);

    match state.pager.on_visible_range(range, dataset_len, Instant::now()) {
        Ok(ticket) => {
            tracing::debug!(%timeframe, from = range.from, to = range.to, "Near left edge, loading older bars");
            Some(TaskHandle::spawn(run_load(ctx.clone(), timeframe, ticket)))
        }
        Err(reason) => {
            tracing::trace!(%timeframe, from = range.from, ?reason, "Viewport event ignored");
            None
        }
    }
}

async fn run_load(ctx: SessionContext, timeframe: TimeFrame, ticket: LoadTicket) {
    // Let the viewport handler return before generating.
    tokio::task::yield_now().await;

    {
        let mut state = ctx.state.lock().await;
        if ctx.is_disposed() || !state.pager.is_current(ticket) {
            tracing::debug!(%timeframe, ticket_epoch = ticket.mount_epoch, current_epoch = state.pager.mount_epoch(), "Dropping stale history load");
            return;
        }

        let mut registry = ctx.registry.write().await;
        match load_older(&mut registry, timeframe, &ctx.settings) {
            Ok((added, total)) => {
                tracing::info!(%timeframe, added, total, "Loaded older bars");
                ctx.publish(ChartEvent::HistoryPrepended { timeframe, added, total });

                if let (Some(cursor), Some(dataset)) = (state.cursor, registry.peek(timeframe)) {
                    let metrics = resolve(dataset, &cursor, timeframe, state.color_scheme);
                    ctx.publish(ChartEvent::TooltipChanged(metrics));
                }
            }
            Err(e) => {
                tracing::error!(%timeframe, error_detail = ?e, "Failed to load older bars");
            }
        }
        state.pager.complete_load(ticket);
    }

    tokio::time::sleep(ctx.settings.pagination.cooldown()).await;

    let mut state = ctx.state.lock().await;
    if state.pager.end_cooldown(ticket) {
        tracing::debug!(%timeframe, "Pagination cooldown over");
    }
}

/// Generates one backward batch before the current earliest bar and prepends
/// it. Returns `(added, total)`.
pub fn load_older(
    registry: &mut DatasetRegistry,
    timeframe: TimeFrame,
    settings: &EngineSettings,
) -> EngineResult<(usize, usize)> {
    let Some(earliest) = registry.get(timeframe)?.earliest().copied() else {
        return Ok((0, 0));
    };

    let load_count = registry.next_load_count(timeframe)?;
    let seed_offset = i64::from(load_count) * 1000;
    let mut batch = generator::extend_backward(
        timeframe,
        registry.base_price(),
        earliest.epoch_millis(),
        settings.pagination.batch_size,
        seed_offset,
    )?;
    if settings.backfill_anchor == BackfillAnchor::Continuous {
        generator::anchor_to_open(&mut batch, earliest.open);
    }

    let Dataset { candlestick, volume } = batch;
    let added = registry.prepend(timeframe, candlestick, volume)?;
    let total = registry.peek(timeframe).map_or(0, Dataset::len);
    Ok((added, total))
}
