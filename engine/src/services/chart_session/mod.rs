// engine/src/services/chart_session/mod.rs
// One mounted chart: owns the active timeframe, the pagination machine and the
// cursor, and dispatches host events to the handler submodules.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use shared::locale::{translate, Locale, TranslationKey};
use shared::models::{ColorScheme, Dataset, TimeFrame, TimePoint};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Instant;

use crate::config::{AppConfig, ChartConfig, EngineSettings};
use crate::data::DatasetRegistry;
use crate::error::{EngineError, EngineResult};
use crate::services::lookup::{summarize, Metrics, PriceSummary};
use crate::services::pagination::{LogicalRange, Pager, PaginationState, TaskHandle};

pub mod crosshair;
pub mod helpers;
pub mod load_history;

pub use helpers::{ColoredVolume, RenderFrame};

const EVENT_CAPACITY: usize = 64;

/// Notifications for the host and the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// The active dataset was swapped wholesale (mount or timeframe switch).
    DatasetReplaced { timeframe: TimeFrame, bars: usize },
    HistoryPrepended { timeframe: TimeFrame, added: usize, total: usize },
    TooltipChanged(Option<Metrics>),
    ColorSchemeChanged(ColorScheme),
    LocaleChanged(Locale),
}

pub(crate) struct SessionState {
    pub(crate) timeframe: TimeFrame,
    pub(crate) color_scheme: ColorScheme,
    pub(crate) locale: Locale,
    pub(crate) pager: Pager,
    pub(crate) cursor: Option<TimePoint>,
}

// Everything a spawned load needs. Lock order: `state` before `registry`.
#[derive(Clone)]
pub(crate) struct SessionContext {
    pub(crate) registry: Arc<RwLock<DatasetRegistry>>,
    pub(crate) state: Arc<Mutex<SessionState>>,
    pub(crate) events: broadcast::Sender<ChartEvent>,
    pub(crate) settings: Arc<EngineSettings>,
    pub(crate) disposed: Arc<AtomicBool>,
}

impl SessionContext {
    pub(crate) fn publish(&self, event: ChartEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No chart event subscribers");
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

pub struct ChartSession {
    ctx: SessionContext,
    symbol: String,
    height: u32,
    in_flight: StdMutex<Option<TaskHandle>>,
}

impl ChartSession {
    /// Mounts a chart on `registry`, creating the initial timeframe's dataset
    /// if needed. The settle period starts now.
    pub async fn mount(
        registry: Arc<RwLock<DatasetRegistry>>,
        settings: EngineSettings,
        config: &ChartConfig,
    ) -> EngineResult<Self> {
        settings.validate()?;
        config.validate()?;
        let timeframe = config.initial_timeframe;
        let bars = registry.write().await.get(timeframe)?.len();

        let state = SessionState {
            timeframe,
            color_scheme: config.color_scheme,
            locale: config.locale,
            pager: Pager::new(&settings.pagination, Instant::now()),
            cursor: None,
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tracing::info!(symbol = %config.symbol, %timeframe, bars, "Chart session mounted");
        Ok(ChartSession {
            ctx: SessionContext {
                registry,
                state: Arc::new(Mutex::new(state)),
                events,
                settings: Arc::new(settings),
                disposed: Arc::new(AtomicBool::new(false)),
            },
            symbol: config.symbol.clone(),
            height: config.height,
            in_flight: StdMutex::new(None),
        })
    }

    /// Mounts with a private registry built from `config`.
    pub async fn with_config(config: &AppConfig) -> EngineResult<Self> {
        let registry = Arc::new(RwLock::new(DatasetRegistry::new(&config.engine)?));
        Self::mount(registry, config.engine.clone(), &config.chart).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChartEvent> {
        self.ctx.events.subscribe()
    }

    pub fn registry(&self) -> Arc<RwLock<DatasetRegistry>> {
        self.ctx.registry.clone()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_disposed(&self) -> bool {
        self.ctx.is_disposed()
    }

    pub async fn timeframe(&self) -> TimeFrame {
        self.ctx.state.lock().await.timeframe
    }

    pub async fn color_scheme(&self) -> ColorScheme {
        self.ctx.state.lock().await.color_scheme
    }

    pub async fn locale(&self) -> Locale {
        self.ctx.state.lock().await.locale
    }

    pub async fn pagination_state(&self) -> PaginationState {
        self.ctx.state.lock().await.pager.state()
    }

    /// Viewport moved. Returns true when this event started a backward load.
    pub async fn visible_range_changed(&self, range: LogicalRange) -> bool {
        match load_history::handle_visible_range(&self.ctx, range).await {
            Some(handle) => {
                self.in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(handle);
                true
            }
            None => false,
        }
    }

    /// Crosshair moved or left the plot (`None`).
    pub async fn cursor_moved(&self, cursor: Option<TimePoint>) -> Option<Metrics> {
        crosshair::handle_cursor_moved(&self.ctx, cursor).await
    }

    pub async fn tooltip(&self) -> Option<Metrics> {
        crosshair::current_tooltip(&self.ctx).await
    }

    /// Swaps in the pristine window for `timeframe`. Any in-flight load is
    /// cancelled and its completion, if already queued, is discarded.
    pub async fn switch_timeframe(&self, timeframe: TimeFrame) -> EngineResult<()> {
        self.ensure_live()?;
        self.cancel_in_flight();

        let mut state = self.ctx.state.lock().await;
        // Remount first so a failed reset cannot leave the pager busy.
        let epoch = state.pager.remount(Instant::now());
        state.cursor = None;
        let bars = self.ctx.registry.write().await.reset(timeframe)?.len();
        let previous = state.timeframe;
        state.timeframe = timeframe;

        tracing::info!(from = %previous, to = %timeframe, bars, epoch, "Switched timeframe");
        self.ctx.publish(ChartEvent::DatasetReplaced { timeframe, bars });
        self.ctx.publish(ChartEvent::TooltipChanged(None));
        Ok(())
    }

    pub async fn set_color_scheme(&self, scheme: ColorScheme) -> EngineResult<()> {
        self.ensure_live()?;
        let mut state = self.ctx.state.lock().await;
        if state.color_scheme != scheme {
            state.color_scheme = scheme;
            tracing::debug!(scheme = scheme.label(), "Color scheme changed");
            self.ctx.publish(ChartEvent::ColorSchemeChanged(scheme));
        }
        Ok(())
    }

    pub async fn set_locale(&self, locale: Locale) -> EngineResult<()> {
        self.ensure_live()?;
        let mut state = self.ctx.state.lock().await;
        if state.locale != locale {
            state.locale = locale;
            tracing::debug!(%locale, "Locale changed");
            self.ctx.publish(ChartEvent::LocaleChanged(locale));
        }
        Ok(())
    }

    pub async fn label(&self, key: TranslationKey) -> &'static str {
        translate(self.locale().await, key)
    }

    /// Current dataset in the shape the renderer draws.
    pub async fn render_frame(&self) -> RenderFrame {
        let state = self.ctx.state.lock().await;
        let registry = self.ctx.registry.read().await;
        match registry.peek(state.timeframe) {
            Some(dataset) => helpers::to_render_frame(dataset, state.color_scheme),
            None => helpers::to_render_frame(&Dataset::default(), state.color_scheme),
        }
    }

    pub async fn summary(&self) -> PriceSummary {
        let state = self.ctx.state.lock().await;
        let registry = self.ctx.registry.read().await;
        match registry.peek(state.timeframe) {
            Some(dataset) => summarize(dataset, state.color_scheme),
            None => summarize(&Dataset::default(), state.color_scheme),
        }
    }

    /// Tears the chart down. A load already past its deferral finishes first;
    /// anything queued after this point becomes a no-op.
    pub async fn dispose(&self) {
        if self.ctx.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel_in_flight();

        let mut state = self.ctx.state.lock().await;
        state.cursor = None;
        tracing::info!(symbol = %self.symbol, "Chart session disposed");
    }

    fn ensure_live(&self) -> EngineResult<()> {
        if self.ctx.is_disposed() {
            return Err(EngineError::SessionError(format!(
                "chart session for {} is disposed",
                self.symbol
            )));
        }
        Ok(())
    }

    fn cancel_in_flight(&self) {
        let handle = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if !handle.is_finished() {
                tracing::debug!(symbol = %self.symbol, "Cancelling in-flight history load");
            }
            handle.abort();
        }
    }
}

impl Drop for ChartSession {
    fn drop(&mut self) {
        self.ctx.disposed.store(true, Ordering::SeqCst);
        self.cancel_in_flight();
    }
}
