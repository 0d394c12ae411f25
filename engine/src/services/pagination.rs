// Backward pagination state machine. Pure: time comes in as an argument and
// the caller owns whatever task performs the actual load.
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::PaginationSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    Loading,
    Cooldown,
}

/// Visible data-index window of the viewport. `from` may be negative when the
/// view is scrolled past the first bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// Issued on `Idle -> Loading`; completion must present it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub mount_epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    Busy(PaginationState),
    AwayFromEdge,
    EmptyDataset,
    Settling,
}

#[derive(Debug)]
pub struct Pager {
    state: PaginationState,
    edge_threshold: f64,
    settle: Duration,
    mounted_at: Instant,
    mount_epoch: u64,
}

impl Pager {
    pub fn new(settings: &PaginationSettings, now: Instant) -> Self {
        Pager {
            state: PaginationState::Idle,
            edge_threshold: settings.edge_threshold,
            settle: settings.settle(),
            mounted_at: now,
            mount_epoch: 0,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn mount_epoch(&self) -> u64 {
        self.mount_epoch
    }

    /// Chart or timeframe (re)mounted: back to `Idle` with a fresh settle
    /// period. Tickets issued before this are stale from now on.
    pub fn remount(&mut self, now: Instant) -> u64 {
        self.mount_epoch += 1;
        self.mounted_at = now;
        self.state = PaginationState::Idle;
        self.mount_epoch
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.mount_epoch == self.mount_epoch
    }

    /// Viewport moved. Transitions `Idle -> Loading` and hands out a ticket
    /// when the left edge is near, data exists and the mount has settled.
    pub fn on_visible_range(
        &mut self,
        range: LogicalRange,
        dataset_len: usize,
        now: Instant,
    ) -> Result<LoadTicket, Suppressed> {
        if self.state != PaginationState::Idle {
            return Err(Suppressed::Busy(self.state));
        }
        // NaN never counts as near the edge.
        let near_edge = range.from < self.edge_threshold;
        if !near_edge {
            return Err(Suppressed::AwayFromEdge);
        }
        if dataset_len == 0 {
            return Err(Suppressed::EmptyDataset);
        }
        if now.saturating_duration_since(self.mounted_at) < self.settle {
            return Err(Suppressed::Settling);
        }

        self.state = PaginationState::Loading;
        Ok(LoadTicket { mount_epoch: self.mount_epoch })
    }

    /// `Loading -> Cooldown`. Returns false for a stale ticket.
    pub fn complete_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) || self.state != PaginationState::Loading {
            return false;
        }
        self.state = PaginationState::Cooldown;
        true
    }

    /// `Cooldown -> Idle`. Returns false for a stale ticket.
    pub fn end_cooldown(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) || self.state != PaginationState::Cooldown {
            return false;
        }
        self.state = PaginationState::Idle;
        true
    }
}

/// Owned handle to a spawned deferred task. Dropping it aborts the task.
#[derive(Debug)]
pub struct TaskHandle {
    inner: JoinHandle<()>,
}

impl TaskHandle {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TaskHandle {
            inner: tokio::spawn(future),
        }
    }

    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.inner.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn pager_at(now: Instant) -> Pager {
        Pager::new(&PaginationSettings::default(), now)
    }

    fn near_edge() -> LogicalRange {
        LogicalRange::new(2.0, 40.0)
    }

    #[test]
    fn test_full_cycle() {
        let t0 = Instant::now();
        let mut pager = pager_at(t0);
        let later = t0 + Duration::from_millis(600);

        let ticket = pager.on_visible_range(near_edge(), 30, later).unwrap();
        assert_eq!(pager.state(), PaginationState::Loading);
        assert!(pager.complete_load(ticket));
        assert_eq!(pager.state(), PaginationState::Cooldown);
        assert!(pager.end_cooldown(ticket));
        assert_eq!(pager.state(), PaginationState::Idle);
    }

    #[test]
    fn test_rapid_second_trigger_is_suppressed() {
        let t0 = Instant::now();
        let mut pager = pager_at(t0);
        let later = t0 + Duration::from_millis(600);

        assert!(pager.on_visible_range(near_edge(), 30, later).is_ok());
        assert_eq!(
            pager.on_visible_range(near_edge(), 30, later),
            Err(Suppressed::Busy(PaginationState::Loading))
        );
    }

    #[test]
    fn test_events_during_cooldown_are_ignored() {
        let t0 = Instant::now();
        let mut pager = pager_at(t0);
        let later = t0 + Duration::from_millis(600);
        let ticket = pager.on_visible_range(near_edge(), 30, later).unwrap();
        pager.complete_load(ticket);

        assert_eq!(
            pager.on_visible_range(LogicalRange::new(-3.0, 30.0), 60, later),
            Err(Suppressed::Busy(PaginationState::Cooldown))
        );
    }

    #[test]
    fn test_guards() {
        let t0 = Instant::now();
        let mut pager = pager_at(t0);

        assert_eq!(
            pager.on_visible_range(near_edge(), 30, t0 + Duration::from_millis(100)),
            Err(Suppressed::Settling)
        );
        let later = t0 + Duration::from_millis(500);
        assert_eq!(
            pager.on_visible_range(LogicalRange::new(5.0, 40.0), 30, later),
            Err(Suppressed::AwayFromEdge)
        );
        assert_eq!(pager.on_visible_range(near_edge(), 0, later), Err(Suppressed::EmptyDataset));
        assert_eq!(
            pager.on_visible_range(LogicalRange::new(f64::NAN, 1.0), 30, later),
            Err(Suppressed::AwayFromEdge)
        );
        assert_eq!(pager.state(), PaginationState::Idle);
        assert!(pager.on_visible_range(LogicalRange::new(4.99, 40.0), 30, later).is_ok());
    }

    #[test]
    fn test_remount_invalidates_tickets() {
        let t0 = Instant::now();
        let mut pager = pager_at(t0);
        let later = t0 + Duration::from_millis(600);
        let stale = pager.on_visible_range(near_edge(), 30, later).unwrap();

        pager.remount(later);
        assert_eq!(pager.state(), PaginationState::Idle);
        assert!(!pager.complete_load(stale));
        assert_eq!(pager.state(), PaginationState::Idle);
        // Fresh settle period after remount.
        assert_eq!(pager.on_visible_range(near_edge(), 30, later), Err(Suppressed::Settling));
    }

    #[tokio::test]
    async fn test_task_handle_aborts_on_drop() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = TaskHandle::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        drop(handle);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
