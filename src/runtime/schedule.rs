//! Refresh scheduling for panels.
//!
//! A [`RefreshTask`] either counts host ticks (sync mode, fired from the
//! authoritative context) or runs a timer thread that posts signals the panel
//! drains on its next drive (async mode). Either way, the panel does the
//! actual refresh on the authoritative context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Wall-clock length of one host tick.
pub const MILLIS_PER_TICK: u64 = 50;

pub fn ticks_to_duration(ticks: u64) -> Duration {
    Duration::from_millis(ticks.saturating_mul(MILLIS_PER_TICK))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Fire on the host's tick, counted in ticks.
    Sync,
    /// Fire from an independent timer at `ticks * MILLIS_PER_TICK`.
    Async,
}

/// Shared cancellation flag that can also wake a sleeping timer.
#[derive(Clone)]
struct CancelSignal {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    notify: (Mutex<()>, Condvar),
}

impl CancelSignal {
    fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                notify: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        let (lock, cvar) = &self.inner.notify;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Sleep up to `duration`; true if cancelled meanwhile.
    fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &self.inner.notify;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        // Durations past the clock's range mean "until cancelled".
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return true;
            }
            guard = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    cvar.wait_timeout(guard, deadline - now)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
                None => cvar.wait(guard).unwrap_or_else(|e| e.into_inner()),
            };
        }
    }
}

enum TaskKind {
    Sync {
        next_due: u64,
    },
    Async {
        signals: Receiver<()>,
        worker: Option<JoinHandle<()>>,
    },
}

/// Repeating refresh timer owned by a panel. Cancelling is idempotent and
/// also happens on drop.
pub struct RefreshTask {
    mode: RefreshMode,
    period_ticks: u64,
    cancel: CancelSignal,
    kind: TaskKind,
}

impl RefreshTask {
    /// Fire at `now_tick + delay_ticks`, then every `period_ticks`.
    pub fn sync(now_tick: u64, delay_ticks: u64, period_ticks: u64) -> Self {
        Self {
            mode: RefreshMode::Sync,
            period_ticks: period_ticks.max(1),
            cancel: CancelSignal::new(),
            kind: TaskKind::Sync {
                next_due: now_tick.saturating_add(delay_ticks),
            },
        }
    }

    /// Start a timer thread firing after `delay_ticks`, then every `period_ticks`.
    pub fn spawn_async(delay_ticks: u64, period_ticks: u64) -> Result<Self> {
        let period_ticks = period_ticks.max(1);
        let cancel = CancelSignal::new();
        let (tx, rx) = mpsc::channel();
        let token = cancel.clone();
        let delay = ticks_to_duration(delay_ticks);
        let period = ticks_to_duration(period_ticks);

        let worker = thread::Builder::new()
            .name("slotgrid-refresh".to_string())
            .spawn(move || {
                if token.wait_timeout(delay) {
                    return;
                }
                loop {
                    if tx.send(()).is_err() {
                        return;
                    }
                    if token.wait_timeout(period) {
                        return;
                    }
                }
            })?;

        Ok(Self {
            mode: RefreshMode::Async,
            period_ticks,
            cancel,
            kind: TaskKind::Async {
                signals: rx,
                worker: Some(worker),
            },
        })
    }

    pub fn start(mode: RefreshMode, now_tick: u64, period_ticks: u64) -> Result<Self> {
        match mode {
            RefreshMode::Sync => Ok(Self::sync(now_tick, 0, period_ticks)),
            RefreshMode::Async => Self::spawn_async(0, period_ticks),
        }
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn period_ticks(&self) -> u64 {
        self.period_ticks
    }

    /// Whether the task should fire now. Missed periods collapse into a
    /// single fire.
    pub fn take_due(&mut self, now_tick: u64) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        match &mut self.kind {
            TaskKind::Sync { next_due } => {
                if now_tick < *next_due {
                    return false;
                }
                let behind = (now_tick - *next_due) / self.period_ticks;
                let step = (behind + 1).saturating_mul(self.period_ticks);
                *next_due = next_due.saturating_add(step);
                true
            }
            TaskKind::Async { signals, .. } => {
                let mut fired = false;
                loop {
                    match signals.try_recv() {
                        Ok(()) => fired = true,
                        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                    }
                }
                fired
            }
        }
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if let TaskKind::Async { worker, .. } = &mut self.kind {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_task_fires_on_period() {
        let mut task = RefreshTask::sync(10, 0, 5);
        assert!(task.take_due(10));
        assert!(!task.take_due(11));
        assert!(!task.take_due(14));
        assert!(task.take_due(15));
    }

    #[test]
    fn sync_task_collapses_missed_periods() {
        let mut task = RefreshTask::sync(0, 0, 2);
        assert!(task.take_due(0));
        assert!(task.take_due(9));
        assert!(!task.take_due(9));
        assert!(task.take_due(10));
    }

    #[test]
    fn zero_period_is_treated_as_every_tick() {
        let mut task = RefreshTask::sync(0, 0, 0);
        assert_eq!(task.period_ticks(), 1);
        assert!(task.take_due(0));
        assert!(task.take_due(1));
    }

    #[test]
    fn cancel_is_idempotent_and_stops_firing() {
        let mut task = RefreshTask::sync(0, 0, 1);
        task.cancel();
        task.cancel();
        assert!(task.is_cancelled());
        assert!(!task.take_due(100));
    }

    #[test]
    fn async_task_posts_signals_until_cancelled() {
        let mut task = RefreshTask::spawn_async(0, 1).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut fired = false;
        while Instant::now() < deadline && !fired {
            fired = task.take_due(0);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(fired);

        task.cancel();
        task.cancel();
        let _ = task.take_due(0);
        thread::sleep(Duration::from_millis(120));
        assert!(!task.take_due(0));
    }

    #[test]
    fn huge_sync_period_fires_once_without_overflow() {
        let mut task = RefreshTask::sync(5, 0, u64::MAX);
        assert!(task.take_due(5));
        assert!(!task.take_due(6));
        assert!(!task.take_due(u64::MAX - 1));
    }

    #[test]
    fn huge_async_period_waits_until_cancelled() {
        let mut task = RefreshTask::spawn_async(0, u64::MAX).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut fired = false;
        while Instant::now() < deadline && !fired {
            fired = task.take_due(0);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(fired);

        let started = Instant::now();
        task.cancel();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!task.take_due(0));
    }

    #[test]
    fn ticks_convert_to_wall_clock() {
        assert_eq!(ticks_to_duration(20), Duration::from_secs(1));
    }
}
