//! Tick scheduler
//!
//! Holds at most one pending tick per game. Scheduling replaces whatever was
//! pending and cancelling drops it.

/// A scheduled tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTick {
    /// Host time (ms) at which the tick is due
    pub due_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    pending: Option<PendingTick>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a fresh tick `period_ms` after `now_ms`, cancelling any
    /// previous one.
    pub fn schedule(&mut self, now_ms: f64, period_ms: u32) -> PendingTick {
        self.schedule_at(now_ms + f64::from(period_ms))
    }

    /// Schedule a tick at an absolute time, cancelling any previous one.
    pub fn schedule_at(&mut self, due_ms: f64) -> PendingTick {
        let tick = PendingTick { due_ms };
        self.pending = Some(tick);
        tick
    }

    /// Drop the pending tick, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingTick> {
        self.pending
    }

    /// Take the pending tick if it is due at `now_ms`. The caller reschedules
    /// after running it, using whatever period applies then.
    pub fn take_due(&mut self, now_ms: f64) -> Option<PendingTick> {
        match self.pending {
            Some(tick) if tick.due_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }
}
