//! Fixed-interval tickers for quizcast.
//!
//! Every peer runs two independent 1-second tasks: the countdown decrement
//! and (on the host) the scoreboard broadcast. Both are modelled as a
//! [`Ticker`] that the peer actor awaits inside its `tokio::select!` loop,
//! so a tick is just another event delivered to the single state owner:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = countdown.wait_for_tick() => machine.on_countdown_tick(),
//!         _ = broadcast.wait_for_tick() => machine.on_broadcast_tick(),
//!     }
//! }
//! ```
//!
//! A ticker never blocks on network I/O. Whatever the tick handler sends is
//! fire-and-forget; the next tick re-sends current state anyway.
//!
//! The [`Countdown`] type is the shared 26-second per-question convention.
//! Host and players each own one and reset it independently when a new
//! question appears; nothing about it travels over the wire.

mod countdown;

pub use countdown::{Countdown, DEFAULT_COUNTDOWN_START};

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// A cancellable fixed-interval ticker.
///
/// `stop()` is the cancellation primitive used by view cleanup: after it,
/// `wait_for_tick` pends forever. `restart()` pushes the next tick a full
/// interval out, which is how a new question gets a fresh first second.
#[derive(Debug)]
pub struct Ticker {
    period: Option<Duration>,
    tick_count: u64,
    next_tick: Option<Instant>,
    stopped: bool,
}

impl Ticker {
    /// Creates a ticker whose first tick is due one interval from now.
    /// `Duration::ZERO` gives a disabled ticker that pends forever, which
    /// is what a view without a periodic task wants.
    pub fn every(interval: Duration) -> Self {
        let period = (!interval.is_zero()).then_some(interval);
        match period {
            Some(p) => debug!(interval_ms = p.as_millis() as u64, "ticker created"),
            None => debug!("ticker created disabled"),
        }
        Self {
            period,
            tick_count: 0,
            next_tick: period.map(|p| Instant::now() + p),
            stopped: false,
        }
    }

    /// A ticker that never fires.
    pub fn disabled() -> Self {
        Self::every(Duration::ZERO)
    }

    /// Waits until the next tick is due and returns its number (from 1).
    ///
    /// Pends forever when disabled or stopped; inside `select!` the other
    /// branches keep running. A late wakeup does not fire the missed ticks:
    /// the next one is scheduled a full interval from now.
    pub async fn wait_for_tick(&mut self) -> u64 {
        let (next, period) = match (self.next_tick, self.period) {
            (Some(next), Some(period)) if !self.stopped => (next, period),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        if late_by >= period {
            warn!(
                tick = self.tick_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "ticker overrun, skipping ahead"
            );
        }
        self.next_tick = Some(now + period);

        trace!(tick = self.tick_count, "tick fired");
        self.tick_count
    }

    /// Restarts the cadence so the next tick is a full interval from now.
    /// Has no effect on a stopped or disabled ticker.
    pub fn restart(&mut self) {
        if let (Some(period), false) = (self.period, self.stopped) {
            self.next_tick = Some(Instant::now() + period);
            trace!(tick = self.tick_count, "ticker restarted");
        }
    }

    /// Stops the ticker for good. Idempotent.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.next_tick = None;
            debug!(tick = self.tick_count, "ticker stopped");
        }
    }

    /// Whether the ticker has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether this ticker never fires because its interval is zero.
    pub fn is_disabled(&self) -> bool {
        self.period.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured interval, or `None` when disabled.
    pub fn interval(&self) -> Option<Duration> {
        self.period
    }
}
