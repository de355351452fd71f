use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use super::{Clock, RemainingTime, TimeWindow, EXPIRED_LABEL};
use crate::events::{CountdownId, Event};

/// Default recompute cadence.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What a countdown currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    /// No usable window. Renders as an empty string.
    #[default]
    Blank,
    Running(RemainingTime),
    /// Terminal. Renders as the expired label.
    Expired,
}

impl CountdownState {
    /// Sample the state of `window` at `now`.
    pub fn compute(window: Option<&TimeWindow>, now: chrono::DateTime<chrono::Utc>) -> Self {
        match window {
            Some(window) => window.remaining(now).into(),
            None => Self::Blank,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn remaining(&self) -> Option<RemainingTime> {
        match self {
            Self::Running(remaining) => Some(*remaining),
            _ => None,
        }
    }
}

impl From<RemainingTime> for CountdownState {
    fn from(remaining: RemainingTime) -> Self {
        if remaining.is_expired {
            Self::Expired
        } else {
            Self::Running(remaining)
        }
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => Ok(()),
            Self::Running(remaining) => fmt::Display::fmt(remaining, f),
            Self::Expired => f.write_str(EXPIRED_LABEL),
        }
    }
}

/// A live countdown towards the end of a `TimeWindow`.
///
/// Owns at most one recurring timer. The timer is cancelled when the window
/// is replaced or cleared, when the countdown expires, and when the engine is
/// dropped. A replaced timer never publishes again.
///
/// Starting a running window spawns onto the current tokio runtime.
pub struct CountdownEngine {
    id: CountdownId,
    clock: Arc<dyn Clock>,
    interval: Duration,
    events: Option<mpsc::Sender<Event>>,
    state: Arc<watch::Sender<CountdownState>>,
    /// Bumped on every cancellation; a timer only publishes for its own value.
    generation: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
}

impl CountdownEngine {
    pub fn new(id: CountdownId, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(CountdownState::Blank);
        Self {
            id,
            clock,
            interval: TICK_INTERVAL,
            events: None,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    /// Override the tick cadence. Applies to the next `set_window`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        // tokio intervals panic on a zero period
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Also report ticks and expiry on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn id(&self) -> CountdownId {
        self.id
    }

    /// Replace the window being counted down.
    ///
    /// The previous timer is stopped first. The new state is published
    /// immediately; a timer is only started while the countdown is running.
    pub fn set_window(&mut self, window: Option<TimeWindow>) {
        self.stop_timer();

        let state = CountdownState::compute(window.as_ref(), self.clock.now());
        self.state.send_replace(state);

        let Some(window) = window.filter(|_| state.is_running()) else {
            debug!(id = ?self.id, state = ?state, "Countdown idle");
            return;
        };

        let ticker = Ticker {
            id: self.id,
            window,
            clock: Arc::clone(&self.clock),
            first_tick: Instant::now() + self.interval,
            period: self.interval,
            generation: self.generation.load(Ordering::Acquire),
            current: Arc::clone(&self.generation),
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        };
        debug!(id = ?self.id, end = %window.end(), "Countdown started");
        self.timer = Some(tokio::spawn(ticker.run()));
    }

    /// Drop the window. The countdown goes blank.
    pub fn clear(&mut self) {
        self.set_window(None);
    }

    pub fn state(&self) -> CountdownState {
        *self.state.borrow()
    }

    /// Formatted value: blank, `"Hh Mm Ss"`, `"Dj Hh Mm Ss"` or the expired label.
    pub fn display(&self) -> String {
        self.state().to_string()
    }

    pub fn is_expired(&self) -> bool {
        self.state().is_expired()
    }

    /// Whether a timer is currently scheduled.
    pub fn is_ticking(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state.subscribe()
    }

    fn stop_timer(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(timer) = self.timer.take() {
            timer.abort();
            trace!(id = ?self.id, "Countdown timer cancelled");
        }
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

/// The recurring recomputation owned by one `set_window` call.
struct Ticker {
    id: CountdownId,
    window: TimeWindow,
    clock: Arc<dyn Clock>,
    first_tick: Instant,
    period: Duration,
    generation: u64,
    current: Arc<AtomicU64>,
    state: Arc<watch::Sender<CountdownState>>,
    events: Option<mpsc::Sender<Event>>,
}

impl Ticker {
    fn is_stale(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.generation
    }

    async fn run(self) {
        // set_window already published the initial value
        let mut ticker = time::interval_at(self.first_tick, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if self.is_stale() {
                return;
            }

            let remaining = self.window.remaining(self.clock.now());
            let event = if remaining.is_expired {
                Event::Expired { id: self.id }
            } else {
                Event::Tick {
                    id: self.id,
                    remaining,
                }
            };

            // Staleness is checked under the watch lock, which set_window also
            // takes after bumping the generation. The state is published even
            // when the event channel is full.
            let mut undelivered = None;
            let published = self.state.send_if_modified(|state| {
                if self.is_stale() {
                    return false;
                }
                *state = remaining.into();
                if let Some(tx) = &self.events {
                    match tx.try_send(event) {
                        Ok(()) | Err(TrySendError::Closed(_)) => {}
                        Err(TrySendError::Full(event)) => undelivered = Some(event),
                    }
                }
                true
            });

            if !published {
                return;
            }
            if let Some(event) = undelivered {
                if remaining.is_expired {
                    // Expiry is reported once, so wait for room rather than drop it
                    if let Some(tx) = &self.events {
                        let _ = tx.send(event).await;
                    }
                } else {
                    warn!(id = ?self.id, "Event channel full, dropping tick");
                }
            }
            if remaining.is_expired {
                debug!(id = ?self.id, "Countdown expired");
                return;
            }
            trace!(id = ?self.id, remaining = %remaining, "Tick");
        }
    }
}
