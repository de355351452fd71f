use crate::countdown::RemainingTime;

/// Which countdown an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountdownId {
    /// Sitewide discount banner
    Banner,
    /// Registration countdown for a masterclass (by id)
    Masterclass(i64),
}

/// Everything the main loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Timer tick (every second) while a countdown is running
    Tick {
        id: CountdownId,
        remaining: RemainingTime,
    },

    // Countdown reached its end. Sent once, no ticks follow.
    Expired { id: CountdownId },

    // Ctrl+C or kill signal
    Shutdown,
}

impl Event {
    pub fn countdown_id(&self) -> Option<CountdownId> {
        match self {
            Event::Tick { id, .. } | Event::Expired { id } => Some(*id),
            Event::Shutdown => None,
        }
    }
}
