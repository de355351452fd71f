mod clock;
mod engine;
mod remaining;
mod window;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use engine::{CountdownEngine, CountdownState, TICK_INTERVAL};
pub use remaining::{RemainingTime, EXPIRED_LABEL};
pub use window::{TimeWindow, WindowPhase};
