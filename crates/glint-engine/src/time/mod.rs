//! Time subsystem.
//!
//! Provides frame timing without coupling to the runtime. The clock source is
//! injectable so loop behaviour can be tested with exact, repeatable durations:
//! - `SystemClock` for real runs
//! - `ManualClock` for tests and replays

mod clock;
mod frame_timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_timer::FrameTimer;
