mod engine;
mod kind;

pub use engine::{TimerEngine, TimerState};
pub use kind::{Durations, SessionKind};
