pub mod controller;
pub mod events;
pub mod state;

pub use controller::{CloseFailurePolicy, TimerConfig, TimerController};
pub use events::{Cue, Notice, Severity, TimerEvent};
pub use state::{format_clock, TimerMode, TimerPhase, TimerState};
