mod engine;
mod mode;
mod scheduler;

pub use engine::TimerEngine;
pub use mode::Mode;
pub use scheduler::{Tick, TickScheduler};
