//! # focusloop Core Library
//!
//! This library provides the core business logic for the focusloop interval
//! tracker. All operations are available through the standalone CLI binary,
//! which is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Settings Resolver**: validates interval durations and behavior flags
//! - **Timer Engine**: a tick-driven state machine cycling through work,
//!   short-break and long-break intervals. The caller delivers one `tick()`
//!   per elapsed second and resolves completions before ticking again
//! - **Stats**: a daily ledger of completed intervals with weekly rollups
//!   and CSV export
//! - **Storage**: a key-value persistence port of JSON documents, backed by
//!   SQLite, plus TOML-based application configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core session state machine
//! - [`TickScheduler`]: Cancellable once-per-second tick source
//! - [`FocusSession`]: Drives the engine, the stats ledger and side effects
//! - [`StatsAggregate`]: Running totals and the per-day ledger
//! - [`Store`]: Persistence port
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, TaskError, ValidationError};
pub use events::{CompletionEvent, Event};
pub use notify::{Effect, Notifier, NotifyError, Permission, RecordingNotifier, SilentNotifier};
pub use session::FocusSession;
pub use settings::{Preset, Settings, SettingsPatch};
pub use stats::{DailyStat, Rollup, StatsAggregate};
pub use storage::{Config, MemoryStore, SqliteStore, Store};
pub use task::{Priority, Task, TaskList};
pub use timer::{Mode, Tick, TickScheduler, TimerEngine};
