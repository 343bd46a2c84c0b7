//! Side-effect ports for interval completions.
//!
//! Sound and notification delivery are fire-and-forget: the session driver
//! logs a failure and carries on, so a broken audio device or a denied
//! permission never holds up a transition.

use std::sync::Mutex;
use thiserror::Error;

use crate::timer::Mode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("sound playback failed: {0}")]
    Sound(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Undetermined,
}

pub trait Notifier: Send + Sync {
    fn play_sound(&self) -> Result<(), NotifyError>;

    fn show_notification(&self, title: &str, body: &str) -> Result<(), NotifyError>;

    /// Current notification permission, without prompting.
    fn permission(&self) -> Permission;

    /// Ask for notification permission and return the outcome.
    fn request_permission(&self) -> Permission;
}

/// Title and body announcing the end of a `finished` interval.
pub fn completion_message(finished: Mode) -> (&'static str, &'static str) {
    match finished {
        Mode::Work => ("Work session completed!", "Time for a break!"),
        Mode::ShortBreak | Mode::LongBreak => ("Break time over!", "Ready to focus again?"),
    }
}

/// Does nothing; every call succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn play_sound(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    fn show_notification(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }
}

/// What a [`RecordingNotifier`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Sound,
    Notification { title: String, body: String },
    PermissionRequested,
}

/// Records every effect it is asked for. Can be told to fail or to answer
/// with a given permission.
#[derive(Debug)]
pub struct RecordingNotifier {
    effects: Mutex<Vec<Effect>>,
    permission: Mutex<Permission>,
    grant_on_request: bool,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::with_permission(Permission::Granted)
    }

    pub fn with_permission(permission: Permission) -> Self {
        Self {
            effects: Mutex::new(Vec::new()),
            permission: Mutex::new(permission),
            grant_on_request: true,
            fail: false,
        }
    }

    /// A notifier whose sound and notification calls all fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Requests for permission will be refused.
    pub fn refusing(mut self) -> Self {
        self.grant_on_request = false;
        self
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    fn push(&self, effect: Effect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push(effect);
        }
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn play_sound(&self) -> Result<(), NotifyError> {
        self.push(Effect::Sound);
        if self.fail {
            return Err(NotifyError::Sound("no audio device".into()));
        }
        Ok(())
    }

    fn show_notification(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.push(Effect::Notification {
            title: title.to_string(),
            body: body.to_string(),
        });
        if self.fail {
            return Err(NotifyError::Delivery("notification daemon unavailable".into()));
        }
        Ok(())
    }

    fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(Permission::Denied)
    }

    fn request_permission(&self) -> Permission {
        self.push(Effect::PermissionRequested);
        let outcome = if self.grant_on_request {
            Permission::Granted
        } else {
            Permission::Denied
        };
        if let Ok(mut p) = self.permission.lock() {
            *p = outcome;
        }
        outcome
    }
}
