//! Settings resolver.
//!
//! Interval durations and behavior flags, validated against fixed ranges.
//! Settings are only ever replaced wholesale: callers build a candidate
//! (or a [`SettingsPatch`] over the current value) and run it through
//! [`validate`] / [`merge`] before saving it through the persistence port.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::timer::Mode;

pub const WORK_RANGE: (u32, u32) = (60, 3600);
pub const SHORT_BREAK_RANGE: (u32, u32) = (60, 1800);
pub const LONG_BREAK_RANGE: (u32, u32) = (300, 3600);
pub const SESSIONS_RANGE: (u32, u32) = (1, 10);

/// Interval durations (seconds) and behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_work_duration", alias = "work")]
    pub work_duration: u32,
    #[serde(default = "default_short_break_duration", alias = "shortBreak")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration", alias = "longBreak")]
    pub long_break_duration: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    #[serde(default, alias = "autoStartNextSession")]
    pub auto_advance: bool,
    #[serde(default = "default_true", alias = "enableNotifications")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true", alias = "enableSounds")]
    pub sound_enabled: bool,
}

fn default_work_duration() -> u32 {
    25 * 60
}
fn default_short_break_duration() -> u32 {
    5 * 60
}
fn default_long_break_duration() -> u32 {
    15 * 60
}
fn default_sessions_before_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            sessions_before_long_break: default_sessions_before_long_break(),
            auto_advance: false,
            notifications_enabled: true,
            sound_enabled: true,
        }
    }
}

/// A partial settings update. `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub work_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub sessions_before_long_break: Option<u32>,
    pub auto_advance: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

/// Named duration presets. Applying one leaves the behavior flags alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Default,
    DeepWork,
    Sprint,
}

impl Preset {
    pub fn patch(self) -> SettingsPatch {
        let (work, short, long, sessions) = match self {
            Preset::Default => (25 * 60, 5 * 60, 15 * 60, 4),
            Preset::DeepWork => (50 * 60, 10 * 60, 30 * 60, 2),
            Preset::Sprint => (20 * 60, 5 * 60, 15 * 60, 4),
        };
        SettingsPatch {
            work_duration: Some(work),
            short_break_duration: Some(short),
            long_break_duration: Some(long),
            sessions_before_long_break: Some(sessions),
            ..SettingsPatch::default()
        }
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "deep-work" | "deepwork" | "deep_work" => Ok(Preset::DeepWork),
            "sprint" => Ok(Preset::Sprint),
            other => Err(ValidationError::InvalidValue {
                field: "preset".into(),
                message: format!("unknown preset '{other}' (expected default, deep-work or sprint)"),
            }),
        }
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validate a candidate, returning it unchanged when every field is in range.
///
/// Fields are checked in declaration order and the first offending field is
/// reported.
pub fn validate(candidate: Settings) -> Result<Settings, ValidationError> {
    check_range("workDuration", candidate.work_duration, WORK_RANGE)?;
    check_range(
        "shortBreakDuration",
        candidate.short_break_duration,
        SHORT_BREAK_RANGE,
    )?;
    check_range(
        "longBreakDuration",
        candidate.long_break_duration,
        LONG_BREAK_RANGE,
    )?;
    check_range(
        "sessionsBeforeLongBreak",
        candidate.sessions_before_long_break,
        SESSIONS_RANGE,
    )?;
    Ok(candidate)
}

/// Merge `patch` over `current` field by field, then validate the result.
///
/// On error `current` is untouched; nothing is partially applied.
pub fn merge(current: &Settings, patch: &SettingsPatch) -> Result<Settings, ValidationError> {
    let candidate = Settings {
        work_duration: patch.work_duration.unwrap_or(current.work_duration),
        short_break_duration: patch
            .short_break_duration
            .unwrap_or(current.short_break_duration),
        long_break_duration: patch
            .long_break_duration
            .unwrap_or(current.long_break_duration),
        sessions_before_long_break: patch
            .sessions_before_long_break
            .unwrap_or(current.sessions_before_long_break),
        auto_advance: patch.auto_advance.unwrap_or(current.auto_advance),
        notifications_enabled: patch
            .notifications_enabled
            .unwrap_or(current.notifications_enabled),
        sound_enabled: patch.sound_enabled.unwrap_or(current.sound_enabled),
    };
    validate(candidate)
}

/// Configured duration in seconds for `mode`.
pub fn duration_for(mode: Mode, settings: &Settings) -> u32 {
    match mode {
        Mode::Work => settings.work_duration,
        Mode::ShortBreak => settings.short_break_duration,
        Mode::LongBreak => settings.long_break_duration,
    }
}
