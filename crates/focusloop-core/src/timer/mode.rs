use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    /// Human-readable heading for the interval.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Work => "work",
            Mode::ShortBreak => "shortBreak",
            Mode::LongBreak => "longBreak",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_camel_case() {
        assert_eq!(serde_json::to_string(&Mode::ShortBreak).unwrap(), "\"shortBreak\"");
        let parsed: Mode = serde_json::from_str("\"longBreak\"").unwrap();
        assert_eq!(parsed, Mode::LongBreak);
    }

    #[test]
    fn only_work_is_not_a_break() {
        assert!(!Mode::Work.is_break());
        assert!(Mode::ShortBreak.is_break());
        assert!(Mode::LongBreak.is_break());
    }
}
