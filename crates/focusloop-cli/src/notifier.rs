//! Desktop notifications and completion sound.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use focusloop_core::{Notifier, NotifyError, Permission};
use notify_rust::Notification;
use tracing::debug;

/// Players tried in order, skipping entries whose sound file is missing or
/// whose player is not installed.
const SOUNDS: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Notifies through the desktop notification daemon and plays the sound
/// with the system's audio player.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    sounds: Vec<(String, PathBuf)>,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::with_sounds(SOUNDS.iter().map(|(player, file)| (*player, PathBuf::from(file))))
    }
}

impl DesktopNotifier {
    pub fn with_sounds<P: Into<String>>(sounds: impl IntoIterator<Item = (P, PathBuf)>) -> Self {
        Self {
            sounds: sounds
                .into_iter()
                .map(|(player, file)| (player.into(), file))
                .collect(),
        }
    }
}

/// Start `player` on `file` and reap it from a background thread.
fn spawn_player(player: &str, file: &Path) -> io::Result<()> {
    let mut child = Command::new(player)
        .arg(file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

impl Notifier for DesktopNotifier {
    fn play_sound(&self) -> Result<(), NotifyError> {
        let mut missing = Vec::new();
        for (player, file) in self.sounds.iter().filter(|(_, file)| file.exists()) {
            match spawn_player(player, file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(player = %player, "sound player not installed");
                    missing.push(player.as_str());
                }
                Err(e) => return Err(NotifyError::Sound(format!("{player}: {e}"))),
            }
        }
        if missing.is_empty() {
            Err(NotifyError::Sound("no system sound file found".into()))
        } else {
            Err(NotifyError::Sound(format!(
                "no sound player installed (tried {})",
                missing.join(", ")
            )))
        }
    }

    fn show_notification(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(title)
            .body(body)
            .appname("focusloop")
            .icon("alarm-clock")
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }

    // The desktop daemon has no permission prompt.
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }
}
