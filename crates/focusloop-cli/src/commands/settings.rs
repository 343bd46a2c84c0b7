use clap::{ArgAction, Subcommand};
use focusloop_core::settings;
use focusloop_core::storage::{load_settings, save_settings};
use focusloop_core::{Preset, Settings, SettingsPatch};

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change one or more settings
    Set {
        /// Work interval length in minutes
        #[arg(long, value_name = "MINUTES")]
        work: Option<u32>,
        /// Short break length in minutes
        #[arg(long, value_name = "MINUTES")]
        short_break: Option<u32>,
        /// Long break length in minutes
        #[arg(long, value_name = "MINUTES")]
        long_break: Option<u32>,
        /// Work intervals before a long break
        #[arg(long)]
        sessions: Option<u32>,
        /// Start the next interval automatically
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        auto_advance: Option<bool>,
        /// Desktop notification on completion
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        notifications: Option<bool>,
        /// Sound on completion
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        sound: Option<bool>,
    },
    /// Apply a named duration preset (default, deep-work, sprint)
    Preset { name: Preset },
    /// Restore the default settings
    Reset,
}

fn minutes(value: Option<u32>) -> Option<u32> {
    value.map(|m| m.saturating_mul(60))
}

pub fn run(action: SettingsAction) -> CommandResult {
    let store = open_store()?;

    match action {
        SettingsAction::Show => {
            print_json(&load_settings(&store))?;
        }
        SettingsAction::Set {
            work,
            short_break,
            long_break,
            sessions,
            auto_advance,
            notifications,
            sound,
        } => {
            let patch = SettingsPatch {
                work_duration: minutes(work),
                short_break_duration: minutes(short_break),
                long_break_duration: minutes(long_break),
                sessions_before_long_break: sessions,
                auto_advance,
                notifications_enabled: notifications,
                sound_enabled: sound,
            };
            if patch.is_empty() {
                return Err("nothing to change (see `focusloop settings set --help`)".into());
            }
            let merged = settings::merge(&load_settings(&store), &patch)?;
            print_json(&save_settings(&store, &merged)?)?;
        }
        SettingsAction::Preset { name } => {
            let merged = settings::merge(&load_settings(&store), &name.patch())?;
            print_json(&save_settings(&store, &merged)?)?;
        }
        SettingsAction::Reset => {
            print_json(&save_settings(&store, &Settings::default())?)?;
        }
    }
    Ok(())
}
