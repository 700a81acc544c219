use clap::Subcommand;
use pomofocus_core::SoundType;
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    Show,
    /// Restore default timer and notification settings
    Reset,
    /// Update timer durations (minutes) and auto-start flags
    Timer {
        #[arg(long)]
        work: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        auto_start_breaks: Option<bool>,
        #[arg(long)]
        auto_start_pomodoros: Option<bool>,
    },
    /// Update notification switches
    Notifications {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        sounds: Option<bool>,
        /// bell, digital or gentle
        #[arg(long)]
        sound_type: Option<SoundType>,
    },
    /// Update display preferences
    Prefs {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        rtl: Option<bool>,
    },
}

pub fn run(action: SettingsAction, ctx: &Context) -> CmdResult {
    let mut app = ctx.open();

    match action {
        SettingsAction::Show => {}
        SettingsAction::Reset => app.reset_settings()?,
        SettingsAction::Timer {
            work,
            short_break,
            long_break,
            auto_start_breaks,
            auto_start_pomodoros,
        } => {
            let mut settings = app
                .timer()
                .settings()
                .with_minutes(work, short_break, long_break)?;
            if let Some(flag) = auto_start_breaks {
                settings.auto_start_breaks = flag;
            }
            if let Some(flag) = auto_start_pomodoros {
                settings.auto_start_pomodoros = flag;
            }
            app.update_timer_settings(settings)?;
        }
        SettingsAction::Notifications {
            enabled,
            sounds,
            sound_type,
        } => {
            let mut settings = app.notification_settings();
            if let Some(enabled) = enabled {
                settings.enabled = enabled;
            }
            if let Some(sounds) = sounds {
                settings.sounds = sounds;
            }
            if let Some(sound_type) = sound_type {
                settings.sound_type = sound_type;
            }
            app.set_notification_settings(settings)?;
        }
        SettingsAction::Prefs {
            language,
            dark_mode,
            rtl,
        } => {
            let mut prefs = app.preferences();
            if let Some(language) = language {
                prefs.language = language;
            }
            if let Some(dark_mode) = dark_mode {
                prefs.dark_mode = dark_mode;
            }
            if let Some(rtl) = rtl {
                prefs.rtl = rtl;
            }
            app.set_preferences(&prefs)?;
        }
    }

    print_json(&json!({
        "timer": app.timer().settings(),
        "notifications": app.notification_settings(),
        "preferences": app.preferences(),
    }))
}
