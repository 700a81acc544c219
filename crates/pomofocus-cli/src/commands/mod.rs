//! Subcommand handlers and the state they share.

use std::rc::Rc;

use pomofocus_core::storage::open_store;
use pomofocus_core::{
    Config, Event, KeyValueStore, ManualTicks, MemoryBackend, PomodoroApp, SystemClock,
    TickSource,
};
use serde::Serialize;

pub mod achievements;
pub mod config;
pub mod data;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub struct Context {
    config: Config,
    ephemeral: bool,
}

impl Context {
    pub fn new(config: Config, ephemeral: bool) -> Self {
        Self { config, ephemeral }
    }

    pub fn store(&self) -> KeyValueStore {
        let namespace = &self.config.storage.namespace;
        if self.ephemeral {
            KeyValueStore::new(MemoryBackend::new(), namespace)
        } else {
            open_store(&self.config)
        }
    }

    /// Open the app for a one-shot command that never ticks.
    pub fn open(&self) -> PomodoroApp {
        self.open_with(ManualTicks::new())
    }

    pub fn open_with(&self, ticks: impl TickSource + 'static) -> PomodoroApp {
        PomodoroApp::open(self.store(), Rc::new(SystemClock), ticks)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One compact JSON object per line, for streaming output.
pub fn print_event(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn print_events(app: &mut PomodoroApp) -> CmdResult {
    for event in app.drain_events() {
        print_event(&event)?;
    }
    Ok(())
}
