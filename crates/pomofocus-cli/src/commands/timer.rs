use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use clap::Subcommand;
use pomofocus_core::{Event, IntervalTicks, PomodoroApp};
use tracing::{debug, warn};

use super::{print_event, print_events, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground, one JSON event per line.
    ///
    /// Reads controls from stdin: p (pause), s (start/resume), k (skip),
    /// r (reset), q (quit).
    Run {
        /// Milliseconds per timer second
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        tick_ms: u64,
        /// Stop after this many completed sessions
        #[arg(long)]
        sessions: Option<u32>,
    },
    /// Start a fresh cycle (zeroes the completed-session counter)
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Start,
    Skip,
    Reset,
    Quit,
}

impl std::str::FromStr for Control {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p" | "pause" => Ok(Control::Pause),
            "s" | "start" | "resume" => Ok(Control::Start),
            "k" | "skip" => Ok(Control::Skip),
            "r" | "reset" => Ok(Control::Reset),
            "q" | "quit" => Ok(Control::Quit),
            _ => Err(()),
        }
    }
}

/// Read controls from stdin on a helper thread. The channel disconnects at EOF.
fn spawn_controls() -> Receiver<Control> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let input = line.trim().to_ascii_lowercase();
            if input.is_empty() {
                continue;
            }
            match input.parse::<Control>() {
                Ok(control) => {
                    if tx.send(control).is_err() {
                        break;
                    }
                }
                Err(()) => warn!(%input, "unknown control"),
            }
        }
    });
    rx
}

fn apply(app: &mut PomodoroApp, control: Control) {
    debug!(?control, "control received");
    match control {
        Control::Pause => app.pause(),
        Control::Start => app.start(),
        Control::Skip => app.skip(),
        Control::Reset => app.reset(),
        Control::Quit => {}
    }
}

fn run_loop(ctx: &Context, tick_ms: u64, sessions: Option<u32>) -> CmdResult {
    let ticks = IntervalTicks::new();
    let mut app = ctx.open_with(ticks.clone());
    app.set_tick_interval(Duration::from_millis(tick_ms));
    let controls = spawn_controls();
    let mut input_open = true;
    let mut completed = 0u32;

    app.start();
    loop {
        for event in app.drain_events() {
            if matches!(event, Event::SessionCompleted { .. }) {
                completed += 1;
            }
            print_event(&event)?;
        }
        if sessions.is_some_and(|n| completed >= n) {
            break;
        }

        if !input_open {
            if !ticks.wait_next() {
                break;
            }
            app.tick();
            continue;
        }

        let received = match ticks.time_to_next() {
            Some(wait) => controls.recv_timeout(wait),
            None => controls.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(Control::Quit) => break,
            Ok(control) => apply(&mut app, control),
            Err(RecvTimeoutError::Timeout) => {
                ticks.fired();
                app.tick();
            }
            Err(RecvTimeoutError::Disconnected) => input_open = false,
        }
    }

    print_event(&app.timer().snapshot())
}

pub fn run(action: TimerAction, ctx: &Context) -> CmdResult {
    match action {
        TimerAction::Status => {
            let app = ctx.open();
            print_json(&app.timer().snapshot())?;
        }
        TimerAction::Run { tick_ms, sessions } => run_loop(ctx, tick_ms, sessions)?,
        TimerAction::Reset => {
            let mut app = ctx.open();
            app.reset_cycle()?;
            print_events(&mut app)?;
        }
    }
    Ok(())
}
