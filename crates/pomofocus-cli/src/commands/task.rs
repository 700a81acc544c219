//! Task management commands for CLI.

use clap::{Subcommand, ValueEnum};
use pomofocus_core::{Priority, TaskEdit, TaskFilter};

use super::{print_events, print_json, CmdResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for TaskFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => TaskFilter::All,
            FilterArg::Active => TaskFilter::Active,
            FilterArg::Completed => TaskFilter::Completed,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the top of the list
    Add {
        /// Task name
        name: String,
    },
    /// List tasks
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
    /// Toggle a task between completed and active
    Toggle {
        /// Task ID
        id: String,
    },
    /// Count one pomodoro against a task
    Pomodoro {
        /// Task ID
        id: String,
    },
    /// Edit a task; omitted fields keep their value
    Edit {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New estimated pomodoros
        #[arg(long)]
        estimate: Option<u32>,
        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<Priority>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn not_found(id: &str) -> Box<dyn std::error::Error> {
    format!("task not found: {id}").into()
}

pub fn run(action: TaskAction, ctx: &Context) -> CmdResult {
    let mut app = ctx.open();

    match action {
        TaskAction::Add { name } => {
            let task = app.add_task(&name)?;
            print_json(&task)?;
        }
        TaskAction::List { filter } => {
            print_json(&app.filter_tasks(filter.into()))?;
        }
        TaskAction::Toggle { id } => {
            if app.toggle_task(&id)?.is_none() {
                return Err(not_found(&id));
            }
            print_events(&mut app)?;
        }
        TaskAction::Pomodoro { id } => {
            if app.task(&id).is_none() {
                return Err(not_found(&id));
            }
            if !app.increment_task_pomodoro(&id)? {
                eprintln!("task already at its estimate");
            }
            print_events(&mut app)?;
        }
        TaskAction::Edit {
            id,
            name,
            estimate,
            priority,
            notes,
        } => {
            let current = app.task(&id).ok_or_else(|| not_found(&id))?;
            let mut edit = TaskEdit::from_task(current);
            if let Some(name) = name {
                edit.name = name;
            }
            if let Some(estimate) = estimate {
                edit.estimated_pomodoros = estimate;
            }
            if let Some(priority) = priority {
                edit.priority = priority;
            }
            if let Some(notes) = notes {
                edit.notes = notes;
            }
            app.edit_task(&id, edit)?;
            if let Some(task) = app.task(&id) {
                print_json(task)?;
            }
        }
        TaskAction::Delete { id } => {
            if !app.delete_task(&id)? {
                return Err(not_found(&id));
            }
            print_events(&mut app)?;
        }
    }
    Ok(())
}
