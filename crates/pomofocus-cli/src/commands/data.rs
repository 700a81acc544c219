use std::path::PathBuf;

use clap::Subcommand;

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum DataAction {
    /// Export every stored key as one JSON document
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all stored data with an exported JSON document
    Import {
        /// File produced by `data export`
        file: PathBuf,
    },
    /// Export the session history as CSV
    Csv {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn emit(content: &str, output: Option<PathBuf>) -> CmdResult {
    match output {
        Some(path) => {
            std::fs::write(&path, content)?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

pub fn run(action: DataAction, ctx: &Context) -> CmdResult {
    let mut app = ctx.open();

    match action {
        DataAction::Export { output } => {
            let mut json = app.export_json()?;
            json.push('\n');
            emit(&json, output)?;
        }
        DataAction::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let count = app.import_json(&json)?;
            println!("imported {count} keys");
        }
        DataAction::Csv { output } => emit(&app.sessions_csv()?, output)?,
    }
    Ok(())
}
