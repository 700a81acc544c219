//! `config.toml` access by dot-separated key.

use clap::Subcommand;
use pomofocus_core::Config;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `storage.quota_bytes`
    Get { key: String },
    /// Change one value and write the file
    Set { key: String, value: String },
    /// Print the whole configuration as JSON
    List,
    /// Overwrite the file with built-in defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    if let ConfigAction::Reset = action {
        let defaults = Config::default();
        defaults.save()?;
        return print_json(&defaults);
    }

    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => {
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List => print_json(&config)?,
        ConfigAction::Reset => {}
    }
    Ok(())
}
