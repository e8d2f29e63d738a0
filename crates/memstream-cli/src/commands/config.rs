use clap::Subcommand;
use memstream_core::Config;

use crate::common::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot-separated key (e.g. "escalation.cool_down_secs")
        key: String,
    },
    /// Change one value and save
    Set {
        /// Dot-separated key
        key: String,
        /// New value; arrays as JSON (e.g. "[8000, 4000]")
        value: String,
    },
    /// Show values as `key = value`, optionally for one section
    List {
        /// escalation, share_prompt, social or oauth
        section: Option<String>,
        /// Print the section (or whole config) as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Restore defaults for one section, or everything
    Reset {
        section: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List { section, json } => {
            let config = Config::load()?;
            if json {
                let mut value = serde_json::to_value(&config)?;
                if let Some(name) = section.as_deref() {
                    value = value
                        .get(name)
                        .cloned()
                        .ok_or_else(|| format!("unknown section: {name}"))?;
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            let entries = config.entries(section.as_deref());
            if entries.is_empty() {
                if let Some(name) = section {
                    return Err(format!("unknown section: {name}").into());
                }
            }
            for (key, value) in entries {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset { section: None } => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Reset {
            section: Some(name),
        } => {
            let mut config = Config::load()?;
            config.reset_section(&name)?;
            config.save()?;
            println!("[{name}] reset to defaults");
        }
    }
    Ok(())
}
