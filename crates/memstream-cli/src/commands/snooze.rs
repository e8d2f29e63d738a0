use std::time::Duration;

use clap::Subcommand;
use memstream_core::Clock;

use crate::common::{clock, open_store, snooze_gate, CliResult};

#[derive(Subcommand)]
pub enum SnoozeAction {
    /// Show whether nagging is currently suppressed
    Status,
    /// Suppress nagging for a number of seconds
    Set {
        /// Snooze length in seconds
        secs: u64,
    },
    /// Lift the snooze immediately
    Clear,
}

pub fn run(action: SnoozeAction) -> CliResult {
    let store = open_store()?;
    let gate = snooze_gate(&store);
    let now = clock().now();

    match action {
        SnoozeAction::Status => match gate.remaining(now) {
            Some(left) => println!(
                "snoozing for {}s (until {})",
                left.as_secs(),
                gate.snooze_until().map(|t| t.to_rfc3339()).unwrap_or_default()
            ),
            None => println!("not snoozing"),
        },
        SnoozeAction::Set { secs } => {
            let until = gate.snooze_for(Duration::from_secs(secs), now)?;
            println!("snoozed until {}", until.to_rfc3339());
        }
        SnoozeAction::Clear => {
            gate.clear()?;
            println!("snooze cleared");
        }
    }
    Ok(())
}
