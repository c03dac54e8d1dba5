//! CLI command implementations.

pub mod agent;
pub mod catalog;

use std::io::Write;

use serde_json::Value;

/// Pretty-print a JSON value to stdout.
fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
