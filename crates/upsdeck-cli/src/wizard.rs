//! Interactive multi-device selection for the setup wizard
//!
//! Candidates come from a scan-results JSON file produced upstream; the
//! loop drives the shared [`SetupWorkflow`] the same way the graphical
//! front end does, then prints the validated selection for the next wizard
//! step to consume.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;
use upsdeck_core::UpsDevice;
use upsdeck_ui::{SetupView, SetupWorkflow};

/// Load scan-discovered candidate devices from a JSON file
pub fn load_candidates(path: &Path) -> Result<Vec<UpsDevice>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan results from {}", path.display()))?;
    let devices: Vec<UpsDevice> =
        serde_json::from_str(&content).context("Scan results file is not a device list")?;
    Ok(devices)
}

/// Run the selection loop until the user finishes or quits
///
/// Returns the selected devices on `done` (after validation passes), or
/// `None` on `quit`.
pub fn run<V: SetupView>(
    workflow: &mut SetupWorkflow<V>,
    mode: &str,
    candidates: &[UpsDevice],
) -> Result<Option<Vec<UpsDevice>>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    print_candidates(workflow, mode, candidates);
    println!("Commands: s <n> select/deselect, c <n> configure, list, clear, done, quit");

    loop {
        print!("setup({mode})> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            // EOF declines the whole selection, same as quit.
            return Ok(None);
        };
        let line = line?;
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("list"), _) => print_candidates(workflow, mode, candidates),
            (Some("s"), Some(n)) => {
                let Some(device) = candidate(candidates, n) else {
                    println!("No such device");
                    continue;
                };
                if workflow.selected(mode).iter().any(|d| d.name == device.name) {
                    workflow.deselect(mode, &device.name);
                } else {
                    workflow.select(mode, device.clone());
                }
            }
            (Some("c"), Some(n)) => {
                let Some(device) = candidate(candidates, n) else {
                    println!("No such device");
                    continue;
                };
                workflow.configure(mode, &device.name);
                if workflow.form().is_some() {
                    prompt_config(workflow, &mut lines)?;
                }
            }
            (Some("clear"), _) => workflow.clear(mode),
            (Some("done"), _) => {
                if workflow.validate(mode) {
                    return Ok(Some(workflow.selected(mode).to_vec()));
                }
            }
            (Some("quit"), _) => return Ok(None),
            (None, _) => {}
            _ => println!("Unknown command"),
        }
    }
}

fn candidate<'a>(candidates: &'a [UpsDevice], index: &str) -> Option<&'a UpsDevice> {
    let n: usize = index.parse().ok()?;
    candidates.get(n.checked_sub(1)?)
}

fn print_candidates<V: SetupView>(
    workflow: &SetupWorkflow<V>,
    mode: &str,
    candidates: &[UpsDevice],
) {
    for (i, device) in candidates.iter().enumerate() {
        let mark = if workflow.selected(mode).iter().any(|d| d.name == device.name) {
            "x"
        } else {
            " "
        };
        println!(
            "  [{mark}] {} {} ({}@{}:{})",
            i + 1,
            device.display_name(),
            device.driver,
            device.host,
            device.port
        );
    }
}

/// Prompt for the configuration form fields, empty input keeps the default
fn prompt_config<V: SetupView>(
    workflow: &mut SetupWorkflow<V>,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Result<()> {
    let Some(mut form) = workflow.form().cloned() else {
        return Ok(());
    };

    if let Some(value) = prompt(lines, &format!("NUT name [{}]", form.name))? {
        form.name = value;
    }
    if let Some(value) = prompt(lines, &format!("Friendly name [{}]", form.friendly_name))? {
        form.friendly_name = value;
    }
    if let Some(value) = prompt(lines, &format!("Description [{}]", form.description))? {
        form.description = value;
    }
    let power_default = form
        .realpower_nominal
        .map(|w| w.to_string())
        .unwrap_or_default();
    if let Some(value) = prompt(lines, &format!("Nominal power in watts [{power_default}]"))? {
        match value.parse() {
            Ok(watts) => form.realpower_nominal = Some(watts),
            Err(_) => println!("Not a number, keeping previous value"),
        }
    }
    let primary_default = if form.is_primary { "Y/n" } else { "y/N" };
    if let Some(value) = prompt(lines, &format!("Primary device? [{primary_default}]"))? {
        form.is_primary = matches!(value.to_lowercase().as_str(), "y" | "yes");
    }

    debug!(name = %form.name, "Configuration form completed");
    workflow.set_form(form);
    workflow.apply_config();
    Ok(())
}

/// Read one prompted line; `None` means keep the current value
fn prompt(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    label: &str,
) -> Result<Option<String>> {
    print!("  {label}: ");
    std::io::stdout().flush()?;
    match lines.next() {
        Some(line) => {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        None => Ok(None),
    }
}
