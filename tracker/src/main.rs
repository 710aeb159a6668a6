//! Headless host for the attendance tracker core.
//!
//! ```text
//! attendance-tracker <command> [request-json]
//! attendance-tracker session
//! ```
//!
//! One-shot mode runs a single command and prints its JSON response. Session
//! mode reads one `{"command": ..., "request": ...}` object per stdin line,
//! answers each on stdout, runs the hourly backup timer between commands and
//! a final backup at end of input.
//!
//! The timer is cooperative: it is only checked after a command is answered,
//! so a session idling on stdin takes no timed backups until the next line or
//! end of input. One-shot mode backs up on exit only after a command that
//! modifies data; read-only calls never rotate real snapshots out.

use anyhow::{bail, Context, Result};
use chrono::Local;
use log::{error, info};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

use attendance_tracker::backend::domain::BackupScheduler;
use attendance_tracker::backend::io::{dispatch, UiCommand};
use attendance_tracker::backend::Backend;

const USAGE: &str = "usage: attendance-tracker <command> [request-json] | attendance-tracker session";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting attendance tracker");

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command_name) = args.first() else {
        bail!(USAGE);
    };

    let backend = Backend::new().context("Failed to open the data directory")?;
    backend
        .roster_service
        .initialize_all_classes()
        .context("Failed to create class tables")?;
    if let Some(class_num) = backend.settings_service.last_selected_class() {
        info!("Last selected class: {}", class_num);
    }

    if command_name == "session" {
        run_session(&backend)
    } else {
        run_once(&backend, command_name, args.get(1).map(String::as_str))
    }
}

fn run_once(backend: &Backend, command_name: &str, request: Option<&str>) -> Result<()> {
    let command = parse_command(command_name, request)?;
    let modifies_data = command.modifies_data();

    let outcome = dispatch(backend, command);
    println!("{}", envelope(outcome.clone()));

    // Read-only commands skip the exit backup
    if modifies_data {
        let interval = backend.settings_service.backup_interval_minutes();
        BackupScheduler::new(interval, Local::now().naive_local())
            .on_shutdown(Local::now().naive_local(), &backend.backup_service);
    }

    if let Err(message) = outcome {
        bail!(message);
    }
    Ok(())
}

fn run_session(backend: &Backend) -> Result<()> {
    let interval = backend.settings_service.backup_interval_minutes();
    let mut scheduler = BackupScheduler::new(interval, Local::now().naive_local());
    info!("Session started, backing up every {} minutes", scheduler.interval().num_minutes());

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<UiCommand>(&line) {
            Ok(command) => dispatch(backend, command),
            Err(e) => {
                error!("Unreadable command: {}", e);
                Err(format!("Unreadable command: {}", e))
            }
        };
        writeln!(stdout, "{}", envelope(outcome)).context("Failed to write response")?;
        stdout.flush().context("Failed to write response")?;

        scheduler.tick(Local::now().naive_local(), &backend.backup_service);
    }

    scheduler.on_shutdown(Local::now().naive_local(), &backend.backup_service);
    info!("Session ended");
    Ok(())
}

fn parse_command(name: &str, request: Option<&str>) -> Result<UiCommand> {
    let mut value = json!({ "command": name });
    if let Some(request) = request {
        let request: Value = serde_json::from_str(request)
            .with_context(|| format!("Request for '{}' is not valid JSON", name))?;
        value["request"] = request;
    }
    serde_json::from_value(value).with_context(|| format!("Unknown command or bad request: {}\n{}", name, USAGE))
}

fn envelope(outcome: std::result::Result<Value, String>) -> Value {
    match outcome {
        Ok(response) => json!({ "ok": true, "response": response }),
        Err(message) => json!({ "ok": false, "error": message }),
    }
}
