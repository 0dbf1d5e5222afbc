//! Coloured terminal output for the interactive console.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use crate::console::StatsHistory;
use crate::players::{BanEntry, WhitelistEntry};
use crate::server::{ConsoleLine, KillOutcome, LineOrigin, PerformanceSample, ServerStatus, StopOutcome};

fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis if
/// anything was cut.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// One-line summary of a performance sample.
#[must_use]
pub fn format_sample(sample: &PerformanceSample) -> String {
    format!("CPU {:.1}% | RAM {:.1} MB", sample.cpu_percent, sample.memory_mb())
}

/// Print a line of server console output.
pub fn print_console_line(line: &ConsoleLine) {
    let ts = clock(line.received_at);
    match line.origin {
        LineOrigin::Stdout => println!("{} {}", ts.dimmed(), line.text),
        LineOrigin::Stderr => println!("{} {}", ts.dimmed(), line.text.yellow()),
        LineOrigin::Supervisor => {
            println!("{} {} {}", ts.dimmed(), "[MANAGER]".magenta().bold(), line.text);
        }
    }
    let _ = io::stdout().flush();
}

/// Print the server status.
pub fn print_status(status: ServerStatus, pid: Option<u32>) {
    let label = match status {
        ServerStatus::Online => "Online".green().bold().to_string(),
        ServerStatus::Offline => "Offline".red().bold().to_string(),
    };
    let pid = pid.map_or(String::new(), |pid| format!("pid={pid}"));
    println!("{} {} {}", "[STATUS]".blue().bold(), label, pid.dimmed());
    let _ = io::stdout().flush();
}

/// Print the latest sample plus aggregates over the retained history.
pub fn print_stats(sample: &PerformanceSample, history: &StatsHistory) {
    println!(
        "{} {} {}",
        "[STATS]".cyan().bold(),
        format_sample(sample),
        format!(
            "(avg CPU {:.1}%, peak RAM {:.1} MB over {} samples)",
            history.average_cpu(),
            history.peak_memory_mb(),
            history.len()
        )
        .dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print how a stop request ended.
pub fn print_stop_outcome(outcome: StopOutcome) {
    match outcome {
        StopOutcome::NotRunning => print_info("Server is not running"),
        StopOutcome::Exited => println!("{} Server shut down cleanly", "[STOP]".green().bold()),
        StopOutcome::Killed => println!(
            "{} Server ignored the stop command and was killed",
            "[STOP]".yellow().bold()
        ),
    }
    let _ = io::stdout().flush();
}

/// Print how a kill request ended.
pub fn print_kill_outcome(outcome: KillOutcome) {
    match outcome {
        KillOutcome::NoProcess => print_info("No server process to kill"),
        KillOutcome::Killed { descendants } => println!(
            "{} Server killed ({descendants} child processes)",
            "[KILL]".red().bold()
        ),
    }
    let _ = io::stdout().flush();
}

pub fn print_whitelist(entries: &[WhitelistEntry]) {
    if entries.is_empty() {
        print_info("Whitelist is empty");
        return;
    }
    for entry in entries {
        println!("{} {}", entry.name.bold(), entry.uuid.dimmed());
    }
}

pub fn print_bans(entries: &[BanEntry]) {
    if entries.is_empty() {
        print_info("No banned players");
        return;
    }
    for entry in entries {
        println!(
            "{} {} {} {}",
            entry.name.bold(),
            entry.uuid.dimmed(),
            truncate(&entry.reason, 60),
            format!("(since {}, expires {})", entry.created, entry.expires).dimmed()
        );
    }
}

/// Print an informational message.
pub fn print_info(message: &str) {
    println!("{} {}", "[INFO]".blue().bold(), message);
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
