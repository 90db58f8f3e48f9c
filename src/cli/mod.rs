//! CLI command implementations for crush.
//!
//! Provides subcommand handlers for:
//! - `crush run [TEXT]` — collapse text from arguments or stdin
//! - `crush trace TEXT` — show every deletion on the way to the result
//! - `crush json` — JSON request/response over stdin/stdout
//! - `crush stats` — summary of the analytics log
//! - `crush config show|init|set|reset` — configuration management

use std::io::{Read, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::reporter::{self, DayEntry, Stats};
use crate::collapse::{self, rescan};
use crate::config::{self, CrushConfig};
use crate::config::schema::expand_home;
use crate::handler::trim::TrimListener;
use crate::handler::{Handler, Listener, RequestData, protocol};

/// Output format for `crush stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// crush run
// ---------------------------------------------------------------------------

/// Collapse the given words (joined by single spaces), or all of stdin when
/// no words are given, and print the result.
pub fn run_collapse(handler: &Handler, args: &[String]) -> Result<()> {
    let input = if args.is_empty() {
        read_stdin()?
    } else {
        args.join(" ")
    };

    let response = handler.handle(Some(&input))?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", response.output).context("failed writing output to stdout")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// crush trace
// ---------------------------------------------------------------------------

/// Print each deletion (or each simultaneous-removal round) for `text`,
/// after the same trimming `crush run` applies when `trim` is set.
pub fn run_trace(text: &str, min_run: usize, by_rounds: bool, trim: bool) -> Result<()> {
    let text = trace_input(text, trim);
    let text = text.as_str();
    let min_run = min_run.max(collapse::MIN_THRESHOLD);
    let result = collapse::collapse_runs_of(text, min_run);

    println!(
        "{} {:?} {}",
        "Trace for".bold().cyan(),
        text,
        format!("(min run {min_run})").dimmed()
    );
    println!("{}", "=".repeat(50));

    if by_rounds {
        let rounds = rescan::rounds(text, min_run);
        if rounds.is_empty() {
            println!("  {}", "no qualifying run".dimmed());
        }
        for (i, round) in rounds.iter().enumerate() {
            println!("  {:>3}. {} {}", i + 1, "→".dimmed(), show(round));
        }

        let final_round = rounds.last().map(String::as_str).unwrap_or(text);
        if final_round != result {
            println!();
            println!(
                "  {} removing all runs per pass ends at {}, one run at a time ends at {}",
                "Note:".yellow().bold(),
                show(final_round),
                show(&result),
            );
        }
    } else {
        let steps = rescan::steps(text, min_run);
        if steps.is_empty() {
            println!("  {}", "no qualifying run".dimmed());
        }
        for (i, step) in steps.iter().enumerate() {
            let removed: String = std::iter::repeat_n(step.removed.ch, step.removed.len).collect();
            println!(
                "  {:>3}. remove {} at {:<4} {} {}",
                i + 1,
                removed.red(),
                step.removed.start,
                "→".dimmed(),
                show(&step.result),
            );
        }
    }

    println!();
    println!("  {} {}", "Result:".bold(), show(&result).green());
    Ok(())
}

fn show(text: &str) -> String {
    if text.is_empty() {
        "(empty)".to_string()
    } else {
        truncate(text, 80)
    }
}

/// Pre-process `text` for tracing the way the configured handler would.
fn trace_input(text: &str, trim: bool) -> String {
    let mut request = RequestData::new(text);
    if trim {
        TrimListener.before(&mut request);
    }
    request.preprocessed
}

// ---------------------------------------------------------------------------
// crush json
// ---------------------------------------------------------------------------

/// Read one JSON request from stdin and write one JSON response to stdout.
pub fn run_json(handler: &Handler) -> Result<()> {
    let raw = read_stdin()?;
    let response = protocol::respond(handler, &raw);

    let json = serde_json::to_string(&response).context("failed to serialize response")?;
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{json}").context("failed writing response to stdout")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// crush stats
// ---------------------------------------------------------------------------

/// Show collapse statistics from the analytics log.
pub fn run_stats(config: &CrushConfig, format: OutputFormat, days: Option<u32>) -> Result<()> {
    let path = expand_home(&config.analytics.path).context("could not determine home directory")?;
    let stats = reporter::compute_stats(&path, days);

    if stats.total_collapses == 0 {
        println!(
            "{}",
            "No data yet. Collapse some strings with `crush run` to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats.daily),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "crush Collapse Report".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    let removed = stats
        .total_input_chars
        .saturating_sub(stats.total_output_chars);
    println!("  {} {}", "Collapses:        ".bold(), stats.total_collapses);
    println!(
        "  {} {}",
        "Characters in:    ".bold(),
        format_number(stats.total_input_chars)
    );
    println!("  {} {}", "Characters removed:".bold(), format_number(removed));
    println!("  {} {:.1}%", "Reduction:        ".bold(), stats.reduction_pct);
    println!(
        "  {} {}",
        "Fully collapsed:  ".bold(),
        stats.fully_collapsed
    );
    println!("  {} {}", "Unchanged:        ".bold(), stats.unchanged);
    println!(
        "  {} {}",
        "Longest input:    ".bold(),
        format_number(stats.longest_input)
    );
    println!("  {} {:.1}us", "Avg duration:     ".bold(), stats.avg_duration_us);
    println!();

    println!("{}", "By Day".bold().cyan());
    println!(
        "  {:<12} {:>10} {:>12} {:>10}",
        "Date", "Collapses", "Removed", "Reduction"
    );
    println!("  {}", "-".repeat(48));
    for (i, day) in stats.daily.iter().enumerate() {
        let line = format!(
            "  {:<12} {:>10} {:>12} {:>9.1}%",
            day.date,
            day.collapses,
            format_number(day.removed_chars),
            day.reduction_pct,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total_collapses": stats.total_collapses,
        "total_input_chars": stats.total_input_chars,
        "total_output_chars": stats.total_output_chars,
        "reduction_pct": stats.reduction_pct,
        "fully_collapsed": stats.fully_collapsed,
        "unchanged": stats.unchanged,
        "longest_input": stats.longest_input,
        "avg_duration_us": stats.avg_duration_us,
        "daily": stats.daily.iter().map(|d| serde_json::json!({
            "date": d.date,
            "collapses": d.collapses,
            "removed_chars": d.removed_chars,
            "reduction_pct": d.reduction_pct,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(daily: &[DayEntry]) {
    println!("date,collapses,removed_chars,reduction_pct");
    for d in daily {
        println!(
            "{},{},{},{:.1}",
            d.date, d.collapses, d.removed_chars, d.reduction_pct
        );
    }
}

// ---------------------------------------------------------------------------
// crush config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective crush Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.crush/config.toml", global_exists);
    print_source(".crush.toml", project_exists);
    println!("  {} {}", "·".dimmed(), "CRUSH_* environment variables".dimmed());

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.crush/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed reading input from stdin")?;
    Ok(buf)
}

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
