//! Color support reporting CLI.
//!
//! Shows what glint detects for the current process:
//! - Whether stdout is a terminal (native or MSYS2/Cygwin)
//! - Whether color should be used, and at which level
//! - Any manual override in effect
//! - The recognized environment variables that influenced detection

use std::collections::BTreeMap;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use glint::{ColorLevel, ColorSupport, Override, Stream, is_compatibility_terminal, is_terminal};
use serde::Serialize;

/// Terminal color support utility
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(author, version, about = "Report whether this terminal supports color")]
struct Args {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (list the environment variables that were read)
    #[arg(short, long)]
    verbose: bool,

    /// Override detection before reporting
    #[arg(long, value_name = "MODE")]
    force: Option<ForceMode>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ForceMode {
    /// force color on (NO_COLOR still wins)
    On,
    /// force color off
    Off,
}

#[derive(Debug, Serialize)]
struct Report {
    /// Whether stdout is a native terminal
    is_terminal: bool,
    /// Whether stdout is an MSYS2/Cygwin pty
    is_compatibility_terminal: bool,
    /// Whether color output should be used
    color_supported: bool,
    /// Detected color level
    color_level: ColorLevel,
    /// Number of colors at that level
    colors: u32,
    /// Human-readable description
    description: &'static str,
    /// Manual override in effect
    #[serde(rename = "override")]
    override_state: Override,
    /// Recognized environment variables with a value
    env: BTreeMap<&'static str, String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Setup logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "glint", &mut std::io::stdout());
        return Ok(());
    }

    let support = ColorSupport::new();
    match args.force {
        Some(ForceMode::On) => support.force_color(true),
        Some(ForceMode::Off) => support.force_color(false),
        None => {}
    }

    let report = collect_report(&support);
    tracing::debug!(?report, "Collected color report");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_pretty(&report, support.color_level_description(), args.verbose);
    }

    Ok(())
}

fn collect_report(support: &ColorSupport) -> Report {
    let level = support.color_level();
    let snapshot = support.env().snapshot();

    Report {
        is_terminal: is_terminal(Stream::Stdout),
        is_compatibility_terminal: is_compatibility_terminal(Stream::Stdout),
        color_supported: support.color_supported(),
        color_level: level,
        colors: level.colors(),
        description: level.description(),
        override_state: support.override_state(),
        env: snapshot
            .iter()
            .map(|(var, value)| (var.name(), value.to_string()))
            .collect(),
    }
}

fn print_pretty(report: &Report, summary: &str, verbose: bool) {
    // Only style the report when it is going somewhere that can show it
    let color = report.color_supported;

    let bold = if color { "\x1b[1m" } else { "" };
    let dim = if color { "\x1b[2m" } else { "" };
    let reset = if color { "\x1b[0m" } else { "" };
    let green = if color { "\x1b[32m" } else { "" };

    let yes_no = |value: bool| {
        if value {
            format!("{}yes{}", green, reset)
        } else {
            "no".to_string()
        }
    };

    println!("{}Color Support{}", bold, reset);
    println!("{}═════════════════════════════{}", dim, reset);
    println!("  Terminal:   {}", yes_no(report.is_terminal));
    println!("  MSYS pty:   {}", yes_no(report.is_compatibility_terminal));
    println!("  Supported:  {}", yes_no(report.color_supported));
    println!("  Level:      {:?} ({} colors)", report.color_level, report.colors);
    println!("  Override:   {:?}", report.override_state);
    println!("  Summary:    {}", summary);

    if verbose {
        println!("\n{}Environment{}", bold, reset);
        if report.env.is_empty() {
            println!("  {}none of the recognized variables are set{}", dim, reset);
        }
        for (name, value) in &report.env {
            println!("  {:<22}{}", name, value);
        }
    }
}
