mod config;
mod layout;
mod sim;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strobe_core::payload::{Domain, RANGES};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strobe-cli")]
#[command(about = "Capacitive matrix keyboard simulator and keymap tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a depth trace through the firmware engine and print report changes
    Simulate {
        /// TOML keymap file (factory keymap when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trace file: one `<elapsed_ms> key=depth ...` line per cycle
        trace: PathBuf,
    },
    /// Render every layer of a keymap as HTML
    Layout {
        /// TOML keymap file (factory keymap when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output HTML file
        #[arg(short, long, default_value = "layout.html")]
        output: PathBuf,
    },
    /// Print the payload ranges and the domain each one dispatches to
    Ranges,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate { config, trace } => {
            let keymap = config::load_keymap(config.as_deref())?;
            let text = fs::read_to_string(&trace)
                .with_context(|| format!("reading {}", trace.display()))?;
            let steps = sim::parse_trace(&text)
                .with_context(|| format!("parsing {}", trace.display()))?;
            let records = sim::run(keymap, &steps)?;

            let mut previous: Option<&sim::CycleRecord> = None;
            for (cycle, record) in records.iter().enumerate() {
                if previous.is_some_and(|p| {
                    p.keyboard == record.keyboard
                        && p.mouse == record.mouse
                        && p.joystick == record.joystick
                        && p.layers == record.layers
                }) {
                    continue;
                }
                println!(
                    "{:>5} {:>8}ms  layers={:016b}  mods={:02X} keys={:02X?}  mouse={:06b}  joy={:08X}",
                    cycle,
                    record.time_ms,
                    record.layers,
                    record.keyboard.modifiers,
                    record.keyboard.keys,
                    record.mouse.buttons,
                    record.joystick.buttons,
                );
                previous = Some(record);
            }
        }
        Command::Layout { config, output } => {
            let keymap = config::load_keymap(config.as_deref())?;
            let html = layout::generate_html(&keymap);
            fs::write(&output, &html).with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "layout written");
        }
        Command::Ranges => {
            for r in &RANGES {
                println!(
                    "0x{:02X}-0x{:02X}  {:<10} index = payload - 0x{:02X}",
                    r.low,
                    r.high,
                    Domain::classify(r.low).name(),
                    r.base
                );
            }
            println!("(other)      {}", Domain::Unassigned.name());
        }
    }

    Ok(())
}
