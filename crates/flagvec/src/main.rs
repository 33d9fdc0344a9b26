#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flagvec::emit::{self, Format, DEFAULT_SYMBOL_PREFIX};
use flagvec::{config::parse_filter_terms, ConfigError, GenConfig, Width};

#[derive(Parser, Debug)]
#[command(
    name = "flagvec",
    about = "Generate randomized, flag-covering test vectors for binary x86 instructions."
)]
struct Args {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t = Format::C)]
    format: Format,

    /// Write the tables to this path instead of stdout
    #[arg(long, short, value_name = "PATH")]
    out: Option<PathBuf>,

    /// RNG seed (overrides FLAGVEC_SEED)
    #[arg(long, value_name = "N", value_parser = parse_u64)]
    seed: Option<u64>,

    /// Slots per 8-bit run (overrides FLAGVEC_SLOTS_U8)
    #[arg(long, value_name = "N")]
    slots_u8: Option<usize>,

    /// Slots per 16-bit run (overrides FLAGVEC_SLOTS_U16)
    #[arg(long, value_name = "N")]
    slots_u16: Option<usize>,

    /// Slots per 32-bit run (overrides FLAGVEC_SLOTS_U32)
    #[arg(long, value_name = "N")]
    slots_u32: Option<usize>,

    /// Slots per 64-bit run (overrides FLAGVEC_SLOTS_U64)
    #[arg(long, value_name = "N")]
    slots_u64: Option<usize>,

    /// Attempts per slot before a flag constraint is abandoned
    #[arg(long, value_name = "N")]
    retry_ceiling: Option<u32>,

    /// Only generate these instructions (comma separated; overrides FLAGVEC_FILTER)
    #[arg(long, value_name = "NAMES")]
    filter: Option<String>,

    /// Prefix for emitted C symbols and file names
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_SYMBOL_PREFIX)]
    symbol_prefix: String,

    /// Write a JSON flag-coverage report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Suppress the coverage summary on stderr
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,
}

fn parse_u64(raw: &str) -> Result<u64, String> {
    flagvec::config::parse_number(raw).ok_or_else(|| format!("invalid number {raw:?}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args).context("invalid configuration")?;

    let synthesis = flagvec::generate_x86(&config).context("invalid configuration")?;
    let rendered =
        emit::render(&synthesis, args.format, &args.symbol_prefix).context("render tables")?;

    match &args.out {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }

    if let Some(path) = &args.report {
        synthesis
            .report
            .write_json(path)
            .with_context(|| format!("write report {}", path.display()))?;
    }
    if !args.quiet {
        synthesis.report.print_summary();
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<GenConfig, ConfigError> {
    let mut config = GenConfig::from_env()?;

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    for (width, slots) in [
        (Width::W8, args.slots_u8),
        (Width::W16, args.slots_u16),
        (Width::W32, args.slots_u32),
        (Width::W64, args.slots_u64),
    ] {
        if let Some(slots) = slots {
            config.slots.set(width, slots);
        }
    }
    if let Some(ceiling) = args.retry_ceiling {
        config.retry_ceiling = ceiling;
    }
    if let Some(filter) = &args.filter {
        config.filter = parse_filter_terms(filter);
    }

    Ok(config)
}
