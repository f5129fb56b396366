use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use romdumplib::{
    DisplayLayout, DumpOptions, StreamDumper, bank_range, lorom_address_to_offset, parse_bank,
    parse_lorom_address, parse_number,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "romdump")]
#[command(about = "Hex-dump a file, optionally addressed through SNES LoROM banks")]
#[command(version)]
#[command(after_help = "Numbers accept 0x-prefix hex or decimal.\n\n\
Examples:\n  \
romdump image.bin -s 0x200 -n 256 -b 0x4000\n  \
romdump game.sfc --lorom 8486D0 -n 64\n  \
romdump game.sfc --bank 8F --header")]
struct Cli {
    /// File to dump
    file: PathBuf,

    /// Bytes to skip before the first line
    #[arg(
        short,
        long,
        value_parser = parse_number,
        default_value = "0",
        conflicts_with_all = ["lorom", "bank"]
    )]
    skip: u64,

    /// Maximum number of bytes to dump
    #[arg(short = 'n', long, value_parser = parse_number)]
    count: Option<u64>,

    /// Address shown for the first byte (default: the skip offset)
    #[arg(short, long, value_parser = parse_number)]
    base: Option<u64>,

    /// Bytes shown per line
    #[arg(short = 'w', long, alias = "bytesize", default_value_t = 16)]
    bytes_per_line: usize,

    /// Bytes per space-separated hex group
    #[arg(short, long, default_value_t = 8)]
    group_size: usize,

    /// Start at a LoROM address given as 6 hex digits (e.g. 8486D0)
    #[arg(long, value_parser = parse_lorom_address, conflicts_with = "bank")]
    lorom: Option<u32>,

    /// Dump a whole LoROM bank given as 2 hex digits (e.g. 8F)
    #[arg(long, value_parser = parse_bank)]
    bank: Option<u8>,

    /// The ROM has a 512-byte copier header
    #[arg(long)]
    header: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let layout = DisplayLayout::new(cli.bytes_per_line, cli.group_size)?;
    let (skip, count) = resolve_window(cli);
    let base = cli
        .base
        .map(usize::try_from)
        .transpose()
        .context("Base address is too large")?;

    let options = DumpOptions::default()
        .with_skip(skip)
        .with_count(count)
        .with_base(base)
        .with_layout(layout);

    log::debug!("Dumping {} with {options:?}", cli.file.display());

    // Guard: File must exist
    let file = File::open(&cli.file)
        .with_context(|| format!("Cannot open file: {}", cli.file.display()))?;

    let mut dumper = StreamDumper::new(file, options)?;

    let pb = cli.progress.then(create_progress_bar);
    if let Some(pb) = &pb {
        let pb = pb.clone();
        dumper = dumper.with_progress(move |percent| pb.set_position(u64::from(percent)));
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in dumper {
        let line = line?;
        if let Err(err) = out.write_all(line.text.as_bytes()) {
            return ignore_broken_pipe(err);
        }
    }
    if let Err(err) = out.flush() {
        return ignore_broken_pipe(err);
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Skip offset and byte count from either `--skip`, `--lorom` or `--bank`
fn resolve_window(cli: &Cli) -> (u64, Option<u64>) {
    if let Some(addr) = cli.lorom {
        let offset = lorom_address_to_offset(addr, cli.header);
        return (offset as u64, cli.count);
    }

    if let Some(bank) = cli.bank {
        let (start, end) = bank_range(bank, cli.header);
        let len = (end - start + 1) as u64;
        return (start as u64, Some(cli.count.map_or(len, |c| c.min(len))));
    }

    (cli.skip, cli.count)
}

/// Output closed by the reader (e.g. piped into `head`) is not an error
fn ignore_broken_pipe(err: io::Error) -> Result<()> {
    if err.kind() == io::ErrorKind::BrokenPipe {
        Ok(())
    } else {
        Err(err).context("Failed to write dump")
    }
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos:>3}%") {
        pb.set_style(style);
    }
    pb
}
