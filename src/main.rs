//! `midi-range`: prints the lowest and highest note of every channel in a MIDI file

use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use midi_range::{
    load_midi,
    range::{analyze, ScanMode},
    report::Report,
    LoadError,
};
use thiserror::Error;
use tracing::{debug, info, Level};

/// Analyze note ranges per MIDI channel
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to a MIDI file
    midi_file: PathBuf,

    /// Only report these channels (1-16), even if they play nothing. Repeat for more channels
    #[arg(
        short,
        long = "channel",
        value_name = "CHANNEL",
        value_parser = clap::value_parser!(u8).range(1..=16)
    )]
    channels: Vec<u8>,

    /// Log more detail to stderr, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// The scan mode the channel options ask for
    fn scan_mode(&self) -> ScanMode {
        if self.channels.is_empty() {
            ScanMode::Discover
        } else {
            ScanMode::fixed(self.channels.iter().map(|channel| channel - 1))
        }
    }
}

/// Reasons the analysis could not be printed
#[derive(Debug, Error)]
enum CliError {
    /// The path is missing or not a regular file
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// The file could not be read as MIDI
    #[error("Analysis failed: {0}")]
    Analysis(#[from] LoadError),
}

/// Sends logs to stderr so stdout only ever carries the report
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Loads, scans and renders the file named on the command line
fn run(cli: &Cli) -> Result<String, CliError> {
    let path = &cli.midi_file;
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.clone()));
    }

    let mode = cli.scan_mode();
    info!(path = %path.display(), ?mode, "analyzing");

    let midi = load_midi(path)?;
    info!(
        format = ?midi.header().format(),
        tracks = midi.tracks().len(),
        "loaded MIDI file"
    );

    let ranges = analyze(&midi, &mode);

    let file_name = path
        .file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy();

    Ok(Report::new(&file_name, &ranges).to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Usage errors exit with 1 rather than clap's 2
        Err(e) if e.use_stderr() => {
            eprint!("{e}");
            return ExitCode::FAILURE;
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!(error = ?e, "analysis did not complete");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
