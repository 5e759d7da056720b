//! Chakra CLI - Command-line interface for the ChakraFlow engine
//!
//! Commands:
//! - replay: Feed a captured serial dump through the sensor pipeline
//! - simulate: Drive a session from a script of classification frames

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chakraflow::beat::BeatDetector;
use chakraflow::{parse_record, LineFramer, SessionEngine, SpeechSink, TickInput, ENGINE_VERSION};

/// Chakra - Real-time biometric and gesture session engine
#[derive(Parser)]
#[command(name = "chakra")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Replay and simulate ChakraFlow sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a captured serial dump through framer, parser and beat detector
    Replay {
        /// Input capture file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Bytes fed to the framer per step, mimicking fragmented reads
        #[arg(long, default_value = "8")]
        chunk_size: usize,

        /// Synthetic milliseconds advanced per chunk
        #[arg(long, default_value = "25")]
        step_ms: u64,

        /// Print readings as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Drive a session engine from a frame script
    ///
    /// Script lines: `now_ms,gesture,eyes` with `-` for no gesture and
    /// `closed`/`open` for the eyes state. Blank lines and `#` comments are
    /// skipped.
    Simulate {
        /// Script file (use - for stdin)
        #[arg(short, long)]
        script: PathBuf,

        /// Print every snapshot as a JSON line, not only transitions
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            input,
            chunk_size,
            step_ms,
            json,
        } => run_replay(&input, chunk_size.max(1), step_ms, json),
        Commands::Simulate { script, json } => run_simulate(&script, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
    }
}

fn run_replay(input: &PathBuf, chunk_size: usize, step_ms: u64, json: bool) -> io::Result<()> {
    let capture = read_input(input)?;

    let mut framer = LineFramer::new();
    let mut detector = BeatDetector::default();
    let mut now_ms = 0u64;
    let mut total = 0usize;
    let mut decoded = 0usize;

    for chunk in capture.as_bytes().chunks(chunk_size) {
        now_ms += step_ms;
        let chunk = String::from_utf8_lossy(chunk);
        for record in framer.feed(&chunk) {
            total += 1;
            let Some(reading) = parse_record(&record) else {
                continue;
            };
            decoded += 1;
            let beat = detector.observe(&reading, now_ms);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "t_ms": now_ms,
                        "heart_rate": reading.heart_rate,
                        "spo2": reading.spo2,
                        "beat": beat,
                    })
                );
            } else {
                let pulse = if beat { " *beat*" } else { "" };
                println!(
                    "[{now_ms:>7}ms] hr={:<5.1} spo2={:<5.1}{pulse}",
                    reading.heart_rate, reading.spo2
                );
            }
        }
    }

    eprintln!("{decoded}/{total} records decoded");
    Ok(())
}

/// Speaks through stdout.
struct ConsoleVoice;

impl SpeechSink for ConsoleVoice {
    fn speak(&mut self, text: &str) {
        println!("  [voice] {text}");
    }
}

fn run_simulate(script: &PathBuf, json: bool) -> io::Result<()> {
    let script = read_input(script)?;

    let mut engine = SessionEngine::new();
    let mut sink = ConsoleVoice;

    for (line_no, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(input) = parse_frame(line) else {
            eprintln!("skipping malformed frame on line {}", line_no + 1);
            continue;
        };

        let snapshot = engine.update(&input, &mut sink);
        if json {
            println!(
                "{}",
                serde_json::to_string(&snapshot).map_err(io::Error::other)?
            );
        } else if !snapshot.events.is_empty() {
            for event in &snapshot.events {
                println!(
                    "[{:>7}ms] {:?} (mood {}, energy {:.2})",
                    input.now_ms,
                    event,
                    snapshot.mood.as_str(),
                    snapshot.bio.energy_level
                );
            }
        }
    }

    Ok(())
}

fn parse_frame(line: &str) -> Option<TickInput> {
    let mut parts = line.splitn(3, ',');
    let now_ms = parts.next()?.trim().parse::<u64>().ok()?;
    let gesture = match parts.next()?.trim() {
        "" | "-" => None,
        label => Some(label.to_string()),
    };
    let eyes_closed = match parts.next()?.trim() {
        "closed" | "1" => true,
        "open" | "0" => false,
        _ => return None,
    };
    Some(TickInput {
        gesture,
        eyes_closed,
        now_ms,
    })
}
