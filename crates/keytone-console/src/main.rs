//! Command line frontend for the keytone core.
//!
//! Runs the real device state machine against host-backed collaborators:
//! `list` scans a directory the way Song-Select does, `check` dry-runs the
//! script parser over one file, and `play` performs a song end-to-end with
//! an auto-player on the keys. Peripheral traffic is traced through `log`
//! (`RUST_LOG=debug` shows every LCD frame and LED latch).

use std::cell::Cell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell as TableCell, ContentArrangement, Table, presets::NOTHING};

use keytone::device::{Device, DeviceConfig, Mode};
use keytone::hal::ScriptStore;
use keytone::script::{ScriptLine, ScriptStream, SongName, parse_line};

mod sim;
use sim::{ConsoleDisplay, DirStore, LedSink, LightChaser, SimClock, ToneSink};

/// keytone host tools
#[derive(Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory for song scripts, as Song-Select does on the board
    List {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Parse one script and show every line's classification
    Check {
        /// Script file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Play one song through the real Song-Play handler
    Play {
        /// Directory holding the scripts
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Script filename to play
        #[arg(value_name = "SONG")]
        song: String,
        /// Deliberately miss the Nth lit step (1-based) to exercise failure
        #[arg(long, value_name = "N")]
        miss_at: Option<usize>,
        /// Use a virtual clock instead of sleeping in real time
        #[arg(long)]
        fast: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List { dir } => list_songs(&dir),
        Commands::Check { file } => check_script(&file),
        Commands::Play {
            dir,
            song,
            miss_at,
            fast,
        } => play_song(&dir, &song, miss_at, fast),
    }
}

fn list_songs(dir: &PathBuf) -> Result<()> {
    let mut store = DirStore::new(dir);
    if !store.available() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let limit = DeviceConfig::default().max_song_entries;
    let names = store
        .list_scripts(limit)
        .with_context(|| format!("failed to scan {}", dir.display()))?;

    if names.is_empty() {
        println!("no songs under {}", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        TableCell::new("#"),
        TableCell::new("Name"),
        TableCell::new("Steps"),
        TableCell::new("Rests"),
        TableCell::new("Length (ms)"),
    ]);

    for (index, name) in names.iter().enumerate() {
        let (steps, rests, total_ms) = match store.open(name) {
            Ok(reader) => summarize_script(reader),
            Err(_) => (0, 0, 0),
        };
        table.add_row(vec![
            TableCell::new(index + 1),
            TableCell::new(name.as_str()),
            TableCell::new(steps),
            TableCell::new(rests),
            TableCell::new(total_ms),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Count playable steps, rests among them, and the nominal length.
fn summarize_script<R: BufRead>(reader: R) -> (usize, usize, u64) {
    let mut steps = 0usize;
    let mut rests = 0usize;
    let mut total_ms = 0u64;
    for step in ScriptStream::new(reader).flatten() {
        steps += 1;
        if step.is_rest() {
            rests += 1;
        }
        total_ms += u64::from(step.duration_ms);
    }
    (steps, rests, total_ms)
}

fn check_script(file: &PathBuf) -> Result<()> {
    let handle =
        File::open(file).with_context(|| format!("failed to open {}", file.display()))?;

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        TableCell::new("Line"),
        TableCell::new("Kind"),
        TableCell::new("Keys"),
        TableCell::new("ms"),
    ]);

    let mut steps = 0usize;
    let mut rests = 0usize;
    let mut noise = 0usize;
    let mut total_ms = 0u64;

    for (index, line) in BufReader::new(handle).lines().enumerate() {
        let line = line.with_context(|| format!("read error in {}", file.display()))?;
        let (kind, keys, ms) = match parse_line(&line) {
            ScriptLine::Step(step) if step.is_rest() => {
                steps += 1;
                rests += 1;
                total_ms += u64::from(step.duration_ms);
                ("rest", String::new(), step.duration_ms.to_string())
            }
            ScriptLine::Step(step) => {
                steps += 1;
                total_ms += u64::from(step.duration_ms);
                let keys = step
                    .mask
                    .keys()
                    .map(|key| key.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                ("step", keys, step.duration_ms.to_string())
            }
            ScriptLine::Comment => ("comment", String::new(), String::new()),
            ScriptLine::Blank => ("blank", String::new(), String::new()),
            ScriptLine::Skipped => {
                noise += 1;
                ("skipped", String::new(), String::new())
            }
        };
        table.add_row(vec![
            TableCell::new(index + 1),
            TableCell::new(kind),
            TableCell::new(keys),
            TableCell::new(ms),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "{} steps ({} rests), {} malformed lines, {} ms nominal length",
        steps, rests, noise, total_ms
    );
    Ok(())
}

fn play_song(dir: &PathBuf, song: &str, miss_at: Option<usize>, fast: bool) -> Result<()> {
    let mut store = DirStore::new(dir);
    if !store.available() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    // Refuse up front instead of letting the device report an open failure:
    // a failed open lands in Song-Select, which on an empty directory falls
    // through to the menu and would read as a pass below.
    let name = SongName::truncated(song);
    let listed = store
        .list_scripts(DeviceConfig::default().max_song_entries)
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    if !listed.contains(&name) {
        anyhow::bail!("no such song in {}: {}", dir.display(), song);
    }

    let shadow = Rc::new(Cell::new(0u8));
    let keys = LightChaser::new(Rc::clone(&shadow), miss_at);
    let clock = if fast {
        SimClock::virtual_start()
    } else {
        SimClock::wall()
    };

    let mut device = Device::new(
        keys,
        ConsoleDisplay::new(),
        LedSink::new(shadow),
        ToneSink,
        store,
        clock,
        DeviceConfig::default(),
    );

    println!("playing {} from {}", name, dir.display());
    device.set_mode(Mode::SongPlay(name));
    device.step();

    match device.mode() {
        Mode::Menu => {
            println!("RESULT: PASS");
            Ok(())
        }
        _ => {
            println!("RESULT: FAIL");
            std::process::exit(1);
        }
    }
}
