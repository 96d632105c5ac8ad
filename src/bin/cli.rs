//! tabletdb CLI
//!
//! Command-line interface for building and inspecting tablet files.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabletdb::{write_tablet, Kv, Tablet, TabletOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// tabletdb CLI
#[derive(Parser, Debug)]
#[command(name = "tabletdb-cli")]
#[command(about = "Build and inspect immutable key-value tablets")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a tablet from a text file of `key value` lines
    Build {
        /// Input text file, one whitespace-separated pair per line
        #[arg(short, long)]
        input: PathBuf,

        /// Tablet file to create
        #[arg(short, long)]
        output: PathBuf,

        /// Target block size in bytes
        #[arg(short, long, default_value = "4096")]
        block_size: usize,
    },

    /// Print every entry in key order
    Dump {
        /// Tablet file
        tablet: PathBuf,
    },

    /// Look up a single key
    Get {
        /// Tablet file
        tablet: PathBuf,

        /// The key to look up
        key: String,
    },

    /// Print entries starting at a key
    Scan {
        /// Tablet file
        tablet: PathBuf,

        /// First key to include (defaults to the start of the tablet)
        #[arg(short, long, default_value = "")]
        from: String,

        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show trailer and index layout
    Stat {
        /// Tablet file
        tablet: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabletdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> tabletdb::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Build {
            input,
            output,
            block_size,
        } => {
            let options = TabletOptions::builder().block_size(block_size).build()?;

            // Sort and de-duplicate in memory; later lines win
            let text = fs::read_to_string(&input)?;
            let mut entries = BTreeMap::new();
            for line in text.lines() {
                let mut parts = line.split_whitespace();
                if let Some(key) = parts.next() {
                    let value = parts.collect::<Vec<_>>().join(" ");
                    entries.insert(key.to_string(), value);
                }
            }

            tracing::info!(
                input = %input.display(),
                entries = entries.len(),
                block_size,
                "building tablet"
            );

            let mut writer = BufWriter::new(File::create(&output)?);
            let summary = write_tablet(&mut writer, &entries, &options)?;
            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;

            tracing::info!(
                output = %output.display(),
                blocks = summary.block_count,
                bytes = summary.file_size,
                "tablet written"
            );
        }

        Commands::Dump { tablet } => {
            let tablet = Tablet::open_file(&tablet)?;
            for kv in tablet.iter() {
                print_kv(&mut out, &kv?)?;
            }
        }

        Commands::Get { tablet, key } => {
            let tablet = Tablet::open_file(&tablet)?;
            match tablet.find(key.as_bytes())? {
                Some(kv) => print_kv(&mut out, &kv)?,
                None => {
                    tracing::info!(key = %key, "key not found");
                    std::process::exit(2);
                }
            }
        }

        Commands::Scan {
            tablet,
            from,
            limit,
        } => {
            let tablet = Tablet::open_file(&tablet)?;
            let entries = tablet.scan_from(from.as_bytes())?;
            for kv in entries.take(limit.unwrap_or(usize::MAX)) {
                print_kv(&mut out, &kv?)?;
            }
        }

        Commands::Stat { tablet } => {
            let tablet = Tablet::open_file(&tablet)?;
            let trailer = tablet.trailer();
            writeln!(out, "file size:    {}", tablet.file_size())?;
            writeln!(out, "blocks:       {}", tablet.block_count())?;
            writeln!(out, "index offset: {}", trailer.index_offset)?;
            writeln!(out, "index length: {}", trailer.index_length)?;
            writeln!(out, "index crc32:  {:#010x}", trailer.index_crc)?;
            for (i, entry) in tablet.index().iter().enumerate() {
                writeln!(
                    out,
                    "  block {:>5}  offset {:>10}  length {:>8}  first key {}",
                    i,
                    entry.offset,
                    entry.length,
                    String::from_utf8_lossy(&entry.first_key)
                )?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn print_kv(out: &mut impl Write, kv: &Kv) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        String::from_utf8_lossy(&kv.key),
        String::from_utf8_lossy(&kv.value)
    )
}
