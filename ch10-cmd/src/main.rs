mod dump;
mod progress;
mod stat;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ch10::Criteria;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Packet selection options shared by all commands. The first packet of a recording
// (normally TMATS) is always included.
#[derive(Args, Debug)]
struct Selection {
    /// Specify channels to include (csv).
    ///
    /// Channel ids are matched as written, e.g., 05 does not match channel 5.
    #[arg(short, long, value_name = "csv", value_delimiter = ',')]
    channel: Vec<String>,

    /// Specify channels to ignore (csv).
    ///
    /// Exclusion is applied after --channel.
    #[arg(short, long, value_name = "csv", value_delimiter = ',')]
    exclude: Vec<String>,

    /// The types of data to include (csv, may be decimal or hex, e.g., 0x40).
    #[arg(short = 't', long = "type", value_name = "csv", value_delimiter = ',')]
    types: Vec<String>,
}

impl Selection {
    fn criteria(&self) -> Result<Criteria> {
        let criteria =
            Criteria::new(&self.types, &self.channel, &self.exclude).context("invalid --type")?;
        debug!(
            channels = ?self.channel,
            exclude = ?self.exclude,
            types = ?self.types,
            "packet selection"
        );
        Ok(criteria)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Demultiplex a Chapter 10 file into one file per channel.
    ///
    /// Files are named by channel id. TMATS is written to <id>.tmats (or <id>.xml for
    /// XML TMATS) and only the first TMATS packet is written. Video is written to
    /// <id>.mpg as the concatenated transport stream.
    Dump {
        /// The directory to place files.
        #[arg(short, long, default_value = ".", value_name = "path")]
        output: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Overwrite existing files.
        #[arg(short, long, action)]
        force: bool,

        /// Input Chapter 10 file.
        input: PathBuf,
    },
    /// Display information about the channels within Chapter 10 files.
    Stat {
        #[command(flatten)]
        selection: Selection,

        /// Output format
        #[arg(long, default_value = "text")]
        format: stat::Format,

        /// Input Chapter 10 files or directories to search for .c10/.ch10 files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("CH10_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Dump {
            output,
            selection,
            force,
            input,
        } => {
            let criteria = selection.criteria()?;
            dump::dump(input, output, criteria, *force)
        }
        Commands::Stat {
            selection,
            format,
            inputs,
        } => {
            let criteria = selection.criteria()?;
            stat::stat(inputs, &criteria, format)
        }
    }
}
