//! Command-line interface for the `betweenlines` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "betweenlines")]
#[command(about = "Send letters and keep track of the ones you sent from this device")]
#[command(version)]
pub struct Cli {
    /// Letter server base URL.
    #[arg(
        long,
        env = "BETWEENLINES_SERVER",
        default_value = "http://localhost:8080",
        global = true
    )]
    pub server: String,

    /// Local database holding the letter history. Defaults to the platform data directory.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a letter and get a shareable link for it. The link is also kept in local history.
    Send {
        /// Letter text.
        #[arg(short, long)]
        body: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Recipient's name.
        #[arg(long)]
        to: Option<String>,

        /// Envelope theme tag (default: envelope-red).
        #[arg(long)]
        envelope: Option<String>,

        /// Letter paper theme tag (default: letter-sticky).
        #[arg(long)]
        theme: Option<String>,

        /// Link to a background track.
        #[arg(long)]
        music: Option<String>,

        /// Audio clip to attach.
        #[arg(long, value_name = "FILE")]
        audio: Option<PathBuf>,
    },

    /// Read a letter by id or by its shareable link.
    Read {
        #[arg(value_name = "ID_OR_LINK")]
        letter: String,

        /// Flag the letter as opened, as the recipient's view does.
        #[arg(long)]
        mark_opened: bool,
    },

    /// Letters sent from this device during the last 7 days.
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List entries, newest first (default).
    List,
    /// Forget one entry.
    Delete { id: String },
    /// Forget every entry.
    Clear,
    /// Print the number of entries.
    Count,
}
