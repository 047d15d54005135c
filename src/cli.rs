// Command-line interface definitions for clacker
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clacker")]
#[command(author, version, about = "A typewriter in your terminal")]
#[command(long_about = "
Clacker is a typewriter in your terminal.
Keys strike with a clack, a bell rings near the margin, and at the margin
the carriage jams: further keys overstrike the last character until you
press Enter.

KEYS:
  Enter                 Carriage return
  Backspace             Back up one character
  Ctrl+Enter / Ctrl+J   Let the ghostwriter continue the text (also F2)
  Esc                   Stop the ghostwriter
  Ctrl+N                Fresh sheet of paper
  Ctrl+Q / Ctrl+C       Quit (the paper is saved)

GHOSTWRITER:
  Set completion.api_key (or CLACKER_API_KEY) for an OpenAI-compatible
  endpoint, or completion.backend = \"command\" to pipe the paper through a
  local program. Without either, the ghostwriter types stock sentences.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable typewriter sounds
    #[arg(long)]
    pub mute: bool,

    /// Override the line width in characters
    #[arg(long, value_name = "CHARS")]
    pub width: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Type on the current paper (default if no command specified)
    Type {
        /// Open this paper instead of the last one used
        #[arg(long, value_name = "ID")]
        paper: Option<String>,
    },

    /// Start a fresh paper and type on it
    New {
        /// Paper texture: cream, white, lined or grid
        #[arg(long, value_name = "TEXTURE")]
        texture: Option<String>,
    },

    /// List saved papers
    List,

    /// Print a saved paper
    Show {
        /// Paper id (see `clacker list`)
        id: String,
    },

    /// Delete a saved paper
    Delete {
        /// Paper id (see `clacker list`)
        id: String,
    },

    /// Change the texture of a saved paper
    Texture {
        /// Paper id (see `clacker list`)
        id: String,

        /// cream, white, lined or grid
        texture: String,
    },

    /// Show current configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write: bool,
    },

    /// Auto-type text onto a blank sheet and print the result
    Play {
        /// Text to type
        text: String,

        /// Skip the per-character delay
        #[arg(long)]
        fast: bool,
    },
}
