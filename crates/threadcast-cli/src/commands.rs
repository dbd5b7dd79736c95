//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Assemble a thread from a post URL and print it as JSON
    Fetch {
        /// Post URL containing `/status/<id>`
        url: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Assemble pasted text (one segment per line) and print it as JSON
    Text {
        /// Read from this file instead of stdin
        file: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List the voices the synthesizer reports
    Voices {
        /// Synthesizer program
        #[arg(long, default_value = "espeak-ng")]
        program: String,
    },

    /// Narrate a thread with interactive transport controls
    Narrate {
        /// Post URL to fetch
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        url: Option<String>,
        /// Text file to narrate, one segment per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Speaking rate multiplier
        #[arg(long, default_value_t = 1.0)]
        rate: f32,
        /// Voice id (see `threadcast voices`)
        #[arg(long)]
        voice: Option<String>,
        /// Synthesizer program
        #[arg(long, default_value = "espeak-ng")]
        program: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8787)]
        port: u16,
        /// Allowed CORS origin (repeatable); all origins when omitted
        #[arg(long = "allow-origin")]
        allow_origin: Vec<String>,
    },
}
