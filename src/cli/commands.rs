use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paperchat", version, about = "Chat with research papers from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,

    /// Backend address, overriding the config file and environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enter the interactive chat REPL (default)
    Chat {
        /// Upload this PDF as soon as the REPL starts
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Upload and analyze a PDF, then print its backend id
    Upload {
        path: PathBuf,
    },

    /// Ask a single question about an already uploaded PDF
    Ask {
        /// The backend id returned by `upload`
        #[arg(short, long)]
        pdf_id: String,
        question: String,
    },

    /// Check that the backend is reachable
    Health,
}
