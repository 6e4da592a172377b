use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "herald",
    about = concat!("herald v", env!("CARGO_PKG_VERSION"), " - your tasks, one line at a time"),
    version
)]
pub struct Cli {
    /// Path to the task storage file
    #[arg(long, default_value = "data/herald.txt")]
    pub data_file: PathBuf,

    /// Run a single command and exit, instead of the interactive loop
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// Print responses as JSON objects (for scripted and GUI callers)
    #[arg(long)]
    pub json: bool,
}
