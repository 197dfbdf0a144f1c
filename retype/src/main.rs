//! Retype any text in your terminal.
//!
//! The text comes from a file or standard input, keystrokes come from the
//! terminal. When the last character is typed, the time, speed, accuracy and
//! misspelled words are printed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod app;
mod config;
mod logging;
mod report;
mod terminal;

#[derive(Debug, Parser)]
#[command(name = "retype", version, about)]
pub struct Args {
    /// File containing the text to type. Standard input is read if omitted
    pub file: Option<PathBuf>,

    /// Wrap the text to this many columns (0 wraps to the terminal width)
    #[arg(short, long = "wrap")]
    pub wrap_width: Option<usize>,

    /// Number of columns a tab is displayed as
    #[arg(short, long)]
    pub tab_width: Option<usize>,

    /// Directory containing `settings.toml`
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
