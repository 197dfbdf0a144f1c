use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use derive_more::From;
use thiserror::Error;
use tracing::info;
use typeline::{Configuration, Outcome, Session, Target};

use crate::Args;
use crate::config::{ConfigError, Overrides, Settings};
use crate::terminal::{self, TerminalGuard, TerminalInput};
use crate::{logging, report};

#[derive(Debug, From, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Session(typeline::Error),

    #[error("Failed to read text from {origin}: {error}")]
    #[from(skip)]
    ReadText { origin: String, error: io::Error },

    #[error("No terminal available for keyboard input: {0}")]
    #[from(skip)]
    Terminal(io::Error),

    #[error("Failed to print the results: {0}")]
    #[from(skip)]
    Output(io::Error),
}

pub fn run(args: Args) -> Result<(), AppError> {
    let overrides = Overrides {
        tab_width: args.tab_width,
        wrap_width: args.wrap_width,
    };
    let settings = Settings::load(args.config, &overrides)?;
    let _log_guard = logging::init(&settings.log);
    info!(
        tab_width = settings.tab_width,
        wrap_width = settings.wrap_width,
        "starting"
    );

    let text = read_text(args.file.as_deref())?;
    let config = Configuration::default().with_tab_width(settings.tab_width);
    let wrap_width = match settings.wrap_width {
        0 => terminal::columns(),
        width => width,
    };

    // Nothing on screen changes before the text is known to be usable
    let target = Target::new(&text, wrap_width, &config)?;
    info!(
        bytes = target.len(),
        lines = target.line_count(),
        wrap_width,
        "target prepared"
    );

    let mut input = TerminalInput::open().map_err(AppError::Terminal)?;
    let guard = TerminalGuard::acquire().map_err(AppError::Terminal)?;

    let mut stdout = io::stdout().lock();
    let outcome = Session::new(target, &config, guard).run(&mut input, &mut stdout)?;

    match outcome {
        Outcome::Completed(report) => report::print_report(&mut stdout, &report),
        Outcome::Cancelled => report::print_cancelled(&mut stdout),
    }
    .map_err(AppError::Output)
}

/// Read the whole text, replacing invalid UTF-8 instead of failing
fn read_text(path: Option<&Path>) -> Result<String, AppError> {
    let mut bytes = Vec::new();
    let result = match path {
        Some(path) => File::open(path).and_then(|mut file| file.read_to_end(&mut bytes)),
        None => io::stdin().lock().read_to_end(&mut bytes),
    };

    result.map_err(|error| AppError::ReadText {
        origin: path.map_or_else(
            || "standard input".to_string(),
            |path| format!("'{}'", path.display()),
        ),
        error,
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
