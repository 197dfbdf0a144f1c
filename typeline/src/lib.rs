//! # Typeline
//!
//! A library for terminal typing trainers that work on arbitrary Unicode text.
//!
//! The engine is split into small, leaf-first modules:
//!
//! - [`text`]: canonical decomposition, grapheme clusters and display widths
//! - [`wrap`]: greedy word-wrapping that never splits a cluster
//! - [`target`]: the prepared, immutable target block and its line offsets
//! - [`render`]: minimal ANSI redraws of the target against the user input
//! - [`input`]: the keystroke state machine
//! - [`metrics`]: words-per-minute, accuracy and misspelled words
//! - [`session`]: ties the above together around a blocking byte source
//!
//! ```rust
//! use typeline::{Configuration, Outcome, Session, Target};
//!
//! let config = Configuration::default();
//! let target = Target::new("cat dog", 0, &config).unwrap();
//! let session = Session::new(target, &config, ());
//!
//! let mut keys: &[u8] = b"cat dog";
//! let mut screen = Vec::new();
//!
//! match session.run(&mut keys, &mut screen).unwrap() {
//!     Outcome::Completed(report) => assert!(report.is_perfect()),
//!     Outcome::Cancelled => unreachable!(),
//! }
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod render;
pub mod session;
pub mod target;
pub mod text;
pub mod wrap;

pub use config::Configuration;
pub use error::Error;
pub use input::{InputHandler, InputState, Keystroke};
pub use metrics::{Accuracy, Cpm, Elapsed, Report, Wpm};
pub use render::Renderer;
pub use session::{ByteSource, Outcome, Session, TerminalMode};
pub use target::{LineOffsetTable, Target};

const AVERAGE_WORD_LENGTH: usize = 5;

// Types for more general type-safety
type Timestamp = f64;
type Minutes = f64;
type Float = f64;

// Get the minutes elapsed from a timestamp
pub(crate) fn minutes(timestamp: Timestamp) -> Minutes {
    timestamp / 60.0
}
