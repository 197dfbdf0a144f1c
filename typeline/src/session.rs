//! # Session Module - A Complete Typing Session
//!
//! A [`Session`] owns the prepared target, the input state machine and the
//! handle to the terminal mode. It reads one byte at a time from a blocking
//! [`ByteSource`] and writes ANSI output to any [`Write`]r.
//!
#![doc = simple_mermaid::mermaid!("../diagrams/session_flow.mmd")]
//!
//! The terminal mode is restored on every way out of [`Session::run`]:
//! completion, cancellation and errors alike.
//!
//! ```rust
//! use typeline::{Configuration, Outcome, Session, Target};
//!
//! let config = Configuration::default();
//! let target = Target::new("cat dog", 0, &config).unwrap();
//!
//! let mut keys: &[u8] = b"cat dig";
//! let outcome = Session::new(target, &config, ())
//!     .run(&mut keys, &mut std::io::sink())
//!     .unwrap();
//!
//! if let Outcome::Completed(report) = outcome {
//!     assert!(report.misspelled.contains("dog"));
//! }
//! ```

use std::io::{self, Read, Write};

use tracing::{info, warn};

use crate::config::Configuration;
use crate::error::Error;
use crate::input::InputHandler;
use crate::metrics::Report;
use crate::render::Renderer;
use crate::target::Target;

/// Consecutive read failures tolerated before the session gives up
///
/// Failed reads are retried; a source that fails this often in a row is
/// treated as gone and ends the session with [`Error::Read`]. Any successful
/// read resets the count.
const MAX_READ_FAILURES: usize = 64;

/// A blocking source of single bytes, usually the terminal
pub trait ByteSource {
    /// Block until the next byte arrives
    ///
    /// Returns `Ok(None)` once the source is closed for good.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<R: Read> ByteSource for R {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

/// A terminal mode that has to be restored when the session ends
pub trait TerminalMode {
    /// Restore the previous terminal settings
    ///
    /// Must be safe to call more than once.
    fn restore(&mut self) -> io::Result<()>;
}

/// No terminal mode to restore, e.g. when not attached to a terminal
impl TerminalMode for () {
    fn restore(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Report),
    Cancelled,
}

/// A single typing session
#[derive(Debug)]
pub struct Session<T: TerminalMode> {
    target: Target,
    renderer: Renderer,
    input: InputHandler,
    terminal: T,
}

impl<T: TerminalMode> Session<T> {
    /// Create a session for an already prepared target
    ///
    /// `terminal` is restored when the session ends.
    pub fn new(target: Target, config: &Configuration, terminal: T) -> Self {
        Self {
            target,
            renderer: Renderer::new(config),
            input: InputHandler::new(),
            terminal,
        }
    }

    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Run the session until it is completed or cancelled
    ///
    /// The cursor is left on a fresh line below the target and the terminal
    /// mode is restored before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Fails if the output can't be written or the source keeps failing.
    pub fn run<S: ByteSource, W: Write>(
        mut self,
        source: &mut S,
        out: &mut W,
    ) -> Result<Outcome, Error> {
        let outcome = self.type_out(source, out);
        let left = self.renderer.leave(out, &self.target);
        let restored = self.terminal.restore();

        let outcome = outcome?;
        left?;
        restored?;

        match &outcome {
            Outcome::Completed(report) => info!(
                elapsed = %report.elapsed,
                wpm = %report.wpm,
                accuracy = %report.accuracy,
                misspelled = report.misspelled.len(),
                "session completed"
            ),
            Outcome::Cancelled => info!(input_len = self.input.normalized().len(), "session cancelled"),
        }

        Ok(outcome)
    }

    fn type_out<S: ByteSource, W: Write>(
        &mut self,
        source: &mut S,
        out: &mut W,
    ) -> Result<Outcome, Error> {
        self.renderer.begin(out, &self.target)?;
        let mut failures = 0;

        loop {
            let byte = match source.read_byte() {
                Ok(Some(byte)) => {
                    failures = 0;
                    byte
                }
                Ok(None) => {
                    info!("input closed");
                    return Ok(Outcome::Cancelled);
                }
                Err(error) => {
                    failures += 1;
                    if failures >= MAX_READ_FAILURES {
                        return Err(Error::Read {
                            attempts: failures,
                            source: error,
                        });
                    }
                    warn!(%error, failures, "read failed, retrying");
                    continue;
                }
            };

            if self.input.process(byte, &self.target).is_cancelled() {
                return Ok(Outcome::Cancelled);
            }

            // The rest of the key is still on its way
            if self.input.is_mid_char() {
                continue;
            }

            let expected = self
                .renderer
                .redraw(out, &self.target, self.input.normalized())?;

            if self.input.check_completion(expected) {
                return Ok(Outcome::Completed(Report::calculate(
                    self.input.elapsed(),
                    self.target.as_bytes(),
                    self.input.normalized(),
                )));
            }
        }
    }
}
