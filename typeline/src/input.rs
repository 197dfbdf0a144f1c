//! # Input Module - The Keystroke State Machine
//!
//! Raw bytes from the terminal are turned into edits of the user input buffer,
//! one byte at a time.
//!
#![doc = simple_mermaid::mermaid!("../diagrams/input_states.mmd")]
//!
//! - `ESC` and `Ctrl-C` cancel the session
//! - `Backspace` (`0x7F` or `\b`) removes the last code point
//! - `Ctrl-W` removes trailing whitespace, then the word before it
//! - whitespace where the target expects a line break becomes `\n`, followed by
//!   the indentation of the next target line
//! - any other whitespace becomes a single space
//! - everything else, control bytes included, is appended as-is
//!
//! The raw buffer is re-normalized after every edit; all comparisons with the
//! target use the normalized form.

use strum::{Display, EnumIs};
use tracing::debug;
use web_time::{Duration, Instant};

use crate::target::Target;
use crate::text::{ends_mid_char, is_whitespace, normalize_bytes, prev_char_pos};

const ESCAPE: u8 = 0x1B;
const END_OF_TEXT: u8 = 0x03;
const DELETE: u8 = 0x7F;
const BACKSPACE: u8 = 0x08;
const END_OF_TRANSMISSION_BLOCK: u8 = 0x17;

/// Where a typing session currently is
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum InputState {
    /// Nothing has been typed yet, the timer is not running
    #[default]
    Idle,
    /// The timer is running and the buffer is being edited
    Typing,
    /// The whole target has been typed
    Complete,
    /// The user gave up
    Cancelled,
}

impl InputState {
    /// Returns true if no more input will be accepted
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

/// What a single byte of input means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Cancel,
    Backspace,
    DeleteWord,
    Insert(u8),
}

impl From<u8> for Keystroke {
    fn from(byte: u8) -> Self {
        match byte {
            ESCAPE | END_OF_TEXT => Self::Cancel,
            DELETE | BACKSPACE => Self::Backspace,
            END_OF_TRANSMISSION_BLOCK => Self::DeleteWord,
            byte => Self::Insert(byte),
        }
    }
}

/// Owns the user input and drives the session state
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    raw: Vec<u8>,
    normalized: Vec<u8>,
    state: InputState,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> InputState {
        self.state
    }

    /// The buffer exactly as typed
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The buffer after canonical decomposition
    pub fn normalized(&self) -> &[u8] {
        &self.normalized
    }

    /// Returns true while the last key has not been fully received yet
    pub fn is_mid_char(&self) -> bool {
        ends_mid_char(&self.raw)
    }

    /// Time since the first keystroke, up to completion or cancellation
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Consume one byte of input
    ///
    /// The first byte starts the timer. Once the session is finished, bytes are
    /// ignored.
    pub fn process(&mut self, byte: u8, target: &Target) -> InputState {
        if self.state.is_finished() {
            return self.state;
        }

        if self.state.is_idle() {
            self.started_at = Some(Instant::now());
            self.transition(InputState::Typing);
        }

        match Keystroke::from(byte) {
            Keystroke::Cancel => {
                self.finished_at = Some(Instant::now());
                self.transition(InputState::Cancelled);
                return self.state;
            }
            Keystroke::Backspace => self.delete_char(),
            Keystroke::DeleteWord => self.delete_word(),
            Keystroke::Insert(byte) => self.insert(byte, target),
        }

        self.normalized = normalize_bytes(&self.raw);
        self.state
    }

    /// Complete the session once the input is at least `expected_len` long
    pub fn check_completion(&mut self, expected_len: usize) -> bool {
        if self.state.is_typing() && self.normalized.len() >= expected_len {
            self.finished_at = Some(Instant::now());
            self.transition(InputState::Complete);
        }

        self.state.is_complete()
    }

    fn transition(&mut self, state: InputState) {
        debug!(from = %self.state, to = %state, input_len = self.normalized.len(), "input state");
        self.state = state;
    }

    fn pop_char(&mut self) {
        let start = prev_char_pos(&self.raw, self.raw.len());
        self.raw.truncate(start);
    }

    /// Returns true if the last character of the buffer satisfies `predicate`
    fn last_char_is(&self, predicate: impl Fn(u8) -> bool) -> bool {
        let start = prev_char_pos(&self.raw, self.raw.len());
        self.raw.get(start).copied().is_some_and(predicate)
    }

    fn delete_char(&mut self) {
        self.pop_char();
    }

    fn delete_word(&mut self) {
        while self.last_char_is(is_whitespace) {
            self.pop_char();
        }
        while self.last_char_is(|byte| !is_whitespace(byte)) {
            self.pop_char();
        }
    }

    fn insert(&mut self, byte: u8, target: &Target) {
        if !is_whitespace(byte) {
            self.raw.push(byte);
            return;
        }

        let position = self.normalized.len();
        if target.expects_newline_at(position) {
            self.raw.push(b'\n');
            if let Some(line) = target.line_starting_at(position + 1) {
                self.raw.extend_from_slice(target.indentation(line).as_bytes());
            }
        } else if byte == b'\t' && target.as_bytes().get(position) == Some(&b'\t') {
            self.raw.push(b'\t');
        } else {
            self.raw.push(b' ');
        }
    }
}
