//! # Render Module - Minimal ANSI Redraws
//!
//! The target block is printed once, after which the cursor is parked at its
//! first column and saved. Every redraw restores that position, rewrites each
//! line after clearing only that line, and moves the cursor to where the next
//! character is expected. The screen is never cleared as a whole.
//!
//! Each grapheme cluster of the target gets one of four looks:
//!
//! | Mark                  | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `Pending`             | not typed yet (muted)                     |
//! | `Correct`             | typed as expected                         |
//! | `Incorrect`           | typed wrong                               |
//! | `IncorrectWhitespace` | typed wrong where whitespace was expected |
//!
//! Tabs are expanded to the configured width. A tab in the indentation of a
//! line is drawn as blanks, any other tab as an arrow followed by blanks.

use std::fmt;
use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveRight, MoveToColumn, MoveUp};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{Command, queue};

use crate::config::Configuration;
use crate::target::Target;
use crate::text::{cluster_width, clusters, indentation_len, is_whitespace};

const PENDING: Color = Color::AnsiValue(243);
const CORRECT: Color = Color::AnsiValue(15);
const INCORRECT: Color = Color::AnsiValue(9);
const INCORRECT_WHITESPACE: Color = Color::AnsiValue(1);

const TAB_ARROW: char = '→';

/// Save the cursor position (`ESC [ s`)
struct SaveCursor;

/// Restore the cursor position saved by [`SaveCursor`] (`ESC [ u`)
struct RestoreCursor;

impl Command for SaveCursor {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[s")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::other("saving the cursor requires ANSI support"))
    }
}

impl Command for RestoreCursor {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[u")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::other("restoring the cursor requires ANSI support"))
    }
}

/// How a single cluster of the target is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Pending,
    Correct,
    Incorrect,
    IncorrectWhitespace,
}

impl Mark {
    /// Compare the expected bytes of a cluster with what was typed at its position
    ///
    /// `typed` holds at most as many bytes as `expected`. A correct but
    /// unfinished prefix (like a base letter still waiting for its accent)
    /// stays pending.
    pub fn classify(expected: &[u8], typed: &[u8]) -> Self {
        if typed.is_empty() {
            Self::Pending
        } else if typed == expected {
            Self::Correct
        } else if typed.len() < expected.len() && expected.starts_with(typed) {
            Self::Pending
        } else if expected.iter().copied().all(is_whitespace) {
            Self::IncorrectWhitespace
        } else {
            Self::Incorrect
        }
    }
}

/// Draws the target against the user input
#[derive(Debug, Clone)]
pub struct Renderer {
    tab_width: usize,
}

impl Renderer {
    pub const fn new(config: &Configuration) -> Self {
        Self {
            tab_width: config.tab_width,
        }
    }

    /// Print the untouched block and save its top-left corner
    ///
    /// Returns the expected input length, see [`Renderer::draw`].
    pub fn begin<W: Write>(&self, out: &mut W, target: &Target) -> io::Result<usize> {
        let expected = self.draw(out, target, &[])?;

        let rows_up = target.line_count().saturating_sub(1);
        if rows_up > 0 {
            queue!(out, MoveUp(cells(rows_up)))?;
        }
        queue!(out, Print('\r'), MoveToColumn(0), SaveCursor)?;

        out.flush()?;
        Ok(expected)
    }

    /// Draw every line of the target, starting at the current cursor position
    ///
    /// `input` must be normalized. The output only depends on the arguments
    /// and the configured tab width.
    ///
    /// Returns the total expected length of the input: all line lengths plus
    /// the newlines between them.
    pub fn draw<W: Write>(&self, out: &mut W, target: &Target, input: &[u8]) -> io::Result<usize> {
        let offsets = target.offsets();
        let last_line = target.line_count().saturating_sub(1);

        for (index, line) in target.lines().enumerate() {
            let bytes = line.as_bytes();
            let offset = offsets.offset(index);
            let indentation = indentation_len(bytes);

            queue!(out, Print('\r'), Clear(ClearType::CurrentLine))?;

            for cluster in clusters(bytes) {
                let expected = &bytes[cluster.clone()];
                let start = (offset + cluster.start).min(input.len());
                let end = (offset + cluster.end).min(input.len());

                let mark = Mark::classify(expected, &input[start..end]);
                let leading = cluster.end <= indentation;
                self.print_cluster(out, &line[cluster], mark, leading)?;
            }

            if index < last_line {
                queue!(out, Print('\n'))?;
            }
        }

        out.flush()?;

        let last_len = target.line(last_line).map_or(0, str::len);
        Ok(offsets.offset(last_line) + last_len)
    }

    /// Redraw the block and put the cursor where the next character goes
    pub fn redraw<W: Write>(
        &self,
        out: &mut W,
        target: &Target,
        input: &[u8],
    ) -> io::Result<usize> {
        queue!(out, RestoreCursor)?;
        let expected = self.draw(out, target, input)?;
        queue!(out, RestoreCursor)?;
        self.move_cursor(out, target, input.len())?;
        Ok(expected)
    }

    /// Move the cursor below the block, so that following output does not overwrite it
    pub fn leave<W: Write>(&self, out: &mut W, target: &Target) -> io::Result<()> {
        queue!(out, RestoreCursor)?;

        let rows_down = target.line_count().saturating_sub(1);
        if rows_down > 0 {
            queue!(out, MoveDown(cells(rows_down)))?;
        }
        queue!(out, Print("\r\n"))?;

        out.flush()
    }

    /// Line and display column of the cursor after `input_len` bytes of input
    pub fn cursor_position(&self, target: &Target, input_len: usize) -> (usize, usize) {
        let pos = input_len.min(target.len());
        let line = target.offsets().line_of(pos);
        let text = target.line(line).unwrap_or_default().as_bytes();
        let column_bytes = (pos - target.offsets().offset(line)).min(text.len());

        let column = clusters(text)
            .take_while(|cluster| cluster.end <= column_bytes)
            .map(|cluster| cluster_width(text, &cluster, self.tab_width))
            .sum();

        (line, column)
    }

    /// Move from the saved position to the cursor position
    fn move_cursor<W: Write>(&self, out: &mut W, target: &Target, input_len: usize) -> io::Result<()> {
        let (line, column) = self.cursor_position(target, input_len);

        if line > 0 {
            queue!(out, MoveDown(cells(line)))?;
        }
        if column > 0 {
            queue!(out, MoveRight(cells(column)))?;
        }

        out.flush()
    }

    fn print_cluster<W: Write>(
        &self,
        out: &mut W,
        cluster: &str,
        mark: Mark,
        leading: bool,
    ) -> io::Result<()> {
        match mark {
            Mark::Pending => queue!(out, SetForegroundColor(PENDING))?,
            Mark::Correct => queue!(out, SetForegroundColor(CORRECT))?,
            Mark::Incorrect => queue!(out, SetForegroundColor(INCORRECT))?,
            Mark::IncorrectWhitespace => queue!(out, SetBackgroundColor(INCORRECT_WHITESPACE))?,
        }

        if cluster == "\t" {
            queue!(out, Print(self.tab(leading)))?;
        } else {
            queue!(out, Print(cluster))?;
        }

        queue!(out, ResetColor)
    }

    fn tab(&self, leading: bool) -> String {
        if leading || self.tab_width == 0 {
            " ".repeat(self.tab_width)
        } else {
            format!("{TAB_ARROW}{}", " ".repeat(self.tab_width - 1))
        }
    }
}

/// Terminal motions are limited to `u16` cells
fn cells(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(text: &str) -> Target {
        Target::new(text, 0, &Configuration::default()).unwrap()
    }

    fn draw(target: &Target, input: &str) -> (String, usize) {
        let renderer = Renderer::new(&Configuration::default());
        let mut out = Vec::new();
        let expected = renderer.draw(&mut out, target, input.as_bytes()).unwrap();
        (String::from_utf8(out).unwrap(), expected)
    }

    #[test]
    fn test_classify() {
        assert_eq!(Mark::classify(b"a", b""), Mark::Pending);
        assert_eq!(Mark::classify(b"a", b"a"), Mark::Correct);
        assert_eq!(Mark::classify(b"a", b"b"), Mark::Incorrect);
        assert_eq!(Mark::classify(b" ", b"b"), Mark::IncorrectWhitespace);
        assert_eq!(Mark::classify(b"\n", b" "), Mark::IncorrectWhitespace);

        let accented = "e\u{301}".as_bytes();
        assert_eq!(Mark::classify(accented, b"e"), Mark::Pending);
        assert_eq!(Mark::classify(accented, b"x"), Mark::Incorrect);
        assert_eq!(Mark::classify(accented, accented), Mark::Correct);
    }

    #[test]
    fn test_draw_colors_each_character() {
        let (output, expected) = draw(&target("ab"), "a");
        assert_eq!(expected, 2);
        assert_eq!(
            output,
            "\r\x1b[2K\x1b[38;5;15ma\x1b[0m\x1b[38;5;243mb\x1b[0m"
        );

        let (output, _) = draw(&target("ab"), "xb");
        assert!(output.starts_with("\r\x1b[2K\x1b[38;5;9ma\x1b[0m"));
    }

    #[test]
    fn test_draw_highlights_missed_whitespace() {
        let (output, _) = draw(&target("a b"), "axb");
        assert!(output.contains("\x1b[48;5;1m \x1b[0m"));
    }

    #[test]
    fn test_draw_clears_and_separates_lines() {
        let (output, expected) = draw(&target("ab\ncd"), "");
        assert_eq!(expected, 5);
        assert_eq!(output.matches("\r\x1b[2K").count(), 2);
        assert_eq!(output.matches('\n').count(), 1);
        assert!(!output.contains("\x1b[2J"));
    }

    #[test]
    fn test_draw_expands_tabs() {
        let (output, _) = draw(&target("x\n\ty\tz"), "");
        assert!(output.contains("\x1b[38;5;243m    \x1b[0m"));
        assert!(output.contains("\x1b[38;5;243m→   \x1b[0m"));
        assert!(!output.contains('\t'));
    }

    #[test]
    fn test_draw_is_pure() {
        let target = target("caf\u{e9} \u{1F44D}\u{1F3FD}\n\tnext line");
        let input = crate::text::normalize("caf\u{e9} x");

        let first = draw(&target, &input);
        let second = draw(&target, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_draw_keeps_clusters_together() {
        let target = target("\u{e9}");
        let (output, _) = draw(&target, "");
        assert_eq!(output, "\r\x1b[2K\x1b[38;5;243me\u{301}\x1b[0m");
    }

    #[test]
    fn test_cursor_position() {
        let renderer = Renderer::new(&Configuration::default());
        let target = target("ab\n\tcd\n\u{1F600}x");

        assert_eq!(renderer.cursor_position(&target, 0), (0, 0));
        assert_eq!(renderer.cursor_position(&target, 2), (0, 2));
        assert_eq!(renderer.cursor_position(&target, 3), (1, 0));
        assert_eq!(renderer.cursor_position(&target, 4), (1, 4));
        assert_eq!(renderer.cursor_position(&target, 5), (1, 5));
        assert_eq!(renderer.cursor_position(&target, 11), (2, 2));
        assert_eq!(renderer.cursor_position(&target, 9), (2, 0)); // Inside the emoji
        assert_eq!(renderer.cursor_position(&target, 100), (2, 3));
    }

    #[test]
    fn test_begin_parks_cursor_at_top() {
        let renderer = Renderer::new(&Configuration::default());
        let mut out = Vec::new();
        let expected = renderer.begin(&mut out, &target("one\ntwo\nthree")).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(expected, 13);
        assert!(output.ends_with("\x1b[2A\r\x1b[1G\x1b[s"));
    }

    #[test]
    fn test_redraw_moves_cursor_from_saved_position() {
        let renderer = Renderer::new(&Configuration::default());
        let target = target("ab\ncd");
        let mut out = Vec::new();
        renderer.redraw(&mut out, &target, b"ab\nc").unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.starts_with("\x1b[u\r\x1b[2K"));
        assert!(output.ends_with("\x1b[u\x1b[1B\x1b[1C"));
    }
}
