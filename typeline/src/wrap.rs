//! # Wrap Module - Reflowing Text to a Display Width
//!
//! Paragraphs (separated by `\n`) are wrapped independently and the explicit
//! newlines between them are kept as they are. Inside a paragraph, words are
//! packed greedily using display widths from [`crate::text`].
//!
//! A word wider than the line is broken between grapheme clusters. A single
//! cluster wider than the line is put on a line of its own instead of being
//! dropped or cut.
//!
//! ```rust
//! use typeline::wrap::wrap;
//!
//! assert_eq!(wrap("alpha beta gamma", 10, 4), "alpha beta\ngamma");
//! ```

use crate::text::{cluster_width, clusters, is_whitespace_char, text_width};

/// Wrap `text` to `width` columns
///
/// A width of 0 returns the text unchanged.
pub fn wrap(text: &str, width: usize, tab_width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }

    text.split('\n')
        .map(|paragraph| wrap_paragraph(paragraph, width, tab_width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_paragraph(paragraph: &str, width: usize, tab_width: usize) -> String {
    let paragraph = paragraph.trim_end_matches(is_whitespace_char);

    // Paragraphs that fit are left alone, keeping their inner spacing intact
    if text_width(paragraph, tab_width) <= width {
        return paragraph.to_owned();
    }

    let body = paragraph.trim_start_matches(is_whitespace_char);
    let indentation = &paragraph[..paragraph.len() - body.len()];

    let mut packer = LinePacker::new(width, tab_width);
    packer.indent(indentation);
    for word in body.split(is_whitespace_char).filter(|word| !word.is_empty()) {
        packer.push_word(word);
    }

    packer.finish().join("\n")
}

/// Greedy line builder for a single paragraph
struct LinePacker {
    width: usize,
    tab_width: usize,
    lines: Vec<String>,
    line: String,
    line_width: usize,
    /// Whether `line` holds anything besides indentation
    has_words: bool,
}

impl LinePacker {
    const fn new(width: usize, tab_width: usize) -> Self {
        Self {
            width,
            tab_width,
            lines: Vec::new(),
            line: String::new(),
            line_width: 0,
            has_words: false,
        }
    }

    fn indent(&mut self, indentation: &str) {
        self.line.push_str(indentation);
        self.line_width = text_width(indentation, self.tab_width);
    }

    fn push_word(&mut self, word: &str) {
        let word_width = text_width(word, self.tab_width);

        if word_width > self.width {
            self.push_oversized(word);
            return;
        }

        let separator = usize::from(self.has_words);
        if self.line_width + separator + word_width > self.width {
            self.break_line();
        }

        if self.has_words {
            self.line.push(' ');
            self.line_width += 1;
        }

        self.line.push_str(word);
        self.line_width += word_width;
        self.has_words = true;
    }

    /// Break a word that can never fit between its clusters
    fn push_oversized(&mut self, word: &str) {
        if self.has_words {
            self.flush();
        }

        let bytes = word.as_bytes();
        for cluster in clusters(bytes) {
            let width = cluster_width(bytes, &cluster, self.tab_width);
            if self.line_width + width > self.width {
                self.break_line();
            }

            // Clusters of valid UTF-8 always end on a char boundary
            self.line.push_str(&word[cluster]);
            self.line_width += width;
            self.has_words = true;
        }
    }

    /// Start a new line, discarding indentation that leaves no room for words
    fn break_line(&mut self) {
        if self.has_words {
            self.flush();
        } else {
            self.line.clear();
            self.line_width = 0;
        }
    }

    fn flush(&mut self) {
        self.lines.push(std::mem::take(&mut self.line));
        self.line_width = 0;
        self.has_words = false;
    }

    fn finish(mut self) -> Vec<String> {
        if self.has_words {
            self.flush();
        }
        self.lines
    }
}
