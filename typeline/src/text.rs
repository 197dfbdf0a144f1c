//! # Text Module - Normalization, Clusters and Display Width
//!
//! Everything the engine knows about Unicode lives here. Text is handled as
//! UTF-8 bytes so that target and user input can be compared position for
//! position, which only works once both sides went through [`normalize`].
//!
//! Decoding is lenient: a malformed or truncated sequence is treated as a
//! single one-byte character and never causes an error.
//!
//! ```text
//! "e\u{301}👍🏽x"
//!  [e ◌́ ][👍 🏽][x]   <- three grapheme clusters
//!   1      2     1    <- display width
//! ```

use std::iter::FusedIterator;
use std::ops::{Range, RangeInclusive};

use unicode_normalization::UnicodeNormalization;
use unicode_width::UnicodeWidthChar;

const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Code points that attach to the preceding character
const CLUSTER_EXTENDERS: [RangeInclusive<u32>; 9] = [
    // Combining marks
    0x0300..=0x036F,
    0x1AB0..=0x1AFF,
    0x1DC0..=0x1DFF,
    0x20D0..=0x20FF,
    0xFE20..=0xFE2F,
    // Variation selectors
    0xFE00..=0xFE0F,
    // Emoji skin tone modifiers
    0x1F3FB..=0x1F3FF,
    // Conjoining Hangul vowels and trailing consonants (decomposed syllables)
    0x1160..=0x11FF,
    0xD7B0..=0xD7FF,
];

/// Everything from here on is treated as a double-width symbol or emoji
const WIDE_SYMBOLS_START: u32 = 0x1F300;

/// Letters that pair up into flags, like 🇩🇪
const REGIONAL_INDICATORS: RangeInclusive<u32> = 0x1F1E6..=0x1F1FF;

/// Apply canonical decomposition (NFD)
pub fn normalize(text: &str) -> String {
    text.nfd().collect()
}

/// Apply canonical decomposition to raw bytes
///
/// Valid UTF-8 runs are decomposed, malformed bytes are passed through as-is.
/// A trailing incomplete sequence therefore survives untouched until the rest
/// of its bytes arrive.
pub fn normalize_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut normalized = Vec::with_capacity(bytes.len());
    let mut encoded = [0; 4];

    for chunk in bytes.utf8_chunks() {
        for char in chunk.valid().nfd() {
            normalized.extend_from_slice(char.encode_utf8(&mut encoded).as_bytes());
        }
        normalized.extend_from_slice(chunk.invalid());
    }

    normalized
}

/// Whitespace as classified by the C locale: space, `\t`, `\n`, `\v`, `\f` and `\r`
pub const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// [`is_whitespace`] for chars, anything outside ASCII is not whitespace
pub fn is_whitespace_char(char: char) -> bool {
    u8::try_from(char).is_ok_and(is_whitespace)
}

const fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Length of the sequence announced by a leading byte (1 for anything malformed)
const fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}

/// Decode the code point starting at `pos`
///
/// Returns `None` when `pos` is out of bounds or the bytes are malformed.
pub fn code_point_at(text: &[u8], pos: usize) -> Option<char> {
    let lead = *text.get(pos)?;
    let bytes = text.get(pos..pos + sequence_len(lead))?;
    std::str::from_utf8(bytes).ok()?.chars().next()
}

/// Offset just past the code point starting at `pos`
///
/// Malformed bytes advance by one.
pub fn next_char_pos(text: &[u8], pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }

    match code_point_at(text, pos) {
        Some(char) => pos + char.len_utf8(),
        None => pos + 1,
    }
}

/// Offset of the code point ending at `pos`
///
/// Steps back a single code point, not a whole cluster.
pub fn prev_char_pos(text: &[u8], pos: usize) -> usize {
    let pos = pos.min(text.len());
    if pos == 0 {
        return 0;
    }

    let floor = pos.saturating_sub(4);
    let mut start = pos - 1;
    while start > floor && is_continuation(text[start]) {
        start -= 1;
    }

    if next_char_pos(text, start) == pos {
        start
    } else {
        pos - 1
    }
}

fn is_regional_indicator(char: char) -> bool {
    REGIONAL_INDICATORS.contains(&u32::from(char))
}

fn extends_cluster(char: char) -> bool {
    let code = u32::from(char);
    CLUSTER_EXTENDERS.iter().any(|range| range.contains(&code))
}

/// Offset just past the grapheme cluster starting at `pos`
///
/// A cluster is the leading code point plus any following combining marks,
/// variation selectors or emoji modifiers. A zero-width joiner pulls the next
/// code point into the cluster as well, so joined emoji sequences advance as
/// one unit. Two regional indicators form a single flag.
pub fn grapheme_cluster_end(text: &[u8], pos: usize) -> usize {
    let mut end = next_char_pos(text, pos);

    if code_point_at(text, pos).is_some_and(is_regional_indicator)
        && code_point_at(text, end).is_some_and(is_regional_indicator)
    {
        end = next_char_pos(text, end);
    }

    // `end` grows on every iteration, so this is bounded by the text length
    while end < text.len() {
        match code_point_at(text, end) {
            Some(ZERO_WIDTH_JOINER) => {
                end = next_char_pos(text, end);
                end = next_char_pos(text, end);
            }
            Some(char) if extends_cluster(char) => end = next_char_pos(text, end),
            _ => break,
        }
    }

    end
}

/// Display width of the code point starting at `pos`
///
/// - continuation bytes are 0 columns wide
/// - a tab is `tab_width` columns
/// - symbols and emoji from U+1F300 upwards are 2 columns, as are regional
///   indicators, which are drawn as flags
/// - everything else follows the Unicode width tables, with 1 for unknowns
pub fn char_width(text: &[u8], pos: usize, tab_width: usize) -> usize {
    let Some(&byte) = text.get(pos) else {
        return 0;
    };

    if is_continuation(byte) {
        return 0;
    }

    if byte == b'\t' {
        return tab_width;
    }

    match code_point_at(text, pos) {
        Some(char) if u32::from(char) >= WIDE_SYMBOLS_START || is_regional_indicator(char) => 2,
        Some(char) => char.width().unwrap_or(1),
        None => 1,
    }
}

/// Display width of a whole cluster, which is the width of its leading code point
pub fn cluster_width(text: &[u8], cluster: &Range<usize>, tab_width: usize) -> usize {
    char_width(text, cluster.start, tab_width)
}

/// Display width of a piece of text
pub fn text_width(text: &str, tab_width: usize) -> usize {
    let bytes = text.as_bytes();
    clusters(bytes)
        .map(|cluster| cluster_width(bytes, &cluster, tab_width))
        .sum()
}

/// Byte length of the leading run of spaces and tabs
pub fn indentation_len(text: &[u8]) -> usize {
    text.iter()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count()
}

/// Returns true if `bytes` stops in the middle of a multi-byte sequence
///
/// The remaining bytes of a key usually arrive in the very next reads.
pub fn ends_mid_char(bytes: &[u8]) -> bool {
    let floor = bytes.len().saturating_sub(4);
    let Some(start) = (floor..bytes.len())
        .rev()
        .find(|&index| !is_continuation(bytes[index]))
    else {
        return false;
    };

    std::str::from_utf8(&bytes[start..]).is_err_and(|error| error.error_len().is_none())
}

/// Iterate over the byte ranges of the grapheme clusters in a text
pub const fn clusters(text: &[u8]) -> Clusters<'_> {
    Clusters { text, pos: 0 }
}

/// Iterator over grapheme clusters, see [`clusters`]
pub struct Clusters<'a> {
    text: &'a [u8],
    pos: usize,
}

impl Iterator for Clusters<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        self.pos = grapheme_cluster_end(self.text, start);
        Some(start..self.pos)
    }
}

impl FusedIterator for Clusters<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_strings(text: &str) -> Vec<&str> {
        clusters(text.as_bytes()).map(|range| &text[range]).collect()
    }

    #[test]
    fn test_normalize_decomposes_and_is_idempotent() {
        let composed = "caf\u{e9}";
        let decomposed = "cafe\u{301}";

        assert_eq!(normalize(composed), decomposed);
        assert_eq!(normalize(decomposed), decomposed);
        assert_eq!(normalize(&normalize(composed)), normalize(composed));

        let mixed = "\u{1e69} \u{212b} \u{d55c}\u{ae00}";
        assert_eq!(normalize(&normalize(mixed)), normalize(mixed));
    }

    #[test]
    fn test_normalize_bytes_keeps_malformed_bytes() {
        let mut bytes = "\u{e9}".as_bytes().to_vec();
        bytes.push(0xFF);
        bytes.push(0xC3); // Start of a second é

        let normalized = normalize_bytes(&bytes);
        assert_eq!(&normalized[..3], "e\u{301}".as_bytes());
        assert_eq!(&normalized[3..], &[0xFF, 0xC3]);
        assert_eq!(normalize_bytes(&normalized), normalized);
    }

    #[test]
    fn test_char_navigation() {
        let text = "a\u{e9}\u{1F600}".as_bytes(); // 1 + 2 + 4 bytes
        assert_eq!(next_char_pos(text, 0), 1);
        assert_eq!(next_char_pos(text, 1), 3);
        assert_eq!(next_char_pos(text, 3), 7);
        assert_eq!(next_char_pos(text, 7), 7);

        assert_eq!(prev_char_pos(text, 7), 3);
        assert_eq!(prev_char_pos(text, 3), 1);
        assert_eq!(prev_char_pos(text, 1), 0);
        assert_eq!(prev_char_pos(text, 0), 0);
    }

    #[test]
    fn test_char_navigation_is_lenient() {
        let text = [b'a', 0xE2, 0x82, b'b', 0xFF];
        assert_eq!(next_char_pos(&text, 1), 2); // Truncated sequence
        assert_eq!(next_char_pos(&text, 2), 3); // Stray continuation byte
        assert_eq!(next_char_pos(&text, 4), 5);
        assert_eq!(prev_char_pos(&text, 5), 4);
        assert_eq!(prev_char_pos(&text, 3), 2);
    }

    #[test]
    fn test_combining_marks_stay_with_their_base() {
        let text = normalize("\u{e9}t\u{e9}");
        assert_eq!(cluster_strings(&text), ["e\u{301}", "t", "e\u{301}"]);

        let stacked = "a\u{301}\u{1DC0}\u{20D7}b";
        assert_eq!(cluster_strings(stacked), ["a\u{301}\u{1DC0}\u{20D7}", "b"]);
    }

    #[test]
    fn test_emoji_sequences_are_one_cluster() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let thumbs = "\u{1F44D}\u{1F3FD}";
        let heart = "\u{2764}\u{FE0F}";
        let text = format!("{family}{thumbs}{heart}\u{1F600}\u{1F600}");

        assert_eq!(
            cluster_strings(&text),
            [family, thumbs, heart, "\u{1F600}", "\u{1F600}"]
        );
    }

    #[test]
    fn test_cluster_end_never_splits_a_code_point() {
        let text = "x\u{1F469}\u{200D}\u{1F4BB}e\u{301}\u{d55c} \u{1F1E9}\u{1F1EA}";
        let normalized = normalize(text);
        let bytes = normalized.as_bytes();

        let mut pos = 0;
        while pos < bytes.len() {
            let end = grapheme_cluster_end(bytes, pos);
            assert!(end > pos);
            assert!(normalized.is_char_boundary(end));
            pos = end;
        }
    }

    #[test]
    fn test_clusters_agree_with_extended_graphemes() {
        use unicode_segmentation::UnicodeSegmentation;

        let text = normalize(
            "na\u{ef}ve r\u{e9}sum\u{e9} \u{1F44B}\u{1F3FF} \u{d55c}\u{ae00} \
             \u{1F1E9}\u{1F1EA}\u{1F1EB}\u{1F1F7}!",
        );
        let expected: Vec<&str> = text.graphemes(true).collect();
        assert_eq!(cluster_strings(&text), expected);
    }

    #[test]
    fn test_flags_are_one_cluster() {
        let germany = "\u{1F1E9}\u{1F1EA}";
        let france = "\u{1F1EB}\u{1F1F7}";
        let text = format!("{germany}{france}\u{1F1EF}x");

        assert_eq!(cluster_strings(&text), [germany, france, "\u{1F1EF}", "x"]);
        assert_eq!(text_width(germany, 4), 2);
    }

    #[test]
    fn test_whitespace_classification_is_ascii_only() {
        assert!(is_whitespace_char(' '));
        assert!(is_whitespace_char('\t'));
        assert!(is_whitespace_char('\u{0B}'));
        assert!(!is_whitespace_char('\u{A0}'));
        assert!(!is_whitespace_char('\u{3000}'));
        assert!(!is_whitespace_char('x'));
    }

    #[test]
    fn test_char_width() {
        let text = "a\t\u{1F600}\u{4E2D}\u{301}".as_bytes();
        assert_eq!(char_width(text, 0, 4), 1);
        assert_eq!(char_width(text, 1, 4), 4);
        assert_eq!(char_width(text, 1, 8), 8);
        assert_eq!(char_width(text, 2, 4), 2);
        assert_eq!(char_width(text, 3, 4), 0); // Continuation byte
        assert_eq!(char_width(text, 6, 4), 2);
        assert_eq!(char_width(text, 9, 4), 0); // Combining mark
        assert_eq!(char_width(&[0xFF], 0, 4), 1);
        assert_eq!(char_width(text, 100, 4), 0);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("hello", 4), 5);
        assert_eq!(text_width(&normalize("caf\u{e9}"), 4), 4);
        assert_eq!(text_width("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}!", 4), 3);
        assert_eq!(text_width("\tx", 4), 5);
    }

    #[test]
    fn test_ends_mid_char() {
        assert!(!ends_mid_char(b""));
        assert!(!ends_mid_char(b"abc"));
        assert!(ends_mid_char(&[b'a', 0xC3]));
        assert!(ends_mid_char(&[0xF0, 0x9F, 0x98]));
        assert!(!ends_mid_char(&[0xF0, 0x9F, 0x98, 0x80]));
        assert!(!ends_mid_char(&[b'a', 0xFF]));
    }

    #[test]
    fn test_indentation_len() {
        assert_eq!(indentation_len(b"\t  x y"), 3);
        assert_eq!(indentation_len(b"x  "), 0);
        assert_eq!(indentation_len(b"   "), 3);
    }
}
