//! # Metrics Module - The Final Report
//!
//! Once the session is complete, target and input are compared byte for byte
//! (both normalized) to produce:
//!
//! - the elapsed time as `m:ss`
//! - words per minute, using the usual 5 characters per word
//! - characters per minute
//! - accuracy, the share of positions typed correctly
//! - the misspelled words, in lexicographic order

use std::collections::BTreeSet;
use std::fmt;

use derive_more::Display;
use web_time::Duration;

use crate::text::is_whitespace;
use crate::{AVERAGE_WORD_LENGTH, Float, Minutes};

/// Words Per Minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{_0:.2}")]
pub struct Wpm(pub Float);

impl Wpm {
    /// Calculate Words Per Minute
    ///
    /// * `characters` - How many characters (bytes) the target holds
    /// * `minutes` - How many minutes have gone by
    ///
    /// Zero minutes yield zero WPM.
    pub fn calculate(characters: usize, minutes: Minutes) -> Self {
        if minutes <= 0.0 {
            return Self(0.0);
        }

        Self((characters as Float / AVERAGE_WORD_LENGTH as Float) / minutes)
    }
}

/// Characters Per Minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{_0:.2}")]
pub struct Cpm(pub Float);

impl Cpm {
    pub fn calculate(characters: usize, minutes: Minutes) -> Self {
        if minutes <= 0.0 {
            return Self(0.0);
        }

        Self(characters as Float / minutes)
    }
}

/// Typing accuracy
///
/// The percentage (0.0 - 100.0) of target positions where the input matches.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{percentage:.2}%")]
pub struct Accuracy {
    pub percentage: Float,
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Calculate typing accuracy
    ///
    /// * `target` - The normalized target
    /// * `input` - The normalized input, missing positions count as wrong
    pub fn calculate(target: &[u8], input: &[u8]) -> Self {
        let total = target.len();
        let correct = target
            .iter()
            .zip(input)
            .filter(|(expected, typed)| expected == typed)
            .count();

        let percentage = if total == 0 {
            100.0
        } else {
            (correct as Float / total as Float) * 100.0
        };

        Self {
            percentage,
            correct,
            total,
        }
    }

    /// Returns true if every position was typed correctly
    pub const fn is_perfect(&self) -> bool {
        self.correct == self.total
    }
}

/// Elapsed time, displayed as `m:ss`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed(pub Duration);

impl Elapsed {
    pub fn minutes(&self) -> Minutes {
        crate::minutes(self.0.as_secs_f64())
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0.as_secs();
        write!(f, "{}:{:02}", seconds / 60, seconds % 60)
    }
}

/// Everything reported at the end of a completed session
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub elapsed: Elapsed,
    pub wpm: Wpm,
    pub cpm: Cpm,
    pub accuracy: Accuracy,
    /// Distinct target words with at least one wrong position, sorted
    pub misspelled: BTreeSet<String>,
}

impl Report {
    /// Calculate the report from the elapsed time and the normalized buffers
    pub fn calculate(elapsed: Duration, target: &[u8], input: &[u8]) -> Self {
        let elapsed = Elapsed(elapsed);
        let minutes = elapsed.minutes();

        Self {
            elapsed,
            wpm: Wpm::calculate(target.len(), minutes),
            cpm: Cpm::calculate(target.len(), minutes),
            accuracy: Accuracy::calculate(target, input),
            misspelled: misspelled_words(target, input),
        }
    }

    /// Returns true for a flawless run
    pub const fn is_perfect(&self) -> bool {
        self.accuracy.is_perfect()
    }
}

/// Collect the whitespace-separated target words that were not typed exactly
///
/// A word counts as misspelled if any of its positions differs, or if the
/// input ends before the word does.
pub fn misspelled_words(target: &[u8], input: &[u8]) -> BTreeSet<String> {
    let mut misspelled = BTreeSet::new();
    let mut pos = 0;

    while pos < target.len() {
        while pos < target.len() && is_whitespace(target[pos]) {
            pos += 1;
        }

        let start = pos;
        while pos < target.len() && !is_whitespace(target[pos]) {
            pos += 1;
        }

        if start < pos && input.get(start..pos) != Some(&target[start..pos]) {
            misspelled.insert(String::from_utf8_lossy(&target[start..pos]).into_owned());
        }
    }

    misspelled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(target: &str, input: &str, seconds: u64) -> Report {
        Report::calculate(
            Duration::from_secs(seconds),
            target.as_bytes(),
            input.as_bytes(),
        )
    }

    #[test]
    fn test_perfect_run() {
        let report = report("cat dog", "cat dog", 10);
        assert_eq!(report.accuracy.percentage, 100.0);
        assert_eq!(report.accuracy.to_string(), "100.00%");
        assert!(report.is_perfect());
        assert!(report.misspelled.is_empty());
    }

    #[test]
    fn test_only_differing_words_are_misspelled() {
        let report = report("cat dog", "cat dig", 10);
        assert_eq!(report.misspelled.iter().collect::<Vec<_>>(), ["dog"]);
        assert_eq!(report.accuracy.correct, 6);
        assert_eq!(report.accuracy.to_string(), "85.71%");
        assert!(!report.is_perfect());
    }

    #[test]
    fn test_wrong_whitespace_is_not_a_word() {
        let report = report("cat dog", "catxdog", 10);
        assert!(report.misspelled.is_empty());
        assert!(!report.is_perfect());
    }

    #[test]
    fn test_misspelled_words_are_sorted_and_deduplicated() {
        let misspelled = misspelled_words(b"zeta the alpha the", b"zetx thx alphx thx");
        assert_eq!(
            misspelled.into_iter().collect::<Vec<_>>(),
            ["alpha", "the", "zeta"]
        );
    }

    #[test]
    fn test_short_input_marks_remaining_words() {
        let misspelled = misspelled_words(b"one two\nthree", b"one tw");
        assert_eq!(
            misspelled.into_iter().collect::<Vec<_>>(),
            ["three", "two"]
        );
    }

    #[test]
    fn test_speed() {
        let per_minute = report(&"a".repeat(50), &"a".repeat(50), 60);
        assert_eq!(per_minute.wpm, Wpm(10.0));
        assert_eq!(per_minute.cpm, Cpm(50.0));
        assert_eq!(per_minute.wpm.to_string(), "10.00");

        let half_minute = report("abcde", "abcde", 30);
        assert_eq!(half_minute.wpm, Wpm(2.0));
    }

    #[test]
    fn test_zero_elapsed_time() {
        let report = report("abc", "abc", 0);
        assert_eq!(report.wpm, Wpm(0.0));
        assert_eq!(report.cpm, Cpm(0.0));
    }

    #[test]
    fn test_elapsed_display() {
        assert_eq!(Elapsed(Duration::ZERO).to_string(), "0:00");
        assert_eq!(Elapsed(Duration::from_secs(65)).to_string(), "1:05");
        assert_eq!(Elapsed(Duration::from_millis(59_900)).to_string(), "0:59");
        assert_eq!(Elapsed(Duration::from_secs(754)).to_string(), "12:34");
    }
}
