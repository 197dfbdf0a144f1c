use std::io::{self, Write};

use typeline::Report;

const CELEBRATION: &str = "No mistakes! 🎉";

/// Print the statistics of a completed session
pub fn print_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Time: {}", report.elapsed)?;
    writeln!(out, "WPM: {}", report.wpm)?;
    writeln!(out, "CPM: {}", report.cpm)?;
    writeln!(out, "Accuracy: {}", report.accuracy)?;

    if report.is_perfect() {
        writeln!(out, "{CELEBRATION}")?;
    } else if !report.misspelled.is_empty() {
        let words = report
            .misspelled
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "Misspelled words: {words}")?;
    }

    out.flush()
}

pub fn print_cancelled<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Cancelled.")?;
    out.flush()
}
