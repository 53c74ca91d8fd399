use crate::engine::{PairComparison, RunStats, RunSummary};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Create and return a spinner shown while a lab is compared.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_spinner(lab_id: &str) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Comparing submissions of {lab_id}…"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print the header for a lab.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write, lab_id: &str) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{} {}", "Lab".cyan().bold(), lab_id.bold())?;
    writeln!(writer, "{}", "─".repeat(40).cyan())?;
    Ok(())
}

/// Print run counters with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, summary: &RunSummary) -> std::io::Result<()> {
    let flagged = if summary.flagged == 0 {
        summary.flagged.to_string().green()
    } else {
        summary.flagged.to_string().red().bold()
    };
    writeln!(
        writer,
        "Comparisons: {}  Potential matches: {}  Flagged: {}",
        summary.comparisons.to_string().bold(),
        summary.potential_matches.to_string().yellow(),
        flagged,
    )?;
    print_run_stats(writer, &summary.stats)
}

/// Print the dimmed statistics line.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_run_stats(writer: &mut impl Write, stats: &RunStats) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}",
        format!(
            "{} submissions, {} authors, {} cross-language pairs skipped, {} ms",
            stats.fetched, stats.selected, stats.cross_language_skipped, stats.elapsed_ms
        )
        .dimmed()
    )?;
    writeln!(writer)?;
    Ok(())
}

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn score_color(row: &PairComparison) -> Color {
    if row.flagged {
        Color::Red
    } else {
        Color::Yellow
    }
}

/// Print comparison rows as a table, or a note when there are none.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_comparisons(writer: &mut impl Write, rows: &[PairComparison]) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(writer, "{}", "[OK] No similar pairs found.".green())?;
        return Ok(());
    }

    let mut table = create_table(vec![
        "Submission 1",
        "Submission 2",
        "Similarity",
        "Matching Lines",
        "Flagged",
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.submission_1_id),
            Cell::new(&row.submission_2_id),
            Cell::new(format!("{:.2}%", row.similarity_score))
                .fg(score_color(row))
                .add_attribute(Attribute::Bold),
            Cell::new(row.matching_lines),
            if row.flagged {
                Cell::new("yes").fg(Color::Red)
            } else {
                Cell::new("no").add_attribute(Attribute::Dim)
            },
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the note for a lab with too few authors.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_insufficient(writer: &mut impl Write, authors: usize) -> std::io::Result<()> {
    writeln!(
        writer,
        "{} {}",
        crate::constants::INSUFFICIENT_DATA_MESSAGE.yellow(),
        format!("({authors} author(s) found)").dimmed()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(flagged: bool) -> PairComparison {
        PairComparison {
            lab_id: "lab".to_owned(),
            submission_1_id: "sub-a".to_owned(),
            submission_2_id: "sub-b".to_owned(),
            similarity_score: if flagged { 88.5 } else { 55.0 },
            matching_lines: 6,
            flagged,
        }
    }

    #[test]
    fn test_print_comparisons_table() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_comparisons(&mut out, &[row(true), row(false)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("sub-a"));
        assert!(text.contains("88.50%"));
        assert!(text.contains("55.00%"));
    }

    #[test]
    fn test_print_comparisons_empty() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_comparisons(&mut out, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No similar pairs"));
    }

    #[test]
    fn test_spinner_hidden_in_tests() {
        assert!(create_spinner("lab").is_hidden());
    }
}
