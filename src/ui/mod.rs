//! Terminal rendering of decoded feeds for the command line.
//!
//! Colored output via owo-colors; disabled automatically when stdout is not a
//! terminal.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::models::{Entry, Feed};

/// Width used to wrap summaries
pub const SUMMARY_WIDTH: usize = 88;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    if !std::io::stderr().is_terminal() {
        eprintln!("{} {}", icon, msg);
        return;
    }
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Print search results header.
pub fn print_search_header(query: &str, feed: &Feed, duration: Duration) {
    let color = is_terminal();
    let shown = feed.entries.len();
    let total = format_number(feed.total_results);

    println!();
    if color {
        println!(
            "{} Search results for: {}",
            status_icon(Status::Search).yellow().bold(),
            query.cyan().bold()
        );
        println!(
            "{} Showing {} of {} papers in {:.2}s",
            "─".repeat(30).dimmed(),
            shown.to_string().green().bold(),
            total.green(),
            duration.as_secs_f64()
        );
    } else {
        println!("Search results for: {}", query);
        println!(
            "Showing {} of {} papers in {:.2}s",
            shown,
            total,
            duration.as_secs_f64()
        );
    }
    println!();
}

/// Print one entry: title, authors, ids and a wrapped summary.
pub fn print_entry(index: usize, entry: &Entry) {
    let color = is_terminal();
    let title = normalize_whitespace(&entry.title);
    let authors = truncate_with_ellipsis(&entry.authors_joined(", "), SUMMARY_WIDTH);
    let date = entry
        .published_at()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "????-??-??".to_string());
    let category = entry.primary_category.term.as_str();

    if color {
        println!("{:>3}. {}", index, title.blue().bold());
        println!("     {}", authors);
        println!(
            "     {} · {} · {}",
            entry.arxiv_id().yellow(),
            date,
            category.green()
        );
    } else {
        println!("{:>3}. {}", index, title);
        println!("     {}", authors);
        println!("     {} · {} · {}", entry.arxiv_id(), date, category);
    }

    if !entry.journal_ref.is_empty() {
        println!("     Journal: {}", normalize_whitespace(&entry.journal_ref));
    }
    if !entry.doi.is_empty() {
        println!("     DOI: {}", entry.doi);
    }
    if let Some(pdf) = entry.pdf_url() {
        println!("     PDF: {}", pdf);
    }

    for line in wrap(&normalize_whitespace(&entry.summary), SUMMARY_WIDTH - 5) {
        if color {
            println!("     {}", line.dimmed());
        } else {
            println!("     {}", line);
        }
    }
    println!();
}

/// Print a decoded feed in full.
pub fn print_feed(query: &str, feed: &Feed, duration: Duration) {
    print_search_header(query, feed, duration);
    let first = usize::try_from(feed.start_index).unwrap_or(0) + 1;
    for (offset, entry) in feed.entries.iter().enumerate() {
        print_entry(first + offset, entry);
    }
    if feed.has_more() {
        print_status(
            Status::Info,
            "More results available; raise --max-results to see them",
        );
    }
}

/// Collapse runs of whitespace (arXiv titles and summaries are hard-wrapped).
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap at `width` characters.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Format a number with commas.
pub fn format_number(n: i64) -> String {
    let digits: Vec<char> = n.unsigned_abs().to_string().chars().rev().collect();
    let grouped: String = digits
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect();

    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Truncate text to at most `max_width` characters, ending in `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_width - 3).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("Hi", 10), "Hi");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("Schrödinger Equation", 10), "Schrödi...");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(-4500), "-4,500");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("\n  Quantum Electrodynamics\n  of   Spin\n"),
            "Quantum Electrodynamics of Spin"
        );
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("the sum over histories of a particle", 12),
            vec!["the sum over", "histories of", "a particle"]
        );
        assert!(wrap("", 10).is_empty());
        // A single long word is kept whole
        assert_eq!(wrap("supercalifragilistic", 5), vec!["supercalifragilistic"]);
    }
}
