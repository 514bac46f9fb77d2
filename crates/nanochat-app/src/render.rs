//! Plain-text presentation of the chat state.

use std::io::{self, Write};

use chrono::Local;
use nanochat_core::{ChatView, Role, Stats};

const BAR_WIDTH: usize = 20;

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "nano",
    }
}

/// Banner, every turn, then notices.
pub fn transcript(out: &mut impl Write, view: &ChatView<'_>) -> io::Result<()> {
    if let Some(banner) = view.error_banner {
        writeln!(out, "!! {banner}")?;
    }
    for turn in view.transcript {
        writeln!(
            out,
            "[{}] {}: {}",
            turn.timestamp.with_timezone(&Local).format("%H:%M"),
            label(turn.role),
            turn.content
        )?;
    }
    notices(out, view)
}

pub fn notices(out: &mut impl Write, view: &ChatView<'_>) -> io::Result<()> {
    for notice in &view.notices {
        writeln!(out, "-- {}: {}", notice.title, notice.body)?;
    }
    Ok(())
}

pub fn stats(out: &mut impl Write, stats: &Stats) -> io::Result<()> {
    writeln!(
        out,
        "temperature {:.1} | top-K {} | tokens {} used, {} left of {}",
        stats.temperature, stats.top_k, stats.tokens_so_far, stats.tokens_left, stats.max_tokens
    )?;
    writeln!(
        out,
        "[{}] {:.0}%",
        usage_bar(stats.usage_ratio(), BAR_WIDTH),
        stats.usage_ratio() * 100.0
    )
}

pub fn raw(out: &mut impl Write, view: &ChatView<'_>) -> io::Result<()> {
    if view.raw_response.is_empty() {
        writeln!(out, "(no raw response yet)")
    } else {
        writeln!(out, "--- raw ---\n{}\n-----------", view.raw_response)
    }
}

fn usage_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// Prints a streamed answer in place.
///
/// Each update is the whole answer so far, so only the part past what is
/// already on screen is written. When an update does not extend the
/// printed text (an error marker, say) it goes on a fresh line.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: String,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, out: &mut impl Write, content: &str) -> io::Result<()> {
        match content.strip_prefix(self.printed.as_str()) {
            Some(suffix) => write!(out, "{suffix}")?,
            None => write!(out, "\n{content}")?,
        }
        self.printed = content.to_string();
        out.flush()
    }

    pub fn finish(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.printed.clear();
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(steps: &[&str]) -> String {
        let mut out = Vec::new();
        let mut printer = StreamPrinter::new();
        for step in steps {
            printer.show(&mut out, step).unwrap();
        }
        printer.finish(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn growing_answer_prints_suffixes() {
        assert_eq!(printed(&["Hi", "Hi there", "Hi there!"]), "Hi there!\n");
    }

    #[test]
    fn divergent_update_starts_new_line() {
        assert_eq!(
            printed(&["Once upon", "Error: timeout"]),
            "Once upon\nError: timeout\n"
        );
    }

    #[test]
    fn usage_bar_fills_proportionally() {
        assert_eq!(usage_bar(0.0, 4), "....");
        assert_eq!(usage_bar(0.5, 4), "##..");
        assert_eq!(usage_bar(2.0, 4), "####");
    }

    #[test]
    fn stats_line_shows_counters() {
        let mut out = Vec::new();
        let s = Stats {
            temperature: 0.8,
            top_k: 3,
            tokens_so_far: 10,
            tokens_left: 30,
            max_tokens: 40,
        };
        stats(&mut out, &s).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("temperature 0.8 | top-K 3"));
        assert!(text.contains("10 used, 30 left of 40"));
        assert!(text.contains("25%"));
    }
}
