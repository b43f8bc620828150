//! Output shapes for the two front ends.

use crate::dispatch::{Outcome, SearchOutcome};
use crate::normalize::ResultItem;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// MCP tool result: an ordered list of text content blocks.
    Protocol,
    /// CLI: payload for stdout plus an optional status line for stderr.
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedOutput {
    Blocks(Vec<String>),
    Console {
        stdout: String,
        status: Option<String>,
    },
}

pub fn format(outcome: &Outcome, surface: Surface) -> FormattedOutput {
    match surface {
        Surface::Protocol => FormattedOutput::Blocks(content_blocks(outcome)),
        Surface::Console => FormattedOutput::Console {
            stdout: console_text(outcome),
            status: console_status(outcome),
        },
    }
}

pub fn content_blocks(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Search(s) => search_blocks(s),
        Outcome::Research(r) => vec![r.report.clone()],
    }
}

fn search_blocks(s: &SearchOutcome) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(answer) = s.result.answer.as_deref().filter(|a| !a.is_empty()) {
        blocks.push(format!("**AI Answer:**\n{answer}\n\n---\n"));
    }
    if !s.result.results.is_empty() {
        let mut text = String::from("**Search Results:**\n\n");
        for (i, item) in s.result.results.iter().enumerate() {
            push_item(&mut text, i + 1, item, true);
        }
        blocks.push(text);
    }
    blocks.push(format!(
        "\n---\n*Search completed using {} provider. Found {} results.*",
        s.request.provider,
        s.result.results.len()
    ));
    blocks
}

pub fn console_text(outcome: &Outcome) -> String {
    let s = match outcome {
        Outcome::Search(s) => s,
        Outcome::Research(r) => return format!("{}\n", r.report),
    };
    let mut out = String::new();
    if let Some(answer) = s.result.answer.as_deref().filter(|a| !a.is_empty()) {
        let _ = write!(out, "\n📝 AI Answer:\n{answer}\n\n---\n\n");
    }
    if !s.result.results.is_empty() {
        out.push_str("🔍 Search Results:\n\n");
        for (i, item) in s.result.results.iter().enumerate() {
            push_item(&mut out, i + 1, item, false);
        }
    }
    out
}

pub fn console_status(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Search(s) => Some(format!("✅ Found {} results", s.result.results.len())),
        Outcome::Research(_) => None,
    }
}

/// Record written by `search --output <file>`.
pub fn file_record(s: &SearchOutcome, timestamp: &str) -> serde_json::Value {
    serde_json::json!({
        "query": s.request.query,
        "provider": s.request.provider,
        "timestamp": timestamp,
        "answer": s.result.answer,
        "results": s.result.results,
    })
}

fn push_item(out: &mut String, index: usize, item: &ResultItem, bold: bool) {
    if bold {
        let _ = writeln!(out, "{index}. **{}**", item.title);
    } else {
        let _ = writeln!(out, "{index}. {}", item.title);
    }
    let _ = writeln!(out, "   URL: {}", item.url);
    if let Some(snippet) = item.snippet.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   {snippet}");
    }
    out.push('\n');
}
