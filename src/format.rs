/// Plain-text rendering for the CLI
use crate::keywords::KeywordVolume;
use crate::research::{VideoOptimization, VideoReport};
use crate::suggestions::SuggestionNode;
use crate::transcripts::{SelectedTranscript, SourceType, TranscriptInventory};
use crate::youtube::{CategoryTable, VideoDetails};
use std::fmt::Write;

pub const NO_TRANSCRIPT: &str = "❌ No transcript available for this video";

/// `1234567` → `1,234,567`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn source_marker(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::Manual => "✅",
        SourceType::Generated => "🤖",
        SourceType::Translated => "🔄",
    }
}

/// Header, stats line and body truncated to `word_limit` words
pub fn render_transcript(transcript: &SelectedTranscript, word_limit: usize) -> String {
    let text = transcript.text();
    let words: Vec<&str> = text.split_whitespace().collect();
    let minutes = (transcript.duration_seconds() / 60.0).floor() as u64;

    let kind = match (&transcript.source_type, &transcript.origin_language_code) {
        (SourceType::Translated, Some(origin)) => format!("Translated from {}", origin),
        (SourceType::Translated, None) => "Translated".to_string(),
        (SourceType::Manual, _) => "Manual".to_string(),
        (SourceType::Generated, _) => "Generated".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        source_marker(transcript.source_type),
        transcript.language_name,
        kind
    );
    let _ = writeln!(
        out,
        "📊 {} words • {} characters • {}min",
        words.len(),
        text.chars().count(),
        minutes
    );
    out.push('\n');

    if words.len() > word_limit {
        out.push_str(&words[..word_limit].join(" "));
        let _ = write!(out, "\n\n[...{} more words hidden...]", words.len() - word_limit);
    } else {
        out.push_str(&text);
    }
    out
}

/// Indented tree, one keyword per line
pub fn render_tree(tree: &SuggestionNode) -> String {
    fn walk(node: &SuggestionNode, depth: usize, out: &mut String) {
        for child in &node.children {
            let _ = writeln!(out, "{}└─ {}", "   ".repeat(depth), child.query);
            walk(child, depth + 1, out);
        }
    }

    let mut out = format!("🌳 {}\n", tree.query);
    walk(tree, 0, &mut out);
    out
}

pub fn render_suggestions(query: &str, suggestions: &[String]) -> String {
    let mut out = format!("🔍 Suggestions for '{}'\n", query);
    for (i, suggestion) in suggestions.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, suggestion);
    }
    out
}

pub fn render_volumes(volumes: &[KeywordVolume]) -> String {
    let width = volumes.iter().map(|v| v.keyword.chars().count()).max().unwrap_or(7).max(7);
    let mut out = format!("{:<width$}  {:>10}  {:>10}  {:>11}\n", "Keyword", "Volume", "CPC", "Competition");
    for row in volumes {
        let cpc = format!("{:.2} {}", row.cpc.value, row.cpc.currency);
        let _ = writeln!(
            out,
            "{:<width$}  {:>10}  {:>10}  {:>11.2}",
            row.keyword,
            thousands(row.vol),
            cpc.trim_end(),
            row.competition
        );
    }
    out
}

pub fn render_inventory(video_id: &str, inventory: &TranscriptInventory) -> String {
    let section = |title: &str, items: &[String]| {
        if items.is_empty() {
            format!("{}: none\n", title)
        } else {
            format!("{}: {}\n", title, items.join(", "))
        }
    };

    let mut out = format!("🎞️ Caption tracks for {}\n", video_id);
    out.push_str(&section("✅ Manual", &inventory.manual));
    out.push_str(&section("🤖 Generated", &inventory.generated));
    out.push_str(&section("🔄 Translatable", &inventory.translatable));
    out
}

/// `h:mm:ss` or `m:ss`; the raw API value when it does not parse
fn video_length(details: &VideoDetails) -> String {
    match details.duration_seconds() {
        Some(total) if total >= 3_600 => {
            format!("{}:{:02}:{:02}", total / 3_600, (total % 3_600) / 60, total % 60)
        }
        Some(total) => format!("{}:{:02}", total / 60, total % 60),
        None => details.duration.clone(),
    }
}

fn render_details_line(details: &VideoDetails, categories: &CategoryTable) -> String {
    let published = details
        .published_at
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "URL: {} Category: {} Views: {} Length: {} Published at: {} Comments: {}",
        details.url,
        categories.resolve(&details.category_id),
        thousands(details.views),
        video_length(details),
        published,
        thousands(details.comments)
    )
}

pub fn render_video_report(report: &VideoReport, categories: &CategoryTable, word_limit: usize) -> String {
    let missing = "(not available)";
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#{} {} Channel: {}",
        report.rank, report.details.title, report.details.channel_title
    );
    let _ = writeln!(out, "{}", render_details_line(&report.details, categories));
    let _ = writeln!(out, "\nOriginal Title\n{}", report.details.title);
    let _ = writeln!(out, "\nOriginal Description\n{}", report.details.description);
    let _ = writeln!(
        out,
        "\nOptimized Title\n{}",
        report.optimized_title.as_deref().unwrap_or(missing)
    );
    let _ = writeln!(
        out,
        "\nOptimized Description\n{}",
        report.optimized_description.as_deref().unwrap_or(missing)
    );
    let transcript = report
        .transcript
        .as_ref()
        .map(|t| render_transcript(t, word_limit))
        .unwrap_or_else(|| NO_TRANSCRIPT.to_string());
    let _ = writeln!(out, "\nTranscript\n{}", transcript);
    out
}

pub fn render_optimization(result: &VideoOptimization, categories: &CategoryTable) -> String {
    let details = &result.details;
    let mut out = String::new();
    let _ = writeln!(out, "🎬 {}", details.title);
    let _ = writeln!(out, "Channel: {}", details.channel_title);
    let _ = writeln!(out, "{}", render_details_line(details, categories));
    let _ = writeln!(out, "\nOptimized Title\n{}", result.optimized_title);
    let _ = writeln!(out, "\nOptimized Description\n{}", result.optimized_description);
    if result.transcript.is_none() {
        let _ = writeln!(out, "\n{}", NO_TRANSCRIPT);
    }
    out
}
