//! Terminal rendering for CLI results.

use crate::engine::{AcceptSummary, SystemInfo};
use crate::learning::{LearningStats, RecordOutcome};
use crate::resolution::ResolutionResult;
use crate::reverse::SegmentMatches;
use owo_colors::OwoColorize;

/// One block per token: the word, then its numbered candidates with the
/// current pick marked.
pub fn render_results(results: &[ResolutionResult]) -> String {
    let mut lines = Vec::new();
    for result in results {
        if !result.token.is_word {
            lines.push(result.token.original.dimmed().to_string());
            continue;
        }
        if result.candidates.has_override {
            lines.push(format!(
                "{} {}",
                result.token.original.bold(),
                "(override)".green()
            ));
        } else {
            lines.push(result.token.original.bold().to_string());
        }
        let chosen = result.final_choice();
        for (idx, option) in result.candidates.options.iter().enumerate() {
            if Some(option.as_str()) == chosen {
                lines.push(format!("  {} {idx}: {option}", "●".green()));
            } else {
                lines.push(format!("    {idx}: {option}"));
            }
        }
    }
    lines.join("\n")
}

pub fn render_outcome(word: &str, ipa: &str, outcome: &RecordOutcome) -> String {
    let line = format!(
        "{word} → {ipa}  confidence {:.2} ({}/{})",
        outcome.confidence, outcome.selection_count, outcome.total_word_selections
    );
    if outcome.promoted {
        format!("{line}  {}", "promoted".green())
    } else {
        line
    }
}

pub fn render_accept(summary: &AcceptSummary) -> String {
    let learned = format!("Learned {} words", summary.learned);
    if summary.promoted > 0 {
        format!(
            "{}\n{}, promoted {}",
            summary.full_ipa,
            learned.green(),
            summary.promoted
        )
    } else {
        format!("{}\n{}", summary.full_ipa, learned.green())
    }
}

pub fn render_reverse(segments: &[SegmentMatches]) -> String {
    if segments.iter().all(|s| s.candidates.is_empty()) {
        return "No matching words found. Teach one with `hce-ipa teach`."
            .yellow()
            .to_string();
    }
    let mut lines = Vec::new();
    for segment in segments {
        lines.push(segment.ipa.bold().to_string());
        if segment.candidates.is_empty() {
            lines.push(format!("  {}", "no matches".dimmed()));
        }
        for candidate in &segment.candidates {
            let mut line = format!(
                "  {}  {} {}",
                candidate.word,
                candidate.dialect.to_string().to_uppercase().dimmed(),
                candidate.source.dimmed()
            );
            if let Some(confidence) = candidate.confidence {
                line.push_str(&format!(" {confidence:.2}"));
            }
            if candidate.is_custom {
                line.push_str(&format!(" {}", "custom".cyan()));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

fn row(label: &str, value: impl std::fmt::Display) -> String {
    format!("{}{value}", format!("{label:<24}").dimmed())
}

pub fn render_stats(stats: &LearningStats) -> String {
    let mut lines = vec![
        row("Interactions:", stats.total_interactions),
        row("Unique words:", stats.unique_words),
        row("Manual corrections:", stats.manual_corrections),
        row("High confidence:", stats.high_confidence_events),
        row("Overrides:", stats.auto_promotions),
        row("Custom pronunciations:", stats.custom_pronunciations),
        row("Accepted sentences:", stats.accepted_sentences),
    ];
    for (dialect, count) in &stats.custom_by_dialect {
        lines.push(row(&format!("  {}", dialect.to_uppercase()), count));
    }
    lines.join("\n")
}

pub fn render_system_info(info: &SystemInfo) -> String {
    let status = if info.synthesizer_available {
        "✓ available".green().to_string()
    } else {
        "- not available, using curated tables".yellow().to_string()
    };
    let mut lines = vec![
        row("Version:", &info.version),
        row("Dialect:", &info.dialect),
        row("Synthesizer:", format!("{} {status}", info.synthesizer)),
        row("Phoneme rules:", info.phoneme_rules),
        row("Fallback words:", info.fallback_words),
    ];
    for (source, entries) in &info.reference_dictionaries {
        lines.push(row("Reference:", format!("{source} ({entries} entries)")));
    }
    lines.push(row("Overrides:", info.overrides));
    lines.push(match &info.data_dir {
        Some(dir) => row("Data dir:", dir.display()),
        None => row("Data dir:", "(in memory)"),
    });
    lines.join("\n")
}
