// ABOUTME: Splits oversized documents on paragraph boundaries and merges per-chunk analyses
// ABOUTME: Nothing is truncated; every character of the input lands in exactly one chunk

use copilot_models::{AnalysisResult, FunctionalRequirement, NOT_APPLICABLE};
use tracing::warn;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Chunks break between paragraphs where possible. A single paragraph longer
/// than `max_chars` is cut at the last whitespace inside the window, or at a
/// character boundary when it has none. Whitespace-only chunks are dropped.
pub fn split_document(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut current_chars = 0;

    for paragraph in text.split_inclusive(PARAGRAPH_BREAK) {
        let paragraph_chars = paragraph.chars().count();

        if current_chars > 0 && current_chars + paragraph_chars > max_chars {
            chunks.push(&text[start..offset]);
            start = offset;
            current_chars = 0;
        }

        if paragraph_chars > max_chars {
            chunks.extend(split_long_paragraph(paragraph, max_chars));
            start = offset + paragraph.len();
        } else {
            current_chars += paragraph_chars;
        }

        offset += paragraph.len();
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    let chunks: Vec<&str> = chunks
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();

    if chunks.is_empty() {
        vec![text]
    } else {
        chunks
    }
}

fn split_long_paragraph(mut paragraph: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();

    while paragraph.chars().count() > max_chars {
        // Byte index just past the max_chars-th character
        let window_end = paragraph
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(paragraph.len());
        let window = &paragraph[..window_end];

        let cut = window
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, c)| idx + c.len_utf8())
            .filter(|&idx| idx > 0 && idx < window_end)
            .unwrap_or(window_end);

        pieces.push(&paragraph[..cut]);
        paragraph = &paragraph[cut..];
    }

    if !paragraph.is_empty() {
        pieces.push(paragraph);
    }
    pieces
}

/// Merge per-chunk analyses into one result.
///
/// A conversational reply survives only when every chunk was conversational;
/// otherwise conversational chunks are ignored and categories are combined.
pub fn merge_analyses(parts: Vec<AnalysisResult>) -> AnalysisResult {
    if parts.len() == 1 {
        return parts.into_iter().next().unwrap_or_default();
    }

    if !parts.is_empty() && parts.iter().all(AnalysisResult::is_conversational) {
        let reply = parts
            .iter()
            .filter_map(|part| part.conversation_response.as_deref())
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_BREAK);
        return AnalysisResult::conversational(reply);
    }

    let mut merged = AnalysisResult::default();
    for (index, part) in parts.into_iter().enumerate() {
        if part.is_conversational() {
            warn!(
                chunk = index,
                "Ignoring conversational reply for one chunk of a requirements document"
            );
            continue;
        }

        take_first_applicable(&mut merged.business_objective, part.business_objective);
        take_first_applicable(&mut merged.client_type, part.client_type);
        take_first_applicable(&mut merged.risk_tolerance, part.risk_tolerance);

        extend_unique(&mut merged.regulatory_constraints, part.regulatory_constraints);
        extend_unique(
            &mut merged.non_functional_requirements,
            part.non_functional_requirements,
        );
        extend_unique(&mut merged.business_rules, part.business_rules);
        extend_unique(&mut merged.data_requirements, part.data_requirements);
        extend_unique(&mut merged.interface_requirements, part.interface_requirements);
        extend_unique(&mut merged.ui_ux_requirements, part.ui_ux_requirements);
        extend_unique(&mut merged.reporting_requirements, part.reporting_requirements);
        extend_unique(&mut merged.audit_and_logging, part.audit_and_logging);
        extend_unique(&mut merged.historical_issues, part.historical_issues);

        extend_requirements(
            &mut merged.functional_requirements,
            part.functional_requirements,
        );
    }
    merged
}

fn take_first_applicable(target: &mut String, candidate: String) {
    let unset = target.as_str() == NOT_APPLICABLE || target.trim().is_empty();
    let applicable = candidate != NOT_APPLICABLE && !candidate.trim().is_empty();
    if unset && applicable {
        *target = candidate;
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

fn extend_requirements(target: &mut Vec<FunctionalRequirement>, items: Vec<FunctionalRequirement>) {
    for item in items {
        if !target.iter().any(|existing| existing.id == item.id) {
            target.push(item);
        }
    }
}
