use tracing::debug;

use super::ChapterDraft;
use super::normalize::{NormalizedText, normalize};
use crate::book::Document;
use crate::markup::{collapse_whitespace, flatten_clean_text};

/// Where an oracle title landed in the normalized full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    /// Byte offset in the normalized text; `None` when unmatched.
    pub offset: Option<usize>,
}

/// Clean text of every spine item, joined and whitespace-collapsed.
pub fn book_full_text(document: &Document) -> String {
    let cleaned: Vec<String> = document
        .spine_items()
        .map(|item| flatten_clean_text(&item.dom))
        .collect();
    collapse_whitespace(&cleaned.join(" "))
}

/// First `chars` characters of `text`.
pub fn preview(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Monotonic search: every title is looked up at or after the end of the
/// previous match, whole title first, then shorter word prefixes.
pub fn match_title_offsets(full: &NormalizedText, titles: &[String]) -> Vec<TitleMatch> {
    let mut cursor = 0;
    titles
        .iter()
        .map(|title| {
            let offset = find_title(full, &normalize(title), cursor).map(|(position, length)| {
                cursor = position + length;
                position
            });
            TitleMatch {
                title: title.clone(),
                offset,
            }
        })
        .collect()
}

fn find_title(full: &NormalizedText, title: &str, cursor: usize) -> Option<(usize, usize)> {
    if title.is_empty() {
        return None;
    }
    if let Some(position) = full.find_from(title, cursor) {
        return Some((position, title.len()));
    }

    let words: Vec<&str> = title.split(' ').collect();
    (1..=words.len()).rev().find_map(|count| {
        let prefix = words[..count].join(" ");
        full.find_from(&prefix, cursor)
            .map(|position| (position, prefix.len()))
    })
}

/// Tier 3 slicing: each matched title owns the text up to the next matched
/// title. Unmatched titles become warnings.
pub fn resolve_title_offsets(
    full_text: &str,
    titles: &[String],
    warnings: &mut Vec<String>,
) -> Vec<ChapterDraft> {
    let normalized = NormalizedText::new(full_text);
    let matches = match_title_offsets(&normalized, titles);
    debug!(
        normalized_bytes = normalized.as_str().len(),
        titles = titles.len(),
        "matched oracle titles"
    );

    let mut matched = Vec::new();
    for found in &matches {
        match found.offset {
            Some(offset) => matched.push((found.title.as_str(), offset)),
            None => warnings.push(format!("title '{}' not found in book text", found.title)),
        }
    }

    matched
        .iter()
        .enumerate()
        .map(|(index, (title, offset))| {
            let start = normalized.original_offset(*offset);
            let end = matched
                .get(index + 1)
                .map(|(_, next)| normalized.original_offset(*next))
                .unwrap_or(full_text.len());
            ChapterDraft {
                title: (*title).to_string(),
                content: full_text[start..end].trim().to_string(),
            }
        })
        .collect()
}
