use std::sync::LazyLock;

use regex::Regex;

use super::ChapterDraft;
use crate::book::Document;
use crate::markup::{MarkupTree, collapse_whitespace};

static HEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^h[1-3]$").expect("valid heading tag regex"));

fn is_heading<T: MarkupTree>(tree: &T, node: T::Node) -> bool {
    tree.tag(node).is_some_and(|tag| HEADING_TAG.is_match(tag))
}

/// Tier 2: each `h1`-`h3` opens a chapter holding the text of its following
/// siblings up to the next such heading.
pub fn resolve_headings(document: &Document, warnings: &mut Vec<String>) -> Vec<ChapterDraft> {
    let mut chapters = Vec::new();
    for item in document.spine_items() {
        for draft in heading_chapters(&item.dom) {
            if draft.content.is_empty() {
                warnings.push(format!(
                    "heading '{}' in '{}' has no content; skipped",
                    draft.title, item.id
                ));
                continue;
            }
            chapters.push(draft);
        }
    }
    chapters
}

/// Heading drafts of one tree, empty ones included.
pub fn heading_chapters<T: MarkupTree>(tree: &T) -> Vec<ChapterDraft> {
    tree.document_order()
        .into_iter()
        .filter(|node| is_heading(tree, *node))
        .map(|heading| {
            let parts: Vec<String> = tree
                .following_siblings(heading)
                .into_iter()
                .take_while(|sibling| !is_heading(tree, *sibling))
                .map(|sibling| tree.text_content(sibling, " "))
                .collect();
            ChapterDraft {
                title: collapse_whitespace(&tree.text_content(heading, "")),
                content: collapse_whitespace(&parts.join(" ")),
            }
        })
        .collect()
}
