use std::collections::HashSet;

use super::ChapterDraft;
use super::anchor_span::extract_anchor_span;
use crate::book::{Document, NavigationTree, TargetRef};
use crate::markup::flatten_clean_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub item: String,
    pub anchor: Option<String>,
}

impl TocEntry {
    fn target(&self) -> TargetRef {
        TargetRef::new(self.item.clone(), self.anchor.as_deref())
    }
}

/// Pre-order flattening: each entry precedes its children, siblings keep
/// their order. Revisited or dangling indices are skipped.
pub fn flatten_navigation(tree: &NavigationTree, warnings: &mut Vec<String>) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<usize> = tree.roots.iter().rev().copied().collect();

    while let Some(index) = stack.pop() {
        let Some(node) = tree.nodes.get(index) else {
            warnings.push(format!("navigation references missing entry #{index}"));
            continue;
        };
        if !visited.insert(index) {
            warnings.push(format!(
                "navigation entry '{}' reached twice; skipping cycle",
                node.title
            ));
            continue;
        }

        match &node.target {
            Some(target) => entries.push(TocEntry {
                title: node.title.clone(),
                item: target.item.clone(),
                anchor: target.anchor.clone(),
            }),
            None => warnings.push(format!(
                "navigation entry '{}' has no target; skipped",
                node.title
            )),
        }

        stack.extend(node.children.iter().rev().copied());
    }

    entries
}

/// Tier 1: one chapter per navigation entry that resolves to text.
pub fn resolve_native_toc(document: &Document, warnings: &mut Vec<String>) -> Vec<ChapterDraft> {
    let Some(tree) = document.navigation.as_ref() else {
        return Vec::new();
    };
    let entries = flatten_navigation(tree, warnings);
    let mut chapters = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let target = entry.target();
        let Some(item) = document.item(&target.item) else {
            warnings.push(format!(
                "chapter '{}' targets unknown item '{}'",
                entry.title, target.item
            ));
            continue;
        };

        let end_anchor = entries
            .get(index + 1)
            .filter(|next| next.item == entry.item)
            .and_then(|next| next.anchor.as_deref());

        let content = match target.anchor.as_deref() {
            None => {
                let text = flatten_clean_text(&item.dom);
                if text.is_empty() {
                    warnings.push(format!("chapter '{}' has empty content", entry.title));
                    continue;
                }
                text
            }
            Some(anchor) => match extract_anchor_span(&item.dom, anchor, end_anchor) {
                Ok(text) => text,
                Err(err) => {
                    warnings.push(format!("chapter '{}' dropped: {err}", entry.title));
                    continue;
                }
            },
        };

        chapters.push(ChapterDraft {
            title: entry.title.clone(),
            content,
        });
    }

    chapters
}
