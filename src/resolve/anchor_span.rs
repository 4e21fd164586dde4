use thiserror::Error;

use crate::markup::MarkupTree;

const FALLBACK_ANCHOR_TAGS: [&str; 4] = ["h1", "h2", "h3", "a"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    #[error("anchor '{0}' not found")]
    AnchorNotFound(String),

    #[error("no text after anchor '{0}'")]
    EmptyContent(String),
}

/// Text that follows the `start` anchor in document order, up to the element
/// carrying the `end` id (exclusive) or the end of the document.
pub fn extract_anchor_span<T: MarkupTree>(
    tree: &T,
    start: &str,
    end: Option<&str>,
) -> Result<String, SpanError> {
    let order = tree.document_order();
    let start_position = locate_start(tree, &order, start)
        .ok_or_else(|| SpanError::AnchorNotFound(start.to_string()))?;

    let mut pieces = Vec::new();
    for node in order.iter().skip(start_position + 1) {
        if end.is_some() && tree.element_id(*node) == end {
            break;
        }
        if let Some(text) = tree.own_text(*node) {
            let text = text.trim();
            if !text.is_empty() {
                pieces.push(text);
            }
        }
    }

    let content = pieces.join("\n").trim().to_string();
    if content.is_empty() {
        return Err(SpanError::EmptyContent(start.to_string()));
    }
    Ok(content)
}

/// Exact id match first, then the first heading or link whose text mentions
/// the anchor.
fn locate_start<T: MarkupTree>(tree: &T, order: &[T::Node], anchor: &str) -> Option<usize> {
    if let Some(position) = order
        .iter()
        .position(|node| tree.element_id(*node) == Some(anchor))
    {
        return Some(position);
    }

    let needle = anchor.to_lowercase();
    order.iter().position(|node| {
        tree.is_element(*node, &FALLBACK_ANCHOR_TAGS)
            && tree
                .text_content(*node, "")
                .trim()
                .to_lowercase()
                .contains(&needle)
    })
}
