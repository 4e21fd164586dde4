//! Uniform node view over parsed XHTML content documents.
//!
//! Resolvers only talk to [`MarkupTree`]; [`MarkupDom`] is the one
//! implementation, built from a `scraper` parse of the item's markup.

use scraper::{Html, Node};

/// Elements whose subtrees never contribute to the clean text of an item.
const BOILERPLATE_TAGS: [&str; 5] = ["nav", "header", "footer", "script", "style"];

pub trait MarkupTree {
    type Node: Copy + Eq + std::fmt::Debug;

    fn root(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Lower-case local name for element nodes.
    fn tag(&self, node: Self::Node) -> Option<&str>;

    fn element_id(&self, node: Self::Node) -> Option<&str>;

    /// Characters held directly by the node. Only text nodes carry text;
    /// script and style content is never exposed.
    fn own_text(&self, node: Self::Node) -> Option<&str>;

    /// All nodes in document order (pre-order), root first.
    fn document_order(&self) -> Vec<Self::Node> {
        let mut order = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            order.push(node);
            let mut children = self.children(node);
            children.reverse();
            stack.extend(children);
        }
        order
    }

    /// Text of every text node under `node`, joined with `separator`.
    fn text_content(&self, node: Self::Node, separator: &str) -> String {
        let mut parts = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.own_text(current) {
                parts.push(text);
            }
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        parts.join(separator)
    }

    fn following_siblings(&self, node: Self::Node) -> Vec<Self::Node> {
        let Some(parent) = self.parent(node) else {
            return Vec::new();
        };
        self.children(parent)
            .into_iter()
            .skip_while(|sibling| *sibling != node)
            .skip(1)
            .collect()
    }

    fn is_element(&self, node: Self::Node, names: &[&str]) -> bool {
        self.tag(node).is_some_and(|tag| names.contains(&tag))
    }
}

#[derive(Debug, Clone)]
enum DomKind {
    Document,
    Element { tag: String, id: Option<String> },
    Text(String),
    Other,
}

#[derive(Debug, Clone)]
struct DomNode {
    parent: Option<usize>,
    children: Vec<usize>,
    kind: DomKind,
}

/// Arena copy of a parsed document. Node indices follow document order.
#[derive(Debug, Clone)]
pub struct MarkupDom {
    nodes: Vec<DomNode>,
}

impl MarkupDom {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let mut nodes: Vec<DomNode> = Vec::new();
        let mut stack = vec![(html.tree.root(), None::<usize>, false)];

        while let Some((node, parent, in_raw_text)) = stack.pop() {
            let index = nodes.len();
            let kind = match node.value() {
                Node::Document => DomKind::Document,
                Node::Element(element) => DomKind::Element {
                    tag: element.name().to_ascii_lowercase(),
                    id: element.id().map(ToOwned::to_owned),
                },
                Node::Text(text) if !in_raw_text => DomKind::Text((**text).to_string()),
                _ => DomKind::Other,
            };
            let child_in_raw_text = in_raw_text
                || matches!(&kind, DomKind::Element { tag, .. } if tag == "script" || tag == "style");

            nodes.push(DomNode {
                parent,
                children: Vec::new(),
                kind,
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(index), child_in_raw_text));
            }
        }

        Self { nodes }
    }
}

impl MarkupTree for MarkupDom {
    type Node = usize;

    fn root(&self) -> usize {
        0
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes.get(node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.nodes
            .get(node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn tag(&self, node: usize) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            DomKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn element_id(&self, node: usize) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            DomKind::Element { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    fn own_text(&self, node: usize) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            DomKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn document_order(&self) -> Vec<usize> {
        (0..self.nodes.len()).collect()
    }
}

/// Visible text of a whole item: boilerplate subtrees dropped, text nodes
/// joined by single spaces, whitespace collapsed.
pub fn flatten_clean_text<T: MarkupTree>(tree: &T) -> String {
    let mut parts = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if tree.is_element(node, &BOILERPLATE_TAGS) {
            continue;
        }
        if let Some(text) = tree.own_text(node) {
            parts.push(text);
        }
        let mut children = tree.children(node);
        children.reverse();
        stack.extend(children);
    }
    collapse_whitespace(&parts.join(" "))
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
