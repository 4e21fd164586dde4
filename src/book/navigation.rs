//! Table-of-contents parsing: EPUB3 nav documents and EPUB2 NCX files.

use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{ElementRef, Html};

use super::href::resolve_href;
use super::xml::{attr_string, local_name, resolve_entity};
use super::{BookError, NavigationTree, TargetRef};
use crate::markup::collapse_whitespace;

/// Parse an NCX `navMap`. `ncx_path` is the container path of the NCX file,
/// used to resolve `content@src`.
pub fn parse_ncx(content: &str, ncx_path: &str) -> Result<NavigationTree, BookError> {
    let mut reader = Reader::from_str(content);

    let mut tree = NavigationTree::default();
    let mut open: Vec<usize> = Vec::new();
    let mut label = String::new();
    let mut in_text = false;
    let mut in_nav_map = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"navMap" => in_nav_map = true,
                b"navPoint" if in_nav_map => {
                    let index = tree.push(open.last().copied(), String::new(), None);
                    open.push(index);
                }
                b"text" if !open.is_empty() => {
                    in_text = true;
                    label.clear();
                }
                b"content" => set_ncx_target(&mut tree, &open, &e, ncx_path),
                _ => {}
            },
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"content" {
                    set_ncx_target(&mut tree, &open, &e, ncx_path);
                }
            }
            Event::Text(e) => {
                if in_text {
                    label.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if in_text && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    label.push_str(&resolved);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"navMap" => in_nav_map = false,
                b"text" if in_text => {
                    in_text = false;
                    if let Some(node) = open.last().and_then(|index| tree.nodes.get_mut(*index))
                        && node.title.is_empty()
                    {
                        node.title = collapse_whitespace(&label);
                    }
                }
                b"navPoint" => {
                    open.pop();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(tree)
}

fn set_ncx_target(
    tree: &mut NavigationTree,
    open: &[usize],
    element: &quick_xml::events::BytesStart<'_>,
    ncx_path: &str,
) {
    let Some(node) = open.last().and_then(|index| tree.nodes.get_mut(*index)) else {
        return;
    };
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == b"src" {
            let src = attr_string(&attr);
            if !src.trim().is_empty() {
                let (item, anchor) = resolve_href(ncx_path, src.trim());
                node.target = Some(TargetRef { item, anchor });
            }
        }
    }
}

/// Parse the `toc` navigation of an EPUB3 nav document. Returns `None` when
/// the document has no usable `nav` list.
pub fn parse_nav_document(markup: &str, nav_path: &str) -> Option<NavigationTree> {
    let html = Html::parse_document(markup);
    let navs: Vec<ElementRef<'_>> = html
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "nav")
        .collect();

    let toc_nav = navs
        .iter()
        .find(|nav| {
            nav.value()
                .attr("epub:type")
                .is_some_and(|kinds| kinds.split_ascii_whitespace().any(|kind| kind == "toc"))
        })
        .or_else(|| navs.first())?;

    let top_list = toc_nav
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "ol" || element.value().name() == "ul")?;

    let mut tree = NavigationTree::default();
    let mut pending: Vec<(ElementRef<'_>, Option<usize>)> = vec![(top_list, None)];

    while let Some((list, parent)) = pending.pop() {
        for item in child_elements(list, &["li"]) {
            let label = child_elements(item, &["a", "span"]).into_iter().next();
            let title = label
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                .unwrap_or_default();
            let target = label
                .and_then(|element| element.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(|href| {
                    let (item, anchor) = resolve_href(nav_path, href);
                    TargetRef { item, anchor }
                });

            let index = tree.push(parent, title, target);
            for nested in child_elements(item, &["ol", "ul"]) {
                pending.push((nested, Some(index)));
            }
        }
    }

    if tree.is_empty() { None } else { Some(tree) }
}

fn child_elements<'a>(element: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| names.contains(&child.value().name()))
        .collect()
}
