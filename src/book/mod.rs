//! EPUB loading: container, package, navigation and content documents.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use thiserror::Error;
use zip::ZipArchive;

use crate::markup::MarkupDom;

mod href;
mod navigation;
mod package;
mod xml;

pub use href::resolve_href;
pub use navigation::{parse_nav_document, parse_ncx};
pub use package::{ManifestItem, PackageDocument, parse_container_xml, parse_package};

#[derive(Error, Debug)]
pub enum BookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),
}

/// Addressable location inside the book: a content item and optionally an
/// element id within it. A missing anchor means the whole item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub item: String,
    pub anchor: Option<String>,
}

impl TargetRef {
    pub fn new(item: impl Into<String>, anchor: Option<&str>) -> Self {
        Self {
            item: item.into(),
            anchor: anchor.map(ToOwned::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    pub title: String,
    pub target: Option<TargetRef>,
    pub children: Vec<usize>,
}

/// Navigation entries stored in an arena. `roots` and `children` hold
/// indices into `nodes`; nothing guarantees they are acyclic or in range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTree {
    pub nodes: Vec<NavNode>,
    pub roots: Vec<usize>,
}

impl NavigationTree {
    pub fn push(&mut self, parent: Option<usize>, title: String, target: Option<TargetRef>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(NavNode {
            title,
            target,
            children: Vec::new(),
        });
        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent) => parent.children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Container path of the item; navigation targets refer to it.
    pub id: String,
    pub manifest_id: String,
    pub in_spine: bool,
    pub dom: MarkupDom,
}

impl ContentItem {
    pub fn from_markup(id: impl Into<String>, markup: &str) -> Self {
        let id = id.into();
        Self {
            manifest_id: id.clone(),
            id,
            in_spine: true,
            dom: MarkupDom::parse(markup),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Spine items in reading order, followed by markup items outside the spine.
    pub items: Vec<ContentItem>,
    pub navigation: Option<NavigationTree>,
}

impl Document {
    pub fn item(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn spine_items(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|item| item.in_spine)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedBook {
    pub title: Option<String>,
    pub document: Document,
    pub warnings: Vec<String>,
}

pub fn load_book(path: &Path) -> Result<LoadedBook, BookError> {
    let file = File::open(path)?;
    load_book_from_reader(BufReader::new(file))
}

pub fn load_book_from_reader<R: Read + Seek>(reader: R) -> Result<LoadedBook, BookError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut warnings = Vec::new();

    let container = read_entry_string(&mut archive, "META-INF/container.xml", &mut warnings)?;
    let package_path = parse_container_xml(&container)?;
    let package_xml = read_entry_string(&mut archive, &package_path, &mut warnings)?;
    let package = parse_package(&package_xml)?;

    let mut items = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for idref in &package.spine {
        let Some(entry) = package.manifest.get(idref) else {
            warnings.push(format!("spine references unknown manifest id '{idref}'"));
            continue;
        };
        if !entry.is_markup() || !seen.insert(idref.clone()) {
            continue;
        }
        if let Some(item) = load_item(&mut archive, &package_path, idref, entry, true, &mut warnings) {
            items.push(item);
        }
    }

    for id in &package.manifest_order {
        let Some(entry) = package.manifest.get(id) else {
            continue;
        };
        if !entry.is_markup() || !seen.insert(id.clone()) {
            continue;
        }
        if let Some(item) = load_item(&mut archive, &package_path, id, entry, false, &mut warnings) {
            items.push(item);
        }
    }

    let navigation = load_navigation(&mut archive, &package_path, &package, &mut warnings);

    Ok(LoadedBook {
        title: package.title.clone(),
        document: Document { items, navigation },
        warnings,
    })
}

fn load_item<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    package_path: &str,
    manifest_id: &str,
    entry: &ManifestItem,
    in_spine: bool,
    warnings: &mut Vec<String>,
) -> Option<ContentItem> {
    let (path, _) = resolve_href(package_path, &entry.href);
    match read_entry_string(archive, &path, warnings) {
        Ok(markup) => Some(ContentItem {
            manifest_id: manifest_id.to_string(),
            in_spine,
            ..ContentItem::from_markup(path, &markup)
        }),
        Err(err) => {
            warnings.push(format!("content item '{path}' unreadable: {err}"));
            None
        }
    }
}

/// Prefer the EPUB3 nav document, fall back to the NCX. Problems here are
/// never fatal for the book.
fn load_navigation<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    package_path: &str,
    package: &PackageDocument,
    warnings: &mut Vec<String>,
) -> Option<NavigationTree> {
    if let Some((_, nav_item)) = package.nav_item() {
        let (nav_path, _) = resolve_href(package_path, &nav_item.href);
        match read_entry_string(archive, &nav_path, warnings) {
            Ok(markup) => {
                if let Some(tree) = parse_nav_document(&markup, &nav_path) {
                    return Some(tree);
                }
                warnings.push(format!("navigation document '{nav_path}' has no toc list"));
            }
            Err(err) => warnings.push(format!("navigation document '{nav_path}' unreadable: {err}")),
        }
    }

    if let Some(ncx_item) = package.ncx_item() {
        let (ncx_path, _) = resolve_href(package_path, &ncx_item.href);
        let parsed = read_entry_string(archive, &ncx_path, warnings)
            .and_then(|content| parse_ncx(&content, &ncx_path));
        match parsed {
            Ok(tree) if !tree.is_empty() => return Some(tree),
            Ok(_) => warnings.push(format!("NCX '{ncx_path}' has no navPoints")),
            Err(err) => warnings.push(format!("NCX '{ncx_path}' malformed: {err}")),
        }
    }

    warnings.push("no usable navigation metadata".to_string());
    None
}

fn read_entry_string<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    warnings: &mut Vec<String>,
) -> Result<String, BookError> {
    let mut entry = archive.by_name(name)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;

    let bytes = xml::strip_bom(&bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            warnings.push(format!("'{name}' is not valid UTF-8; decoded lossily"));
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
