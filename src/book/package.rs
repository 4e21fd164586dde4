//! container.xml and OPF package parsing.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::BookError;
use super::xml::{attr_string, local_name, resolve_entity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: String,
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn is_markup(&self) -> bool {
        matches!(
            self.media_type.as_str(),
            "application/xhtml+xml" | "text/html"
        )
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|value| value == property)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackageDocument {
    pub title: Option<String>,
    /// manifest id -> item
    pub manifest: HashMap<String, ManifestItem>,
    /// manifest ids in declaration order
    pub manifest_order: Vec<String>,
    pub spine: Vec<String>,
    pub ncx_id: Option<String>,
}

impl PackageDocument {
    pub fn nav_item(&self) -> Option<(&str, &ManifestItem)> {
        self.manifest_order.iter().find_map(|id| {
            self.manifest
                .get(id)
                .filter(|item| item.has_property("nav"))
                .map(|item| (id.as_str(), item))
        })
    }

    pub fn ncx_item(&self) -> Option<&ManifestItem> {
        if let Some(item) = self.ncx_id.as_ref().and_then(|id| self.manifest.get(id)) {
            return Some(item);
        }
        self.manifest_order
            .iter()
            .filter_map(|id| self.manifest.get(id))
            .find(|item| item.media_type == "application/x-dtbncx+xml")
    }
}

/// Path of the first rootfile declared in META-INF/container.xml.
pub fn parse_container_xml(content: &str) -> Result<String, BookError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if local_name(e.name().as_ref()) == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        let path = attr_string(&attr);
                        if !path.is_empty() {
                            return Ok(path);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(BookError::InvalidEpub(
        "no rootfile found in container.xml".to_string(),
    ))
}

pub fn parse_package(content: &str) -> Result<PackageDocument, BookError> {
    let mut reader = Reader::from_str(content);

    let mut package = PackageDocument::default();
    let mut in_metadata = false;
    let mut in_title = false;
    let mut title_text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"metadata" => in_metadata = true,
                b"title" if in_metadata && package.title.is_none() => {
                    in_title = true;
                    title_text.clear();
                }
                b"spine" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"toc" {
                            package.ncx_id = Some(attr_string(&attr));
                        }
                    }
                }
                b"item" => push_manifest_item(&mut package, &e),
                b"itemref" => push_spine_ref(&mut package, &e),
                _ => {}
            },
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"item" => push_manifest_item(&mut package, &e),
                b"itemref" => push_spine_ref(&mut package, &e),
                _ => {}
            },
            Event::Text(e) => {
                if in_title {
                    title_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if in_title && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    title_text.push_str(&resolved);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"metadata" => in_metadata = false,
                b"title" if in_title => {
                    in_title = false;
                    let title = title_text.trim();
                    if !title.is_empty() {
                        package.title = Some(title.to_string());
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if package.spine.is_empty() {
        return Err(BookError::InvalidEpub("package has an empty spine".to_string()));
    }

    Ok(package)
}

fn push_manifest_item(package: &mut PackageDocument, element: &quick_xml::events::BytesStart<'_>) {
    let mut id = String::new();
    let mut item = ManifestItem {
        href: String::new(),
        media_type: String::new(),
        properties: Vec::new(),
    };

    for attr in element.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = attr_string(&attr),
            b"href" => item.href = attr_string(&attr),
            b"media-type" => item.media_type = attr_string(&attr).to_ascii_lowercase(),
            b"properties" => {
                item.properties = attr_string(&attr)
                    .split_ascii_whitespace()
                    .map(ToOwned::to_owned)
                    .collect();
            }
            _ => {}
        }
    }

    if id.is_empty() || item.href.is_empty() {
        return;
    }
    if package.manifest.insert(id.clone(), item).is_none() {
        package.manifest_order.push(id);
    }
}

fn push_spine_ref(package: &mut PackageDocument, element: &quick_xml::events::BytesStart<'_>) {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == b"idref" {
            let idref = attr_string(&attr);
            if !idref.is_empty() {
                package.spine.push(idref);
            }
        }
    }
}
