//! Fixture builders shared by unit tests.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Zip the given `(path, contents)` entries, `mimetype` first.
pub fn build_epub(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("mimetype", options).expect("start mimetype");
    zip.write_all(b"application/epub+zip").expect("write mimetype");

    for (path, contents) in entries {
        zip.start_file(*path, options).expect("start entry");
        zip.write_all(contents.as_bytes()).expect("write entry");
    }

    zip.finish().expect("finish zip").into_inner()
}

pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>t</title></head>
<body>{body}</body>
</html>"#
    )
}

/// Package document with one spine item per `(id, href)` and an NCX entry
/// when `with_ncx` is set.
pub fn package_opf(title: &str, items: &[(&str, &str)], with_ncx: bool) -> String {
    let mut manifest = String::new();
    let mut spine = String::new();
    for (id, href) in items {
        manifest.push_str(&format!(
            r#"    <item id="{id}" href="{href}" media-type="application/xhtml+xml"/>
"#
        ));
        spine.push_str(&format!(
            r#"    <itemref idref="{id}"/>
"#
        ));
    }
    if with_ncx {
        manifest.push_str(
            r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
"#,
        );
    }
    let toc_attr = if with_ncx { r#" toc="ncx""# } else { "" };

    format!(
        r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine{toc_attr}>
{spine}  </spine>
</package>"#
    )
}

pub fn ncx(points: &[(&str, &str)]) -> String {
    let mut nav_points = String::new();
    for (order, (label, src)) in points.iter().enumerate() {
        nav_points.push_str(&format!(
            r#"    <navPoint id="np{n}" playOrder="{n}">
      <navLabel><text>{label}</text></navLabel>
      <content src="{src}"/>
    </navPoint>
"#,
            n = order + 1
        ));
    }
    format!(
        r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>Book</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>"#
    )
}
