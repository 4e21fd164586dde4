use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::book::{Document, load_book};
use crate::cli::TocArgs;
use crate::model::TocRow;
use crate::resolve::flatten_navigation;

#[derive(Debug, Serialize)]
struct TocResponse {
    book: String,
    title: Option<String>,
    entries: Vec<TocRow>,
    warnings: Vec<String>,
}

pub fn run(args: TocArgs) -> Result<()> {
    let loaded = load_book(&args.book)
        .with_context(|| format!("failed to load {}", args.book.display()))?;

    let mut warnings = loaded.warnings;
    let entries = toc_rows(&loaded.document, &mut warnings);
    for warning in &warnings {
        warn!(warning = %warning, "navigation warning");
    }
    info!(book = %args.book.display(), entries = entries.len(), "navigation flattened");

    let response = TocResponse {
        book: args.book.display().to_string(),
        title: loaded.title,
        entries,
        warnings,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize toc json output")?;
        writeln!(output)?;
    } else {
        write_text(&mut output, &response)?;
    }
    output.flush()?;
    Ok(())
}

pub(crate) fn toc_rows(document: &Document, warnings: &mut Vec<String>) -> Vec<TocRow> {
    let Some(tree) = document.navigation.as_ref() else {
        return Vec::new();
    };

    flatten_navigation(tree, warnings)
        .into_iter()
        .enumerate()
        .map(|(index, entry)| TocRow {
            order: index + 1,
            manifest_id: document
                .item(&entry.item)
                .map(|item| item.manifest_id.clone()),
            title: entry.title,
            item: entry.item,
            anchor: entry.anchor,
        })
        .collect()
}

fn write_text(output: &mut impl Write, response: &TocResponse) -> Result<()> {
    writeln!(
        output,
        "Book: {} ({})",
        response.title.as_deref().unwrap_or("untitled"),
        response.book
    )?;
    writeln!(output, "Entries: {}", response.entries.len())?;

    for row in &response.entries {
        let target = match &row.anchor {
            Some(anchor) => format!("{}#{anchor}", row.item),
            None => row.item.clone(),
        };
        let manifest_id = row.manifest_id.as_deref().unwrap_or("(missing)");
        writeln!(output, "{}.\t{}\t{target}\t{manifest_id}", row.order, row.title)?;
    }
    Ok(())
}
