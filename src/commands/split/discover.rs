use super::*;

/// Books named by `input`: the file itself, or the `.epub` files directly
/// inside a directory, sorted. Unusable input yields no books.
pub(super) fn discover_books(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut books = Vec::new();
        let entries = std::fs::read_dir(input)
            .with_context(|| format!("failed to read {}", input.display()))?;

        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in {}", input.display()))?;
            let path = entry.path();

            if !entry
                .file_type()
                .with_context(|| format!("failed to inspect file type: {}", path.display()))?
                .is_file()
            {
                continue;
            }
            if has_epub_extension(&path) {
                books.push(path);
            }
        }

        books.sort();
        if books.is_empty() {
            warn!(input = %input.display(), "no EPUB files found in folder");
        }
        return Ok(books);
    }

    if input.is_file() && has_epub_extension(input) {
        return Ok(vec![input.to_path_buf()]);
    }

    warn!(input = %input.display(), "input is neither an EPUB file nor a folder");
    Ok(Vec::new())
}

fn has_epub_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("epub"))
        .unwrap_or(false)
}
