use super::*;

const CSV_HEADER: [&str; 2] = ["chapter", "content"];

/// All fields quoted, one record per chapter.
pub(super) fn render_chapters_csv(chapters: &[Chapter]) -> String {
    let mut lines = Vec::with_capacity(chapters.len() + 1);
    lines.push(render_record(&CSV_HEADER));
    for chapter in chapters {
        lines.push(render_record(&[chapter.title.as_str(), chapter.content.as_str()]));
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn render_record(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| quote_csv_field(field))
        .collect::<Vec<String>>()
        .join(",")
}

fn quote_csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub(super) fn csv_path_for(output_dir: &Path, book: &Path) -> PathBuf {
    output_dir.join(format!("{}.csv", file_stem_string(book)))
}

pub(super) fn write_chapters_csv(path: &Path, chapters: &[Chapter]) -> Result<()> {
    write_atomic(path, render_chapters_csv(chapters).as_bytes())
        .with_context(|| format!("failed to write chapters csv: {}", path.display()))
}
