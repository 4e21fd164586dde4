use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BookReport {
    pub filename: String,
    pub sha256: String,
    /// `resolved`, `skipped` or `failed`.
    pub status: String,
    pub tier: Option<String>,
    pub skip_reason: Option<String>,
    pub chapter_count: usize,
    pub output_path: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitCounts {
    pub book_count: usize,
    pub resolved_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub chapters_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitPaths {
    pub input: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub dry_run: bool,
    pub credential_check: String,
    pub preview_chars: usize,
    pub paths: SplitPaths,
    pub counts: SplitCounts,
    pub books: Vec<BookReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocRow {
    pub order: usize,
    pub title: String,
    pub item: String,
    pub manifest_id: Option<String>,
    pub anchor: Option<String>,
}
