use thiserror::Error;
use tracing::{debug, info};

use super::dedup::dedup_chapters;
use super::heading_span::resolve_headings;
use super::native_toc::resolve_native_toc;
use super::title_offsets::{book_full_text, preview, resolve_title_offsets};
use super::{Chapter, ChapterDraft, Tier};
use crate::book::Document;
use crate::oracle::{OracleError, TitleOracle};

pub const MIN_CHAPTERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Leading characters of the book text handed to the oracle.
    pub preview_chars: usize,
}

#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("no oracle credential configured")]
    MissingCredential,

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("no tier produced chapters")]
    NoChapters,

    #[error("only {count} chapter(s) extracted")]
    InsufficientChapters { count: usize },
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Oracle(_) => "oracle_failure",
            Self::NoChapters => "no_chapters",
            Self::InsufficientChapters { .. } => "insufficient_chapters",
        }
    }
}

#[derive(Debug)]
pub enum Resolution {
    Resolved { tier: Tier, chapters: Vec<Chapter> },
    Skipped(SkipReason),
}

#[derive(Debug)]
pub struct ResolveOutcome {
    pub resolution: Resolution,
    pub warnings: Vec<String>,
}

/// Runs the tiers in order, first non-empty result wins, then dedup and the
/// minimum-count guard. `oracle` is `None` when no credential is configured;
/// that only matters once tier 3 is reached.
pub fn resolve_chapters(
    document: &Document,
    oracle: Option<&dyn TitleOracle>,
    config: &ResolveConfig,
) -> ResolveOutcome {
    let mut warnings = Vec::new();
    let resolution = match run_tiers(document, oracle, config, &mut warnings) {
        Ok((tier, drafts)) => finish(tier, drafts),
        Err(reason) => Resolution::Skipped(reason),
    };
    ResolveOutcome {
        resolution,
        warnings,
    }
}

fn run_tiers(
    document: &Document,
    oracle: Option<&dyn TitleOracle>,
    config: &ResolveConfig,
    warnings: &mut Vec<String>,
) -> Result<(Tier, Vec<ChapterDraft>), SkipReason> {
    let drafts = resolve_native_toc(document, warnings);
    if !drafts.is_empty() {
        return Ok((Tier::NativeToc, drafts));
    }
    debug!("native toc produced no chapters");

    let drafts = resolve_headings(document, warnings);
    if !drafts.is_empty() {
        return Ok((Tier::Headings, drafts));
    }
    debug!("heading detection produced no chapters");

    let oracle = oracle.ok_or(SkipReason::MissingCredential)?;
    let full_text = book_full_text(document);
    let excerpt = preview(&full_text, config.preview_chars);
    let titles = oracle.propose_titles(excerpt)?;
    info!(titles = titles.len(), "oracle proposed titles");

    let before = warnings.len();
    let drafts = resolve_title_offsets(&full_text, &titles, warnings);
    let unmatched = warnings.len() - before;
    if unmatched > 0 {
        warnings.push(format!("{unmatched} oracle title(s) unmatched"));
    }
    if drafts.is_empty() {
        return Err(SkipReason::NoChapters);
    }
    Ok((Tier::TitleOffsets, drafts))
}

fn finish(tier: Tier, drafts: Vec<ChapterDraft>) -> Resolution {
    let (drafts, dropped) = dedup_chapters(drafts);
    if dropped > 0 {
        info!(dropped, "removed chapters with duplicate content");
    }
    if drafts.len() < MIN_CHAPTERS {
        return Resolution::Skipped(SkipReason::InsufficientChapters {
            count: drafts.len(),
        });
    }

    let chapters = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| Chapter {
            title: draft.title,
            content: draft.content,
            order: index + 1,
        })
        .collect();
    Resolution::Resolved { tier, chapters }
}
