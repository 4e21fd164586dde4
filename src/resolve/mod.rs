//! Chapter boundary resolution: navigation, headings, then oracle titles.

mod anchor_span;
mod dedup;
mod heading_span;
mod native_toc;
mod normalize;
mod pipeline;
#[cfg(test)]
mod tests;
mod title_offsets;

pub use native_toc::flatten_navigation;
pub use pipeline::{Resolution, ResolveConfig, ResolveOutcome, SkipReason, resolve_chapters};

/// A chapter as produced by one tier, before dedup and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub content: String,
    /// 1-based position in the emitted list.
    pub order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    NativeToc,
    Headings,
    TitleOffsets,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NativeToc => "native_toc",
            Self::Headings => "headings",
            Self::TitleOffsets => "title_offsets",
        }
    }
}
