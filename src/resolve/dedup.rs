use std::collections::HashSet;

use super::ChapterDraft;

/// Keeps the first chapter for every distinct content string. Returns the
/// surviving chapters and the number dropped.
pub fn dedup_chapters(chapters: Vec<ChapterDraft>) -> (Vec<ChapterDraft>, usize) {
    let before = chapters.len();
    let mut seen = HashSet::new();
    let kept: Vec<ChapterDraft> = chapters
        .into_iter()
        .filter(|chapter| seen.insert(chapter.content.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> ChapterDraft {
        ChapterDraft {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn first_title_wins_for_shared_content() {
        let (kept, dropped) = dedup_chapters(vec![
            draft("Part 1", "same"),
            draft("Chapter 1", "same"),
            draft("Chapter 2", "other"),
            draft("Chapter 2b", "same"),
        ]);
        assert_eq!(kept, vec![draft("Part 1", "same"), draft("Chapter 2", "other")]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn near_duplicates_are_kept() {
        let (kept, dropped) = dedup_chapters(vec![draft("A", "text"), draft("B", "text ")]);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }
}
