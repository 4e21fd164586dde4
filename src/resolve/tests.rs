use std::cell::Cell;

use super::native_toc::resolve_native_toc;
use super::*;
use crate::book::{ContentItem, Document, NavigationTree, TargetRef};
use crate::oracle::{OracleError, TitleOracle};

struct FakeOracle {
    titles: Option<Vec<String>>,
    calls: Cell<usize>,
}

impl FakeOracle {
    fn returning(titles: &[&str]) -> Self {
        Self {
            titles: Some(titles.iter().map(|title| title.to_string()).collect()),
            calls: Cell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            titles: None,
            calls: Cell::new(0),
        }
    }
}

impl TitleOracle for FakeOracle {
    fn propose_titles(&self, _preview: &str) -> Result<Vec<String>, OracleError> {
        self.calls.set(self.calls.get() + 1);
        self.titles
            .clone()
            .ok_or_else(|| OracleError::Malformed("not json".to_string()))
    }
}

const CONFIG: ResolveConfig = ResolveConfig { preview_chars: 30_000 };

fn item(id: &str, body: &str) -> ContentItem {
    ContentItem::from_markup(id, &format!("<html><body>{body}</body></html>"))
}

fn nav(entries: &[(&str, &str, Option<&str>)]) -> NavigationTree {
    let mut tree = NavigationTree::default();
    for (title, item, anchor) in entries {
        tree.push(None, title.to_string(), Some(TargetRef::new(*item, *anchor)));
    }
    tree
}

fn resolved(outcome: &ResolveOutcome) -> (Tier, Vec<(&str, &str, usize)>) {
    match &outcome.resolution {
        Resolution::Resolved { tier, chapters } => (
            *tier,
            chapters
                .iter()
                .map(|chapter| (chapter.title.as_str(), chapter.content.as_str(), chapter.order))
                .collect(),
        ),
        Resolution::Skipped(reason) => panic!("expected resolved, got skipped: {reason}"),
    }
}

fn plain_book(text: &str) -> Document {
    Document {
        items: vec![item("body.xhtml", &format!("<p>{text}</p>"))],
        navigation: None,
    }
}

#[test]
fn anchors_in_one_item_bound_each_other() {
    let document = Document {
        items: vec![item(
            "item1.xhtml",
            r#"<a id="a1"></a><p>Hello world</p><a id="a2"></a>"#,
        )],
        navigation: Some(nav(&[
            ("Ch1", "item1.xhtml", Some("a1")),
            ("Ch2", "item1.xhtml", Some("a2")),
        ])),
    };

    let mut warnings = Vec::new();
    let drafts = resolve_native_toc(&document, &mut warnings);
    assert_eq!(
        drafts,
        vec![ChapterDraft {
            title: "Ch1".to_string(),
            content: "Hello world".to_string(),
        }]
    );
    assert!(warnings.iter().any(|warning| warning.contains("Ch2")));
}

#[test]
fn native_toc_wins_and_never_calls_oracle() {
    let document = Document {
        items: vec![
            item("c1.xhtml", "<h1>One</h1><p>First.</p>"),
            item("c2.xhtml", "<h1>Two</h1><p>Second.</p>"),
        ],
        navigation: Some(nav(&[
            ("One", "c1.xhtml", None),
            ("Two", "c2.xhtml", None),
        ])),
    };
    let oracle = FakeOracle::returning(&["ignored"]);

    let outcome = resolve_chapters(&document, Some(&oracle), &CONFIG);
    let (tier, chapters) = resolved(&outcome);
    assert_eq!(tier, Tier::NativeToc);
    assert_eq!(
        chapters,
        vec![("One", "One First.", 1), ("Two", "Two Second.", 2)]
    );
    assert_eq!(oracle.calls.get(), 0);
}

#[test]
fn nested_navigation_keeps_preorder() {
    let mut tree = NavigationTree::default();
    let part = tree.push(None, "Part".to_string(), Some(TargetRef::new("p.xhtml", None)));
    tree.push(Some(part), "A".to_string(), Some(TargetRef::new("a.xhtml", None)));
    let b = tree.push(Some(part), "B".to_string(), Some(TargetRef::new("b.xhtml", None)));
    tree.push(Some(b), "B.1".to_string(), Some(TargetRef::new("b1.xhtml", None)));
    tree.push(None, "C".to_string(), Some(TargetRef::new("c.xhtml", None)));

    let document = Document {
        items: ["p", "a", "b", "b1", "c"]
            .iter()
            .map(|name| item(&format!("{name}.xhtml"), &format!("<p>text of {name}</p>")))
            .collect(),
        navigation: Some(tree),
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    let (_, chapters) = resolved(&outcome);
    let titles: Vec<&str> = chapters.iter().map(|(title, _, _)| *title).collect();
    assert_eq!(titles, vec!["Part", "A", "B", "B.1", "C"]);
    let orders: Vec<usize> = chapters.iter().map(|(_, _, order)| *order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);
}

#[test]
fn cyclic_navigation_terminates() {
    let mut tree = nav(&[("One", "c1.xhtml", None), ("Two", "c2.xhtml", None)]);
    tree.nodes[1].children.push(0);
    tree.nodes[1].children.push(42);

    let mut warnings = Vec::new();
    let entries = flatten_navigation(&tree, &mut warnings);
    let titles: Vec<&str> = entries.iter().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two"]);
    assert_eq!(warnings.len(), 2);
}

#[test]
fn untargeted_entries_are_skipped_but_children_kept() {
    let mut tree = NavigationTree::default();
    let part = tree.push(None, "Part One".to_string(), None);
    tree.push(Some(part), "Chapter".to_string(), Some(TargetRef::new("c.xhtml", None)));

    let mut warnings = Vec::new();
    let entries = flatten_navigation(&tree, &mut warnings);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Chapter");
    assert!(warnings[0].contains("Part One"));
}

#[test]
fn headings_used_when_navigation_missing() {
    let document = Document {
        items: vec![item(
            "c1.xhtml",
            "<h2>Alpha</h2><p>alpha body</p><h2>Beta</h2><p>beta body</p>",
        )],
        navigation: None,
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    let (tier, chapters) = resolved(&outcome);
    assert_eq!(tier, Tier::Headings);
    assert_eq!(
        chapters,
        vec![("Alpha", "alpha body", 1), ("Beta", "beta body", 2)]
    );
}

#[test]
fn unusable_navigation_falls_through_to_headings() {
    let document = Document {
        items: vec![item("c1.xhtml", "<h1>Start</h1><p>one</p><h1>End</h1><p>two</p>")],
        navigation: Some(nav(&[("Ghost", "missing.xhtml", None)])),
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    let (tier, _) = resolved(&outcome);
    assert_eq!(tier, Tier::Headings);
    assert!(outcome.warnings.iter().any(|warning| warning.contains("missing.xhtml")));
}

#[test]
fn oracle_titles_slice_the_full_text() {
    let document = plain_book("Intro text here Middle text there");
    let oracle = FakeOracle::returning(&["Intro", "Middle"]);

    let outcome = resolve_chapters(&document, Some(&oracle), &CONFIG);
    let (tier, chapters) = resolved(&outcome);
    assert_eq!(tier, Tier::TitleOffsets);
    assert_eq!(
        chapters,
        vec![
            ("Intro", "Intro text here", 1),
            ("Middle", "Middle text there", 2),
        ]
    );
}

#[test]
fn unmatched_oracle_title_is_excluded() {
    let document = plain_book("Intro text here Middle text there End of story");
    let oracle = FakeOracle::returning(&["Intro", "Nowhere", "Middle", "End"]);

    let outcome = resolve_chapters(&document, Some(&oracle), &CONFIG);
    let (_, chapters) = resolved(&outcome);
    let titles: Vec<&str> = chapters.iter().map(|(title, _, _)| *title).collect();
    assert_eq!(titles, vec!["Intro", "Middle", "End"]);
    assert!(outcome.warnings.iter().any(|warning| warning.contains("Nowhere")));
}

#[test]
fn duplicate_spans_keep_first_title() {
    let document = Document {
        items: vec![
            item("c1.xhtml", "<p>Shared text</p>"),
            item("c2.xhtml", "<p>Other text</p>"),
        ],
        navigation: Some(nav(&[
            ("Part I", "c1.xhtml", None),
            ("Chapter 1", "c1.xhtml", None),
            ("Chapter 2", "c2.xhtml", None),
        ])),
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    let (_, chapters) = resolved(&outcome);
    assert_eq!(
        chapters,
        vec![("Part I", "Shared text", 1), ("Chapter 2", "Other text", 2)]
    );
}

#[test]
fn single_chapter_is_skipped() {
    let document = Document {
        items: vec![item("c1.xhtml", "<h1>Lonely</h1><p>only chapter</p>")],
        navigation: None,
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    assert!(matches!(
        outcome.resolution,
        Resolution::Skipped(SkipReason::InsufficientChapters { count: 1 })
    ));
}

#[test]
fn dedup_runs_before_minimum_guard() {
    let document = Document {
        items: vec![item("c1.xhtml", "<p>Same</p>")],
        navigation: Some(nav(&[("A", "c1.xhtml", None), ("B", "c1.xhtml", None)])),
    };

    let outcome = resolve_chapters(&document, None, &CONFIG);
    assert!(matches!(
        outcome.resolution,
        Resolution::Skipped(SkipReason::InsufficientChapters { count: 1 })
    ));
}

#[test]
fn tier_three_without_oracle_is_missing_credential() {
    let outcome = resolve_chapters(&plain_book("no structure at all"), None, &CONFIG);
    assert!(matches!(
        outcome.resolution,
        Resolution::Skipped(SkipReason::MissingCredential)
    ));
}

#[test]
fn oracle_failure_skips_book() {
    let oracle = FakeOracle::failing();
    let outcome = resolve_chapters(&plain_book("no structure"), Some(&oracle), &CONFIG);
    assert!(matches!(
        outcome.resolution,
        Resolution::Skipped(SkipReason::Oracle(OracleError::Malformed(_)))
    ));
    assert_eq!(oracle.calls.get(), 1);
}

#[test]
fn oracle_titles_matching_nothing_yield_no_chapters() {
    let oracle = FakeOracle::returning(&["Xylophone"]);
    let outcome = resolve_chapters(&plain_book("plain words"), Some(&oracle), &CONFIG);
    assert!(matches!(
        outcome.resolution,
        Resolution::Skipped(SkipReason::NoChapters)
    ));
}

#[test]
fn preview_is_limited_to_budget() {
    struct RecordingOracle(Cell<usize>);
    impl TitleOracle for RecordingOracle {
        fn propose_titles(&self, preview: &str) -> Result<Vec<String>, OracleError> {
            self.0.set(preview.chars().count());
            Ok(Vec::new())
        }
    }

    let oracle = RecordingOracle(Cell::new(0));
    let config = ResolveConfig { preview_chars: 5 };
    resolve_chapters(&plain_book("abcdefghij"), Some(&oracle), &config);
    assert_eq!(oracle.0.get(), 5);
}

#[test]
fn resolving_twice_is_identical() {
    let document = plain_book("Intro text here Middle text there");
    let oracle = FakeOracle::returning(&["Intro", "Middle"]);

    let first = resolve_chapters(&document, Some(&oracle), &CONFIG);
    let second = resolve_chapters(&document, Some(&oracle), &CONFIG);
    assert_eq!(resolved(&first), resolved(&second));
    assert_eq!(first.warnings, second.warnings);
}
