//! Section anchors listed at the bottom of documentation widgets.

use crate::model::Topic;
use serde::{Deserialize, Serialize};

/// Value kinds of an optional section, for the "is there anything to show"
/// check shared by text and list sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Absent,
    BlankText,
    EmptyCollection,
    NonEmpty,
}

impl Presence {
    pub fn of_text(value: Option<&str>) -> Self {
        match value {
            None => Self::Absent,
            Some(text) if text.trim().is_empty() => Self::BlankText,
            Some(_) => Self::NonEmpty,
        }
    }

    pub const fn of_items<T>(items: &[T]) -> Self {
        if items.is_empty() {
            Self::EmptyCollection
        } else {
            Self::NonEmpty
        }
    }

    pub const fn is_present(self) -> bool {
        matches!(self, Self::NonEmpty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub title: String,
    pub anchor: String,
}

impl Anchor {
    fn new(title: &str, anchor: &str) -> Self {
        Self {
            title: title.to_string(),
            anchor: anchor.to_string(),
        }
    }
}

/// Anchors for each present entry, keeping the given order.
pub fn collect_anchors<'a>(entries: impl IntoIterator<Item = (Presence, &'a str, &'a str)>) -> Vec<Anchor> {
    entries
        .into_iter()
        .filter(|(presence, _, _)| presence.is_present())
        .map(|(_, title, anchor)| Anchor::new(title, anchor))
        .collect()
}

/// Topic sections in display order.
pub fn topic_anchors(topic: &Topic) -> Vec<Anchor> {
    let text = |value: &Option<String>| Presence::of_text(value.as_deref());
    collect_anchors([
        (Presence::of_items(&topic.keywords), "keywords", "kywrds"),
        (text(&topic.usage), "usage", "usg"),
        (Presence::of_items(&topic.arguments), "arguments", "argmnts"),
        (text(&topic.details), "details", "dtls"),
        (text(&topic.value), "value", "vl"),
        (text(&topic.note), "note", "nt"),
        (Presence::of_items(&topic.sections), "sections", "sctns"),
        (text(&topic.references), "references", "rfrncs"),
        (text(&topic.see_also), "see also", "sls"),
        (text(&topic.examples), "examples", "exmpls"),
    ])
}

/// Package sections in display order. Downloads and details always show.
pub fn package_anchors<T, V>(readme: Option<&str>, topics: &[T], vignettes: &[V]) -> Vec<Anchor> {
    collect_anchors([
        (Presence::of_text(readme), "readme", "readme"),
        (Presence::of_items(topics), "topics", "functions"),
        (Presence::of_items(vignettes), "vignettes", "vignettes"),
        (Presence::NonEmpty, "downloads", "downloads"),
        (Presence::NonEmpty, "details", "details"),
    ])
}
