//! Ordering of package version labels.
//!
//! Version labels are opaque strings ("1.2.3", "1.2-3", "0.9.1.20230101",
//! "2.0.rc1"). A label is split into segments at every non-alphanumeric
//! character and at every digit/letter boundary. Segments compare pairwise:
//!
//! - numeric against numeric by integer value (digit strings, never parsed
//!   into a fixed-width or floating type, so build numbers of any length work)
//! - text against text lexicographically
//! - numeric sorts above text, so "1.0" > "1.0.rc"
//!
//! The shorter label is padded with zero segments, which makes "1.0" and
//! "1.0.0" compare equal. Comparison is a total preorder over labels.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Digits with leading zeros removed ("" is zero).
    Number(&'a str),
    Text(&'a str),
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const ZERO: Segment<'static> = Segment::Number("");

fn segments(label: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let bytes = label.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let first = bytes[start];
        if !first.is_ascii_alphanumeric() {
            start += 1;
            continue;
        }

        let numeric = first.is_ascii_digit();
        let end = bytes[start..]
            .iter()
            .position(|b| !b.is_ascii_alphanumeric() || b.is_ascii_digit() != numeric)
            .map_or(bytes.len(), |offset| start + offset);

        let run = &label[start..end];
        out.push(if numeric {
            Segment::Number(run.trim_start_matches('0'))
        } else {
            Segment::Text(run)
        });
        start = end;
    }

    out
}

/// Compare two version labels.
///
/// Ties (`Ordering::Equal`) are legal; callers that sort with a stable sort
/// keep the first-seen element among equals.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let len = left.len().max(right.len());

    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(ZERO);
            let r = right.get(i).copied().unwrap_or(ZERO);
            l.cmp(&r)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable descending sort by the version label returned from `label`.
pub fn sort_descending_by<T>(items: &mut [T], label: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_versions(label(b), label(a)));
}

/// The item with the highest version label (first-seen wins ties).
pub fn latest_by<T>(items: Vec<T>, label: impl Fn(&T) -> &str) -> Option<T> {
    let mut items = items;
    sort_descending_by(&mut items, label);
    items.into_iter().next()
}
