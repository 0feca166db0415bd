//! Rewriting of relative hyperlinks embedded in topic text.

use crate::model::Topic;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

/// An `href` attribute inside an `<a>` start tag. Group 1 is everything up
/// to the opening quote.
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<a\s[^>]*?\bhref\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("href pattern is valid")
});

/// Pure transform of a topic's links.
pub trait LinkRewriter: Send + Sync {
    fn rewrite(&self, topic: Topic) -> Topic;
}

/// Leaves topics untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepLinks;

impl LinkRewriter for KeepLinks {
    fn rewrite(&self, topic: Topic) -> Topic {
        topic
    }
}

/// Resolves relative `href` targets against the site base URL.
///
/// Absolute URLs and fragment-only links are left as they are.
#[derive(Debug, Clone)]
pub struct HrefRewriter {
    base: Url,
}

impl HrefRewriter {
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    fn absolutize<'a>(&self, target: &'a str) -> Cow<'a, str> {
        if target.is_empty() || target.starts_with('#') || Url::parse(target).is_ok() {
            return Cow::Borrowed(target);
        }
        match self.base.join(target) {
            Ok(url) => Cow::Owned(url.into()),
            Err(_) => Cow::Borrowed(target),
        }
    }

    /// Rewrites the `href` of every anchor tag in an HTML fragment. Text
    /// outside anchor tags, such as R code in examples, is left alone.
    pub fn rewrite_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        HREF.replace_all(html, |caps: &Captures<'_>| {
            let (target, quote) = match (caps.get(2), caps.get(3)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };
            format!("{}{quote}{}{quote}", &caps[1], self.absolutize(target))
        })
    }
}

impl LinkRewriter for HrefRewriter {
    fn rewrite(&self, mut topic: Topic) -> Topic {
        for field in topic.text_fields_mut() {
            if let Cow::Owned(rewritten) = self.rewrite_html(field) {
                *field = rewritten;
            }
        }
        topic
    }
}
