//! Site paths for packages, versions and topics.

use std::borrow::Cow;

/// Path of a package page.
pub const PACKAGE_PATH: &str = "/packages/:name";

/// Path of a package version page.
pub const VERSION_PATH: &str = "/packages/:name/versions/:version";

/// Path of a topic page within a package version.
pub const TOPIC_PATH: &str = "/packages/:name/versions/:version/topics/:topic";

/// A path pattern with `:placeholder` segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriTemplate(&'static str);

impl UriTemplate {
    pub const PACKAGE: Self = Self(PACKAGE_PATH);
    pub const VERSION: Self = Self(VERSION_PATH);
    pub const TOPIC: Self = Self(TOPIC_PATH);

    /// Substitutes each `(placeholder, value)` pair, percent-encoding values.
    ///
    /// Placeholders must be whole path segments; unknown ones stay untouched.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        self.0
            .split('/')
            .map(|segment| {
                segment
                    .strip_prefix(':')
                    .and_then(|key| values.iter().find(|(k, _)| *k == key))
                    .map_or(Cow::Borrowed(segment), |(_, value)| urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

pub fn package_uri(name: &str) -> String {
    UriTemplate::PACKAGE.render(&[("name", name)])
}

pub fn version_uri(name: &str, version: &str) -> String {
    UriTemplate::VERSION.render(&[("name", name), ("version", version)])
}

pub fn topic_uri(name: &str, version: &str, topic: &str) -> String {
    UriTemplate::TOPIC.render(&[("name", name), ("version", version), ("topic", topic)])
}

/// Joins the site base URL and a site path.
pub fn absolute(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
