//! Resolution of topic and package pages, plus the pieces their widgets use.

pub mod anchors;
pub mod links;
pub mod package;
pub mod topic;

pub use anchors::{Anchor, Presence};
pub use links::{HrefRewriter, KeepLinks, LinkRewriter};
pub use package::{AssetCatalog, NoAssets, PackageResolver, PackageWidget};
pub use topic::{TopicResolver, TopicWidget};

/// Drops a trailing `.html` left over from page-style request paths.
pub fn normalize_name(name: &str) -> &str {
    name.strip_suffix(".html").unwrap_or(name)
}
