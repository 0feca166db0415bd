//! Embeddable summary of a package at its latest version.

use crate::cache::{TtlClass, package_widget_key};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::resolve::{PackageWidget, normalize_name};
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PackageWidgetRequest {
    /// Package name, e.g. "dplyr" (a trailing ".html" is ignored)
    pub package: String,
}

pub async fn handle_package_widget(engine: &Engine, request: PackageWidgetRequest) -> Result<Option<PackageWidget>> {
    let package = normalize_name(request.package.trim());
    if package.is_empty() {
        return Err(EngineError::malformed("package is required"));
    }

    super::found(
        engine
            .cache()
            .get_or_compute(&package_widget_key(package), TtlClass::Daily, || {
                engine.packages().widget(package, engine.base_url())
            })
            .await,
    )
}
