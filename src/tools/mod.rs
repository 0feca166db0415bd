pub mod full_search;
pub mod keyword_search;
pub mod package_widget;
pub mod quick_search;
pub mod topic_widget;

pub use full_search::*;
pub use keyword_search::*;
pub use package_widget::*;
pub use quick_search::*;
pub use topic_widget::*;

use crate::error::{EngineError, Result};
use serde::Serialize;

/// Serializes a tool payload.
pub fn to_json<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| EngineError::malformed(format!("unserializable payload: {}", e)))
}

/// Serializes a widget payload; absence renders as `{}`.
pub fn widget_json<T: Serialize>(widget: Option<&T>) -> Result<String> {
    match widget {
        Some(widget) => to_json(widget),
        None => Ok("{}".to_string()),
    }
}

/// Turns a cacheable NotFound into `None`; other errors pass through.
pub(crate) fn found<T>(outcome: Result<T>) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
