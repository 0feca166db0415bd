//! Tool input schemas.

use rmcp::model::JsonObject;
use rmcp::schemars::{JsonSchema, generate::SchemaSettings, transform::AddNullable};
use std::sync::Arc;

/// Draft-07 schema for a tool request with every subschema inlined, so
/// clients render optional fields and enums without following `$ref`s.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(AddNullable::default())];
    settings.inline_subschemas = true;

    let schema = settings.into_generator().into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        // A root schema always serializes to an object
        _ => JsonObject::new(),
    };
    Arc::new(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FullSearchRequest, TopicWidgetRequest};
    use assert2::{check, let_assert};

    #[test]
    fn test_request_schema_lists_required_fields() {
        let schema = inline_schema_for_type::<TopicWidgetRequest>();
        let_assert!(Some(required) = schema.get("required").and_then(|r| r.as_array()));
        check!(required.len() == 2);
        check!(schema["properties"]["topic"]["type"] == "string");
    }

    #[test]
    fn test_optional_path_is_not_required() {
        let schema = inline_schema_for_type::<FullSearchRequest>();
        let_assert!(Some(required) = schema.get("required").and_then(|r| r.as_array()));
        check!(required.iter().all(|field| *field != "path"));
        check!(!serde_json::to_string(&*schema).unwrap().contains("$ref"));
    }
}
