//! dbt manifest types.
//!
//! A `manifest.json` is large and deeply nested; only `metadata` and `nodes`
//! are read here. Node records are kept as raw JSON and projected into a
//! [`ModelNode`] value by value, so field shapes are never checked.

use crate::error::ManifestError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The `resource_type` value carried by model nodes.
pub const MODEL_RESOURCE_TYPE: &str = "model";

/// A parsed dbt manifest (only the fields this crate reads).
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Free-form metadata (`dbt_version`, `project_id`, ...). Any JSON value.
    #[serde(default = "empty_object", deserialize_with = "null_as_empty_object")]
    pub metadata: Value,

    /// Node id → raw node record.
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Map<String, Value>,
}

impl Manifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|e| ManifestError::Malformed(e.to_string()))
    }

    /// The `metadata.dbt_version` string, if present.
    pub fn dbt_version(&self) -> Option<&str> {
        self.metadata.get("dbt_version").and_then(Value::as_str)
    }

    /// Iterate over model nodes only.
    pub fn models(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.nodes.iter().filter(|(_, node)| is_model(node))
    }

    /// Number of model nodes.
    pub fn model_count(&self) -> usize {
        self.models().count()
    }
}

fn is_model(node: &Value) -> bool {
    node.get("resource_type").and_then(Value::as_str) == Some(MODEL_RESOURCE_TYPE)
}

/// The eight attributes of a model node that survive reduction.
///
/// Values are copied verbatim whatever their JSON type. Field order matches
/// the serialized layout of the reduced document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelNode {
    pub name: Value,
    pub resource_type: Value,
    pub depends_on: Value,
    pub columns: Value,
    pub description: Value,
    pub schema: Value,
    pub database: Value,
    pub tags: Value,
}

impl ModelNode {
    /// Copy the kept attributes out of a raw node record.
    ///
    /// Absent or `null` attributes fall back to `{}`, `[]` or `""`;
    /// `name` stays `null` when missing.
    pub fn from_record(record: &Value) -> Self {
        let field = |key: &str, fallback: Value| {
            record
                .get(key)
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or(fallback)
        };

        Self {
            name: record.get("name").cloned().unwrap_or(Value::Null),
            resource_type: field("resource_type", Value::from(MODEL_RESOURCE_TYPE)),
            depends_on: field("depends_on", empty_object()),
            columns: field("columns", empty_object()),
            description: field("description", Value::from("")),
            schema: field("schema", Value::from("")),
            database: field("database", Value::from("")),
            tags: field("tags", Value::Array(Vec::new())),
        }
    }
}

/// A condensed, model-only projection of a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedManifest {
    pub metadata: Value,
    pub nodes: BTreeMap<String, ModelNode>,
}

impl ReducedManifest {
    /// Project a manifest down to its model nodes.
    ///
    /// Every emitted node exists with type `model` in `manifest`; nothing is
    /// synthesized.
    pub fn project(manifest: &Manifest) -> Self {
        let nodes = manifest
            .models()
            .map(|(id, node)| (id.clone(), ModelNode::from_record(node)))
            .collect();

        Self {
            metadata: manifest.metadata.clone(),
            nodes,
        }
    }

    /// Serialize with two-space indentation.
    pub fn to_pretty_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestError::Serialize(e.to_string()))
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => empty_object(),
        other => other,
    })
}
