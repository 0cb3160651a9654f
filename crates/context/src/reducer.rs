//! Manifest reduction: decides how much of a manifest goes to the assistant.
//!
//! Small manifests are passed through untouched. Manifests above the size
//! threshold are projected down to their model nodes (see
//! [`ReducedManifest`]); seeds, sources, tests and compiled code are dropped.
//!
//! | Strategy | Condition | Output |
//! |----------|-----------|--------|
//! | `PassThrough` | `bytes <= threshold` | input, byte-identical |
//! | `Summarize` | `bytes > threshold` | pretty-printed model-only projection |

use dbtchat_core::error::ManifestError;
use dbtchat_core::manifest::{Manifest, ReducedManifest};
use std::borrow::Cow;
use tracing::debug;

/// Default size threshold, in bytes of manifest text.
pub const DEFAULT_THRESHOLD_BYTES: usize = 100_000;

/// The two reduction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Send the manifest as-is
    PassThrough,
    /// Send the model-only projection
    Summarize,
}

impl Reduction {
    /// Pick a strategy with a single threshold comparison.
    pub fn select(size_bytes: usize, threshold_bytes: usize) -> Self {
        if size_bytes <= threshold_bytes {
            Self::PassThrough
        } else {
            Self::Summarize
        }
    }
}

/// Applies the size threshold to manifest text. Stateless: create one and reuse it.
#[derive(Debug, Clone)]
pub struct ManifestReducer {
    threshold_bytes: usize,
}

impl ManifestReducer {
    /// Create a reducer with the given threshold.
    pub fn new(threshold_bytes: usize) -> Self {
        Self { threshold_bytes }
    }

    /// Create a reducer with the default 100 KB threshold.
    pub fn with_default_threshold() -> Self {
        Self::new(DEFAULT_THRESHOLD_BYTES)
    }

    pub fn threshold_bytes(&self) -> usize {
        self.threshold_bytes
    }

    /// The strategy that [`reduce`](Self::reduce) would apply to `manifest_text`.
    pub fn strategy(&self, manifest_text: &str) -> Reduction {
        Reduction::select(manifest_text.len(), self.threshold_bytes)
    }

    /// Reduce manifest text to fit the size threshold.
    ///
    /// Under the threshold the input is borrowed back unchanged and never
    /// parsed, so even malformed small manifests pass through.
    pub fn reduce<'a>(&self, manifest_text: &'a str) -> Result<Cow<'a, str>, ManifestError> {
        let size = manifest_text.len();
        match Reduction::select(size, self.threshold_bytes) {
            Reduction::PassThrough => {
                debug!(size, threshold = self.threshold_bytes, "Manifest passed through");
                Ok(Cow::Borrowed(manifest_text))
            }
            Reduction::Summarize => summarize(manifest_text).map(Cow::Owned),
        }
    }
}

impl Default for ManifestReducer {
    fn default() -> Self {
        Self::with_default_threshold()
    }
}

/// Parse manifest text and render its model-only projection.
pub fn summarize(manifest_text: &str) -> Result<String, ManifestError> {
    let manifest = Manifest::parse(manifest_text)?;
    let reduced = ReducedManifest::project(&manifest);
    let rendered = reduced.to_pretty_json()?;

    debug!(
        size = manifest_text.len(),
        reduced_size = rendered.len(),
        kept = reduced.nodes.len(),
        dropped = manifest.nodes.len() - reduced.nodes.len(),
        "Manifest summarized"
    );

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// Build a manifest with `models` model nodes and `others` seed/test nodes,
    /// each padded with `padding` bytes of compiled code.
    fn manifest_text(models: usize, others: usize, padding: usize) -> String {
        let filler = "x".repeat(padding);
        let mut nodes = serde_json::Map::new();
        for i in 0..models {
            nodes.insert(
                format!("model.shop.m{i}"),
                json!({
                    "resource_type": "model",
                    "name": format!("m{i}"),
                    "schema": "mart",
                    "compiled_code": filler,
                }),
            );
        }
        for i in 0..others {
            let kind = if i % 2 == 0 { "seed" } else { "test" };
            nodes.insert(
                format!("{kind}.shop.n{i}"),
                json!({"resource_type": kind, "name": format!("n{i}"), "raw_code": filler}),
            );
        }
        json!({"metadata": {"dbt_version": "1.8.0"}, "nodes": nodes}).to_string()
    }

    #[test]
    fn strategy_boundary_is_inclusive() {
        assert_eq!(Reduction::select(100_000, 100_000), Reduction::PassThrough);
        assert_eq!(Reduction::select(100_001, 100_000), Reduction::Summarize);
        assert_eq!(Reduction::select(0, 100_000), Reduction::PassThrough);
    }

    #[test]
    fn small_manifest_is_byte_identical() {
        let text = manifest_text(3, 5, 10);
        assert!(text.len() <= DEFAULT_THRESHOLD_BYTES);

        let reduced = ManifestReducer::default().reduce(&text).unwrap();
        assert!(matches!(reduced, Cow::Borrowed(_)));
        assert_eq!(reduced, text);
    }

    #[test]
    fn small_malformed_manifest_passes_through() {
        let reducer = ManifestReducer::default();
        assert_eq!(reducer.reduce("{not json").unwrap(), "{not json");
    }

    #[test]
    fn large_manifest_keeps_only_models() {
        let text = manifest_text(12, 30, 4_000);
        assert!(text.len() > DEFAULT_THRESHOLD_BYTES);

        let reduced = ManifestReducer::default().reduce(&text).unwrap();
        let doc: Value = serde_json::from_str(&reduced).unwrap();
        let nodes = doc["nodes"].as_object().unwrap();

        assert_eq!(nodes.len(), 12);
        assert!(nodes.values().all(|n| n["resource_type"] == "model"));
        assert_eq!(doc["metadata"], json!({"dbt_version": "1.8.0"}));
        assert!(!reduced.contains("compiled_code"));
    }

    #[test]
    fn large_manifest_keeps_odd_field_types() {
        let mut doc: Value = serde_json::from_str(&manifest_text(12, 30, 4_000)).unwrap();
        doc["metadata"] = json!("v1");
        doc["nodes"]["model.shop.m0"]["tags"] = json!("daily");
        doc["nodes"]["model.shop.m1"]["description"] = json!(42);
        let text = doc.to_string();
        assert!(text.len() > DEFAULT_THRESHOLD_BYTES);

        let reduced = ManifestReducer::default().reduce(&text).unwrap();
        let out: Value = serde_json::from_str(&reduced).unwrap();

        assert_eq!(out["metadata"], "v1");
        assert_eq!(out["nodes"]["model.shop.m0"]["tags"], "daily");
        assert_eq!(out["nodes"]["model.shop.m1"]["description"], 42);
        assert_eq!(out["nodes"]["model.shop.m2"]["tags"], json!([]));
    }

    #[test]
    fn large_malformed_manifest_fails() {
        let text = format!("{{\"nodes\": {}", "[".repeat(200_000));
        let result = ManifestReducer::default().reduce(&text);
        assert!(matches!(result, Err(ManifestError::Malformed(_))));
    }

    #[test]
    fn reduction_is_idempotent_on_its_output() {
        let reducer = ManifestReducer::default();
        let text = manifest_text(10, 20, 5_000);
        let once = reducer.reduce(&text).unwrap().into_owned();
        assert!(once.len() <= DEFAULT_THRESHOLD_BYTES);

        let twice = reducer.reduce(&once).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn summarize_is_callable_below_threshold() {
        let text = manifest_text(2, 2, 10);
        let summary = summarize(&text).unwrap();
        let doc: Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(doc["nodes"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn custom_threshold_changes_strategy() {
        let text = manifest_text(1, 1, 10);
        let reducer = ManifestReducer::new(16);
        assert_eq!(reducer.strategy(&text), Reduction::Summarize);
        assert_ne!(reducer.reduce(&text).unwrap(), text);
    }
}
