use kube::core::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asks the API server to run an existing `Build` or `BuildConfig`.
///
/// Posted to the `builds/clone` and `buildconfigs/instantiate`
/// subresources. The object is identified by `metadata.name`; a request
/// carries no strategy of its own.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub metadata: ObjectMeta,
    pub revision: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels_override: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggered_by: Vec<BuildTriggerCause>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct BuildTriggerCause {
    pub message: Option<String>,
}

// === impl BuildRequest ===

impl BuildRequest {
    /// The name of the object this request refers to.
    pub fn target_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}
