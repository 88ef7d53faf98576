use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single execution of a build process.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "build.openshift.io",
    version = "v1",
    kind = "Build",
    status = "BuildStatus",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    pub service_account: Option<String>,
    pub strategy: BuildStrategy,
    pub node_selector: Option<BTreeMap<String, String>>,
    pub completion_deadline_seconds: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub phase: Option<String>,
    pub cancelled: Option<bool>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// A reusable template from which builds are created.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "build.openshift.io",
    version = "v1",
    kind = "BuildConfig",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    pub service_account: Option<String>,
    pub strategy: BuildStrategy,
    pub node_selector: Option<BTreeMap<String, String>>,
    pub run_policy: Option<String>,
    pub successful_builds_history_limit: Option<i32>,
    pub failed_builds_history_limit: Option<i32>,
}

/// Describes how a build is executed.
///
/// Exactly one of the strategy fields is expected to be set. The `type` field
/// is informational; the populated strategy field is authoritative.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub docker_strategy: Option<DockerBuildStrategy>,
    pub source_strategy: Option<SourceBuildStrategy>,
    pub custom_strategy: Option<CustomBuildStrategy>,
    pub jenkins_pipeline_strategy: Option<JenkinsPipelineBuildStrategy>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DockerBuildStrategy {
    pub from: Option<ImageReference>,
    pub no_cache: Option<bool>,
    pub force_pull: Option<bool>,
    pub dockerfile_path: Option<String>,
    /// One of `None`, `SkipLayers` or `SkipLayersAndWarn`.
    pub image_optimization_policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceBuildStrategy {
    pub from: ImageReference,
    pub scripts: Option<String>,
    pub incremental: Option<bool>,
    pub force_pull: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomBuildStrategy {
    pub from: ImageReference,
    pub expose_docker_socket: Option<bool>,
    pub force_pull: Option<bool>,
    pub build_api_version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsPipelineBuildStrategy {
    pub jenkinsfile_path: Option<String>,
    pub jenkinsfile: Option<String>,
}

/// References the builder image, e.g. an `ImageStreamTag` or `DockerImage`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ImageReference {
    pub kind: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_docker_strategy() {
        let strategy = serde_json::from_value::<BuildStrategy>(serde_json::json!({
            "type": "Docker",
            "dockerStrategy": {
                "imageOptimizationPolicy": "SkipLayers",
                "noCache": true,
            },
        }))
        .unwrap();

        assert_eq!(strategy.type_.as_deref(), Some("Docker"));
        let docker = strategy.docker_strategy.expect("docker strategy must be set");
        assert_eq!(
            docker.image_optimization_policy.as_deref(),
            Some("SkipLayers")
        );
        assert_eq!(docker.no_cache, Some(true));
        assert!(strategy.source_strategy.is_none());
        assert!(strategy.custom_strategy.is_none());
        assert!(strategy.jenkins_pipeline_strategy.is_none());
    }

    #[test]
    fn parses_build_config() {
        let bc = serde_json::from_value::<BuildConfig>(serde_json::json!({
            "apiVersion": "build.openshift.io/v1",
            "kind": "BuildConfig",
            "metadata": {
                "name": "app",
                "namespace": "ns-0",
            },
            "spec": {
                "runPolicy": "Serial",
                "nodeSelector": { "disk": "ssd" },
                "strategy": {
                    "type": "Source",
                    "sourceStrategy": {
                        "from": { "kind": "ImageStreamTag", "name": "ruby:3.1" },
                    },
                },
            },
        }))
        .unwrap();

        assert_eq!(bc.metadata.name.as_deref(), Some("app"));
        assert_eq!(bc.spec.run_policy.as_deref(), Some("Serial"));
        assert_eq!(
            bc.spec.node_selector,
            Some(maplit::btreemap! { "disk".to_string() => "ssd".to_string() })
        );
        let source = bc.spec.strategy.source_strategy.expect("source strategy");
        assert_eq!(source.from.name, "ruby:3.1");
    }

    #[test]
    fn parses_empty_strategy() {
        let strategy = serde_json::from_value::<BuildStrategy>(serde_json::json!({})).unwrap();
        assert_eq!(strategy, BuildStrategy::default());
    }
}
