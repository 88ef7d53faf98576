#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod build;
pub mod build_request;

pub use self::{
    build::{
        Build, BuildConfig, BuildConfigSpec, BuildSpec, BuildStatus, BuildStrategy,
        CustomBuildStrategy, DockerBuildStrategy, ImageReference, JenkinsPipelineBuildStrategy,
        SourceBuildStrategy,
    },
    build_request::BuildRequest,
};
pub use k8s_openapi::{
    api::authentication::v1::UserInfo, apimachinery::pkg::apis::meta::v1::OwnerReference,
};
pub use kube::core::ObjectMeta;

/// The API group that serves build resources.
pub const GROUP: &str = "build.openshift.io";

/// Build resources are also served by the legacy, ungrouped `v1` API.
pub const LEGACY_GROUP: &str = "";

/// Returns true if `group` is one of the groups that serve build resources.
pub fn is_build_group(group: &str) -> bool {
    group == GROUP || group == LEGACY_GROUP
}

/// A build object as read back from the API server.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildObject {
    Build(Build),
    BuildConfig(BuildConfig),
}

// === impl BuildObject ===

impl From<Build> for BuildObject {
    fn from(build: Build) -> Self {
        Self::Build(build)
    }
}

impl From<BuildConfig> for BuildObject {
    fn from(config: BuildConfig) -> Self {
        Self::BuildConfig(config)
    }
}
