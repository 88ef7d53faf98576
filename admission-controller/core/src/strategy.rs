use crate::{api, Error};
use std::fmt;

/// The mechanism a build uses to produce its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    Docker {
        image_optimization_policy: Option<ImageOptimizationPolicy>,
    },
    Custom,
    Source,
    JenkinsPipeline,
}

/// Controls how a Docker build handles image layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageOptimizationPolicy {
    None,
    SkipLayers,
    SkipLayersAndWarn,
    Other(String),
}

/// The access-control resource that guards use of a build strategy.
///
/// The resource may name a subresource, separated by a single `/`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StrategyResource {
    pub group: &'static str,
    pub resource: &'static str,
}

// === impl Strategy ===

impl Strategy {
    /// The name used for this strategy in denial messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Docker { .. } => "Docker",
            Self::Custom => "Custom",
            Self::Source => "Source",
            Self::JenkinsPipeline => "JenkinsPipeline",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl TryFrom<&api::BuildStrategy> for Strategy {
    type Error = Error;

    /// Selects the populated strategy. If more than one is set, Docker wins
    /// over Custom, Custom over Source, and Source over JenkinsPipeline.
    fn try_from(strategy: &api::BuildStrategy) -> Result<Self, Error> {
        if let Some(docker) = &strategy.docker_strategy {
            return Ok(Self::Docker {
                image_optimization_policy: docker
                    .image_optimization_policy
                    .as_deref()
                    .map(ImageOptimizationPolicy::from),
            });
        }
        if strategy.custom_strategy.is_some() {
            return Ok(Self::Custom);
        }
        if strategy.source_strategy.is_some() {
            return Ok(Self::Source);
        }
        if strategy.jenkins_pipeline_strategy.is_some() {
            return Ok(Self::JenkinsPipeline);
        }
        Err(Error::UnrecognizedStrategy(
            strategy.type_.clone().unwrap_or_default(),
        ))
    }
}

// === impl ImageOptimizationPolicy ===

impl From<&str> for ImageOptimizationPolicy {
    fn from(policy: &str) -> Self {
        match policy {
            "None" => Self::None,
            "SkipLayers" => Self::SkipLayers,
            "SkipLayersAndWarn" => Self::SkipLayersAndWarn,
            other => Self::Other(other.to_string()),
        }
    }
}

// === impl StrategyResource ===

impl StrategyResource {
    pub const DOCKER: Self = Self::builds("builds/docker");
    pub const OPTIMIZED_DOCKER: Self = Self::builds("builds/optimizeddocker");
    pub const CUSTOM: Self = Self::builds("builds/custom");
    pub const SOURCE: Self = Self::builds("builds/source");
    pub const JENKINS_PIPELINE: Self = Self::builds("builds/jenkinspipeline");

    const fn builds(resource: &'static str) -> Self {
        Self {
            group: api::GROUP,
            resource,
        }
    }

    /// Maps a strategy to the resource that guards it.
    ///
    /// The Docker arms must stay first: a Docker strategy with any image
    /// optimization other than `None` is guarded separately.
    pub fn for_strategy(strategy: &Strategy) -> Self {
        match strategy {
            Strategy::Docker {
                image_optimization_policy: Some(policy),
            } if *policy != ImageOptimizationPolicy::None => Self::OPTIMIZED_DOCKER,
            Strategy::Docker { .. } => Self::DOCKER,
            Strategy::Custom => Self::CUSTOM,
            Strategy::Source => Self::SOURCE,
            Strategy::JenkinsPipeline => Self::JENKINS_PIPELINE,
        }
    }

    /// Maps a strategy as it appears on the wire, failing if no strategy is
    /// set.
    pub fn for_wire(strategy: &api::BuildStrategy) -> Result<Self, Error> {
        Strategy::try_from(strategy).map(|s| Self::for_strategy(&s))
    }

    /// Splits the resource into a resource type and an optional subresource.
    pub fn split(&self) -> (&'static str, Option<&'static str>) {
        match self.resource.split_once('/') {
            Some((resource, subresource)) => (resource, Some(subresource)),
            None => (self.resource, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docker(policy: Option<&str>) -> api::BuildStrategy {
        api::BuildStrategy {
            docker_strategy: Some(api::DockerBuildStrategy {
                image_optimization_policy: policy.map(Into::into),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn docker_without_optimization() {
        assert_eq!(
            StrategyResource::for_wire(&docker(None)).unwrap(),
            StrategyResource::DOCKER
        );
        assert_eq!(
            StrategyResource::for_wire(&docker(Some("None"))).unwrap(),
            StrategyResource::DOCKER
        );
    }

    #[test]
    fn docker_with_optimization() {
        for policy in ["SkipLayers", "SkipLayersAndWarn", "SomethingNew"] {
            assert_eq!(
                StrategyResource::for_wire(&docker(Some(policy))).unwrap(),
                StrategyResource::OPTIMIZED_DOCKER,
                "{policy}"
            );
        }
    }

    #[test]
    fn other_strategies() {
        let custom = api::BuildStrategy {
            custom_strategy: Some(Default::default()),
            ..Default::default()
        };
        assert_eq!(
            StrategyResource::for_wire(&custom).unwrap(),
            StrategyResource::CUSTOM
        );

        let source = api::BuildStrategy {
            source_strategy: Some(Default::default()),
            ..Default::default()
        };
        assert_eq!(
            StrategyResource::for_wire(&source).unwrap(),
            StrategyResource::SOURCE
        );

        let pipeline = api::BuildStrategy {
            jenkins_pipeline_strategy: Some(Default::default()),
            ..Default::default()
        };
        assert_eq!(
            StrategyResource::for_wire(&pipeline).unwrap(),
            StrategyResource::JENKINS_PIPELINE
        );
    }

    #[test]
    fn unpopulated_strategy() {
        let strategy = api::BuildStrategy {
            type_: Some("Docker".to_string()),
            ..Default::default()
        };
        let error = StrategyResource::for_wire(&strategy).unwrap_err();
        assert!(matches!(&error, Error::UnrecognizedStrategy(t) if t == "Docker"));
        assert_eq!(
            error.to_string(),
            "unrecognized build strategy: type \"Docker\""
        );
    }

    #[test]
    fn docker_takes_priority() {
        let strategy = api::BuildStrategy {
            source_strategy: Some(Default::default()),
            ..docker(None)
        };
        assert_eq!(
            Strategy::try_from(&strategy).unwrap(),
            Strategy::Docker {
                image_optimization_policy: None
            }
        );
    }

    #[test]
    fn split() {
        assert_eq!(StrategyResource::DOCKER.split(), ("builds", Some("docker")));
        assert_eq!(
            StrategyResource::JENKINS_PIPELINE.split(),
            ("builds", Some("jenkinspipeline"))
        );
        let plain = StrategyResource {
            group: api::GROUP,
            resource: "builds",
        };
        assert_eq!(plain.split(), ("builds", None));
    }

    #[test]
    fn type_names() {
        assert_eq!(
            Strategy::Docker {
                image_optimization_policy: Some(ImageOptimizationPolicy::SkipLayers)
            }
            .type_name(),
            "Docker"
        );
        assert_eq!(Strategy::Custom.type_name(), "Custom");
        assert_eq!(Strategy::Source.type_name(), "Source");
        assert_eq!(Strategy::JenkinsPipeline.type_name(), "JenkinsPipeline");
    }
}
