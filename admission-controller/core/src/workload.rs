use crate::{api, Error, Strategy};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Build,
    BuildConfig,
}

/// A build or build config, reduced to what an authorization decision needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub name: String,
    pub generate_name: Option<String>,
    pub strategy: Strategy,
}

// === impl WorkloadKind ===

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("Build"),
            Self::BuildConfig => f.write_str("BuildConfig"),
        }
    }
}

// === impl Workload ===

impl Workload {
    fn new(
        kind: WorkloadKind,
        meta: &api::ObjectMeta,
        strategy: &api::BuildStrategy,
    ) -> Result<Self, Error> {
        Ok(Self {
            kind,
            name: meta.name.clone().unwrap_or_default(),
            generate_name: meta.generate_name.clone(),
            strategy: Strategy::try_from(strategy)?,
        })
    }

    /// The name to authorize against: the generate-name prefix when one is
    /// set, otherwise the object's name.
    pub fn resource_name(&self) -> &str {
        match self.generate_name.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => &self.name,
        }
    }
}

impl TryFrom<&api::Build> for Workload {
    type Error = Error;

    fn try_from(build: &api::Build) -> Result<Self, Error> {
        Self::new(WorkloadKind::Build, &build.metadata, &build.spec.strategy)
    }
}

impl TryFrom<&api::BuildConfig> for Workload {
    type Error = Error;

    fn try_from(config: &api::BuildConfig) -> Result<Self, Error> {
        Self::new(
            WorkloadKind::BuildConfig,
            &config.metadata,
            &config.spec.strategy,
        )
    }
}

impl TryFrom<&api::BuildObject> for Workload {
    type Error = Error;

    fn try_from(obj: &api::BuildObject) -> Result<Self, Error> {
        match obj {
            api::BuildObject::Build(build) => Self::try_from(build),
            api::BuildObject::BuildConfig(config) => Self::try_from(config),
        }
    }
}
