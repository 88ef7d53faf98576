use crate::{
    api::{BuildObject, BuildRequest},
    attributes::{BUILDS, BUILD_CONFIGS},
    Attributes, Error, Workload, WorkloadKind,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Models the API that serves build objects.
#[async_trait::async_trait]
pub trait LookupObject: Send + Sync {
    async fn get(&self, kind: WorkloadKind, namespace: &str, name: &str) -> Result<BuildObject>;
}

/// Resolves a `BuildRequest` to the object it refers to.
///
/// Every call reads the object from the API so that the decision reflects
/// its current state.
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn LookupObject>,
}

// === impl Resolver ===

impl Resolver {
    pub fn new(lookup: Arc<dyn LookupObject>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(
        &self,
        req: &BuildRequest,
        attrs: &Attributes,
    ) -> Result<Workload, Error> {
        let kind = match attrs.resource.build_resource() {
            Some(BUILDS) => WorkloadKind::Build,
            Some(BUILD_CONFIGS) => WorkloadKind::BuildConfig,
            _ => return Err(Error::UnknownBuildRequestTarget(attrs.resource.clone())),
        };

        let name = req.target_name();
        debug!(%kind, ns = %attrs.namespace, %name, "Resolving BuildRequest");
        let obj = self
            .lookup
            .get(kind, &attrs.namespace, name)
            .await
            .map_err(|source| Error::Lookup {
                kind,
                name: name.to_string(),
                source,
            })?;

        Workload::try_from(&obj).map_err(|error| Error::Convert {
            kind,
            name: name.to_string(),
            source: Box::new(error),
        })
    }
}
