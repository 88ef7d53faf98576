use crate::{
    access::{AccessClient, AccessQuery, ReviewAccess},
    api,
    attributes::BUILDS,
    resolve::{LookupObject, Resolver},
    Attributes, Error, Forbidden, Operation, Workload,
};
use kube::core::DynamicObject;
use serde::de::DeserializeOwned;
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

/// Only admits builds whose strategy the requesting user may use.
///
/// Handles create and update requests for `builds`, `buildconfigs` and
/// the `BuildRequest`s posted to their subresources.
///
/// Updates that only relink owner references or finalizers are admitted
/// without a review. This relies on the API server having already
/// authorized the update itself.
#[derive(Clone)]
pub struct BuildByStrategy {
    access: AccessClient,
    resolver: Resolver,
}

/// The object under review, classified by kind.
#[derive(Debug)]
enum Request {
    Build(api::Build),
    BuildConfig(api::BuildConfig),
    BuildRequest(api::BuildRequest),
}

/// The `builds` subresource that only records commit details.
const DETAILS: &str = "details";

// === impl BuildByStrategy ===

impl BuildByStrategy {
    pub const NAME: &'static str = "BuildByStrategy";

    pub fn new(reviewer: Arc<dyn ReviewAccess>, lookup: Arc<dyn LookupObject>) -> Self {
        Self {
            access: AccessClient::new(reviewer),
            resolver: Resolver::new(lookup),
        }
    }

    pub fn handles(&self, operation: Operation) -> bool {
        matches!(operation, Operation::Create | Operation::Update)
    }

    pub async fn admit(&self, attrs: &Attributes) -> Result<(), Forbidden> {
        self.check(attrs)
            .await
            .map_err(|error| Forbidden::new(attrs, error))
    }

    async fn check(&self, attrs: &Attributes) -> Result<(), Error> {
        match attrs.resource.build_resource() {
            Some(BUILDS) if attrs.subresource.as_deref() == Some(DETAILS) => {
                trace!("Skipping build details");
                return Ok(());
            }
            Some(_) => {}
            None => return Ok(()),
        }

        if attrs.is_only_mutating_gc_fields() {
            debug!(name = %attrs.name, "Update only changes garbage collection fields");
            return Ok(());
        }

        let workload = match Request::classify(attrs)? {
            Request::Build(build) => Workload::try_from(&build)?,
            Request::BuildConfig(config) => Workload::try_from(&config)?,
            Request::BuildRequest(req) => self.resolver.resolve(&req, attrs).await?,
        };

        let query = AccessQuery::for_workload(&workload, attrs);
        debug!(?query, kind = %workload.kind, strategy = %workload.strategy, "Reviewing access");
        self.access.check_access(&workload.strategy, &query).await
    }
}

impl fmt::Debug for BuildByStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(Self::NAME).finish_non_exhaustive()
    }
}

// === impl Request ===

impl Request {
    fn classify(attrs: &Attributes) -> Result<Self, Error> {
        let obj = match attrs.object.as_ref() {
            Some(obj) if api::is_build_group(&attrs.kind.group) => obj,
            _ => return Err(Error::UnrecognizedObject(attrs.kind.to_string())),
        };

        match attrs.kind.kind.as_str() {
            "Build" => parse(obj).map(Self::Build),
            "BuildConfig" => parse(obj).map(Self::BuildConfig),
            "BuildRequest" => parse(obj).map(Self::BuildRequest),
            _ => Err(Error::UnrecognizedObject(attrs.kind.to_string())),
        }
    }
}

fn parse<T: DeserializeOwned>(obj: &DynamicObject) -> Result<T, Error> {
    let invalid = |source| Error::InvalidObject {
        kind: obj
            .types
            .as_ref()
            .map(|t| t.kind.clone())
            .unwrap_or_default(),
        source,
    };
    let value = serde_json::to_value(obj).map_err(invalid)?;
    serde_json::from_value(value).map_err(invalid)
}
