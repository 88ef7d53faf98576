use crate::{api::UserInfo, Attributes, Error, Strategy, StrategyResource, Workload};
use anyhow::Result;
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// Asks whether a user may perform a verb on a resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessQuery {
    pub namespace: String,
    pub verb: String,
    pub group: String,
    pub resource: String,
    pub subresource: Option<String>,
    pub name: String,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub groups: Vec<String>,
    pub extra: BTreeMap<String, Vec<String>>,
}

/// The answer to an [`AccessQuery`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessReview {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Models the service that authoritatively reviews access queries.
#[async_trait::async_trait]
pub trait ReviewAccess: Send + Sync {
    async fn review(&self, query: &AccessQuery) -> Result<AccessReview>;
}

/// Checks that a user may use a build strategy.
#[derive(Clone)]
pub struct AccessClient {
    reviewer: Arc<dyn ReviewAccess>,
}

// === impl AccessQuery ===

impl AccessQuery {
    pub const VERB: &'static str = "create";

    /// Builds a query asking whether the requesting user may create the
    /// strategy's resource for `workload`.
    pub fn for_workload(workload: &Workload, attrs: &Attributes) -> Self {
        let strategy = StrategyResource::for_strategy(&workload.strategy);
        let (resource, subresource) = strategy.split();
        Self {
            namespace: attrs.namespace.clone(),
            verb: Self::VERB.to_string(),
            group: strategy.group.to_string(),
            resource: resource.to_string(),
            subresource: subresource.map(Into::into),
            name: workload.resource_name().to_string(),
            ..Self::default()
        }
        .with_user(&attrs.user)
    }

    fn with_user(self, user: &UserInfo) -> Self {
        Self {
            user: user.username.clone(),
            uid: user.uid.clone(),
            groups: user.groups.clone().unwrap_or_default(),
            extra: user.extra.clone().unwrap_or_default(),
            ..self
        }
    }
}

// === impl AccessClient ===

impl AccessClient {
    pub fn new(reviewer: Arc<dyn ReviewAccess>) -> Self {
        Self { reviewer }
    }

    /// Reviews `query` for a workload using `strategy`.
    ///
    /// Fails closed: a review that cannot be completed denies the request.
    pub async fn check_access(
        &self,
        strategy: &Strategy,
        query: &AccessQuery,
    ) -> Result<(), Error> {
        let review = self.reviewer.review(query).await.map_err(Error::Review)?;
        if !review.allowed {
            debug!(
                %strategy,
                user = ?query.user,
                reason = ?review.reason,
                "Strategy not allowed"
            );
            return Err(Error::NotAllowed(strategy.type_name()));
        }
        Ok(())
    }
}
