use crate::{
    core::{AccessQuery, AccessReview, LookupObject, ReviewAccess, WorkloadKind},
    k8s::{Build, BuildConfig, BuildObject},
};
use anyhow::{anyhow, Result};
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SubjectAccessReview, SubjectAccessReviewSpec,
};
use kube::api::{Api, PostParams};

/// Reviews access by creating `SubjectAccessReview`s.
#[derive(Clone)]
pub struct SubjectAccessReviewer {
    client: kube::Client,
}

/// Reads builds and build configs from the API server.
#[derive(Clone)]
pub struct ApiLookup {
    client: kube::Client,
}

// === impl SubjectAccessReviewer ===

impl SubjectAccessReviewer {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ReviewAccess for SubjectAccessReviewer {
    async fn review(&self, query: &AccessQuery) -> Result<AccessReview> {
        let api = Api::<SubjectAccessReview>::all(self.client.clone());
        let review = api
            .create(&PostParams::default(), &subject_access_review(query))
            .await?;
        let status = review
            .status
            .ok_or_else(|| anyhow!("SubjectAccessReview response has no status"))?;
        Ok(AccessReview {
            allowed: status.allowed,
            reason: status.reason.or(status.evaluation_error),
        })
    }
}

fn subject_access_review(query: &AccessQuery) -> SubjectAccessReview {
    SubjectAccessReview {
        metadata: Default::default(),
        spec: SubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                namespace: Some(query.namespace.clone()),
                verb: Some(query.verb.clone()),
                group: Some(query.group.clone()),
                resource: Some(query.resource.clone()),
                subresource: query.subresource.clone(),
                name: Some(query.name.clone()),
                ..Default::default()
            }),
            user: query.user.clone(),
            uid: query.uid.clone(),
            groups: Some(query.groups.clone()),
            extra: Some(query.extra.clone()),
            ..Default::default()
        },
        status: None,
    }
}

// === impl ApiLookup ===

impl ApiLookup {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl LookupObject for ApiLookup {
    async fn get(&self, kind: WorkloadKind, namespace: &str, name: &str) -> Result<BuildObject> {
        let obj: BuildObject = match kind {
            WorkloadKind::Build => Api::<Build>::namespaced(self.client.clone(), namespace)
                .get(name)
                .await?
                .into(),
            WorkloadKind::BuildConfig => {
                Api::<BuildConfig>::namespaced(self.client.clone(), namespace)
                    .get(name)
                    .await?
                    .into()
            }
        };
        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_subject_access_review() {
        let query = AccessQuery {
            namespace: "ns-0".to_string(),
            verb: "create".to_string(),
            group: "build.openshift.io".to_string(),
            resource: "builds".to_string(),
            subresource: Some("optimizeddocker".to_string()),
            name: "app-".to_string(),
            user: Some("alice".to_string()),
            uid: Some("alice-uid".to_string()),
            groups: vec!["developers".to_string()],
            extra: maplit::btreemap! {
                "scopes".to_string() => vec!["user:full".to_string()],
            },
        };

        let sar = subject_access_review(&query);
        let attrs = sar.spec.resource_attributes.expect("resource attributes");
        assert_eq!(attrs.namespace.as_deref(), Some("ns-0"));
        assert_eq!(attrs.verb.as_deref(), Some("create"));
        assert_eq!(attrs.group.as_deref(), Some("build.openshift.io"));
        assert_eq!(attrs.resource.as_deref(), Some("builds"));
        assert_eq!(attrs.subresource.as_deref(), Some("optimizeddocker"));
        assert_eq!(attrs.name.as_deref(), Some("app-"));
        assert_eq!(sar.spec.user.as_deref(), Some("alice"));
        assert_eq!(sar.spec.uid.as_deref(), Some("alice-uid"));
        assert_eq!(sar.spec.groups, Some(vec!["developers".to_string()]));
        assert_eq!(sar.spec.extra.map(|e| e.len()), Some(1));
        assert!(sar.status.is_none());
    }
}
