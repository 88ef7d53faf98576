use crate::{
    core::{Attributes, BuildByStrategy, GroupKind, GroupResource, Operation},
    metrics::{AdmissionMetrics, Decision},
};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use kube::core::{admission, DynamicObject};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Serves validating admission reviews for build resources.
#[derive(Clone)]
pub struct Admission {
    gate: BuildByStrategy,
    metrics: AdmissionMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(#[from] hyper::Error),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Review = admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = admission::AdmissionResponse;
type AdmissionReview = admission::AdmissionReview<DynamicObject>;

type Body = http_body_util::Full<bytes::Bytes>;

// === impl AdmissionService ===

impl tower::Service<Request<hyper::body::Incoming>> for Admission {
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<hyper::body::Incoming>) -> Self::Future {
        trace!(?req);
        if req.method() != http::Method::POST || req.uri().path() != "/" {
            return Box::pin(future::ok(
                Response::builder()
                    .status(http::StatusCode::NOT_FOUND)
                    .body(Body::default())
                    .expect("not found response must be valid"),
            ));
        }

        let admission = self.clone();
        Box::pin(async move {
            use bytes::Buf;
            let bytes = req.into_body().collect().await?.to_bytes();
            let review: Review = match serde_json::from_reader(bytes.reader()) {
                Ok(review) => review,
                Err(error) => {
                    warn!(%error, "Failed to parse request body");
                    return json_response(AdmissionResponse::invalid(error).into_review());
                }
            };
            trace!(?review);

            let rsp = match review.try_into() {
                Ok(req) => {
                    debug!(?req);
                    admission.admit(req).await
                }
                Err(error) => {
                    warn!(%error, "Invalid admission request");
                    AdmissionResponse::invalid(error)
                }
            };
            debug!(?rsp);
            json_response(rsp.into_review())
        })
    }
}

impl Admission {
    pub fn new(gate: BuildByStrategy, metrics: AdmissionMetrics) -> Self {
        Self { gate, metrics }
    }

    async fn admit(self, req: AdmissionRequest) -> AdmissionResponse {
        let rsp = AdmissionResponse::from(&req);
        let attrs = attributes(req);

        if !self.gate.handles(attrs.operation) {
            trace!(operation = %attrs.operation, "Operation not handled");
            self.metrics.observe(&attrs.resource, Decision::Skipped);
            return rsp;
        }

        match self.gate.admit(&attrs).await {
            Ok(()) => {
                self.metrics.observe(&attrs.resource, Decision::Allowed);
                rsp
            }
            Err(error) => {
                info!(
                    %error,
                    ns = %attrs.namespace,
                    name = %attrs.name,
                    user = ?attrs.user.username,
                    "Denied"
                );
                self.metrics.observe(&attrs.resource, Decision::Denied);
                rsp.deny(error)
            }
        }
    }
}

fn attributes(req: AdmissionRequest) -> Attributes {
    let operation = match req.operation {
        admission::Operation::Create => Operation::Create,
        admission::Operation::Update => Operation::Update,
        admission::Operation::Delete => Operation::Delete,
        admission::Operation::Connect => Operation::Connect,
    };

    Attributes {
        operation,
        resource: GroupResource::new(req.resource.group, req.resource.resource),
        subresource: req.sub_resource.filter(|sr| !sr.is_empty()),
        kind: GroupKind::new(req.kind.group, req.kind.kind),
        namespace: req.namespace.unwrap_or_default(),
        name: req.name,
        user: req.user_info,
        object: req.object,
        old_object: req.old_object,
    }
}

fn json_response(rsp: AdmissionReview) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        api::BuildObject, AccessQuery, AccessReview, LookupObject, ReviewAccess, WorkloadKind,
    };
    use prometheus_client::registry::Registry;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Default)]
    struct DenyAll(AtomicUsize);

    #[async_trait::async_trait]
    impl ReviewAccess for DenyAll {
        async fn review(&self, _: &AccessQuery) -> anyhow::Result<AccessReview> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(AccessReview {
                allowed: false,
                reason: None,
            })
        }
    }

    struct NotFound;

    #[async_trait::async_trait]
    impl LookupObject for NotFound {
        async fn get(
            &self,
            kind: WorkloadKind,
            _: &str,
            name: &str,
        ) -> anyhow::Result<BuildObject> {
            anyhow::bail!("{kind} {name:?} not found")
        }
    }

    fn mk_admission() -> (Admission, Arc<DenyAll>, Registry) {
        let reviewer = Arc::new(DenyAll::default());
        let gate = BuildByStrategy::new(reviewer.clone(), Arc::new(NotFound));
        let mut prom = Registry::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("build_admission"));
        (Admission::new(gate, metrics), reviewer, prom)
    }

    fn mk_request(operation: &str, resource: &str, kind: &str) -> AdmissionRequest {
        let review: Review = serde_json::from_value(serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "6f1d9a4e-0000-4000-8000-000000000000",
                "kind": { "group": "build.openshift.io", "version": "v1", "kind": kind },
                "resource": { "group": "build.openshift.io", "version": "v1", "resource": resource },
                "name": "build-0",
                "namespace": "ns-0",
                "operation": operation,
                "userInfo": {
                    "username": "alice",
                    "groups": ["developers", "system:authenticated"],
                },
                "object": {
                    "apiVersion": "build.openshift.io/v1",
                    "kind": kind,
                    "metadata": { "name": "build-0", "namespace": "ns-0" },
                    "spec": {
                        "strategy": {
                            "type": "Custom",
                            "customStrategy": { "from": { "name": "builder" } },
                        },
                    },
                },
                "oldObject": null,
                "dryRun": false,
            },
        }))
        .expect("review must parse");
        review.try_into().expect("review must have a request")
    }

    #[test]
    fn serves_as_a_cloneable_service() {
        fn assert_service<S>(_: &S)
        where
            S: tower::Service<Request<hyper::body::Incoming>, Response = Response<Body>>
                + Clone
                + Send
                + 'static,
            S::Future: Send,
        {
        }

        let (admission, _, _) = mk_admission();
        assert_service(&admission);
    }

    #[test]
    fn converts_request_attributes() {
        let attrs = attributes(mk_request("CREATE", "builds", "Build"));
        assert_eq!(attrs.operation, Operation::Create);
        assert_eq!(
            attrs.resource,
            GroupResource::new("build.openshift.io", "builds")
        );
        assert_eq!(attrs.subresource, None);
        assert_eq!(attrs.kind, GroupKind::new("build.openshift.io", "Build"));
        assert_eq!(attrs.namespace, "ns-0");
        assert_eq!(attrs.name, "build-0");
        assert_eq!(attrs.user.username.as_deref(), Some("alice"));
        assert!(attrs.object.is_some());
        assert!(attrs.old_object.is_none());
    }

    #[tokio::test]
    async fn denies_disallowed_strategy() {
        let (admission, reviewer, prom) = mk_admission();
        let rsp = admission
            .admit(mk_request("CREATE", "builds", "Build"))
            .await;

        let rsp = serde_json::to_value(&rsp).unwrap();
        assert_eq!(rsp["allowed"], false);
        assert_eq!(
            rsp["status"]["message"],
            "builds.build.openshift.io \"build-0\" is forbidden: build strategy Custom is not allowed"
        );
        assert_eq!(reviewer.0.load(Ordering::SeqCst), 1);

        let mut text = String::new();
        prometheus_client::encoding::text::encode(&mut text, &prom).unwrap();
        assert!(
            text.contains(
                "build_admission_decisions_total{resource=\"builds.build.openshift.io\",decision=\"denied\"} 1"
            ),
            "{text}"
        );
    }

    #[tokio::test]
    async fn skips_deletes() {
        let (admission, reviewer, _) = mk_admission();
        let rsp = admission
            .admit(mk_request("DELETE", "builds", "Build"))
            .await;

        let rsp = serde_json::to_value(&rsp).unwrap();
        assert_eq!(rsp["allowed"], true);
        assert_eq!(reviewer.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denies_unresolvable_build_request() {
        let (admission, reviewer, _) = mk_admission();
        let mut req = mk_request("CREATE", "buildconfigs", "BuildRequest");
        req.sub_resource = Some("instantiate".to_string());

        let rsp = serde_json::to_value(admission.admit(req).await).unwrap();
        assert_eq!(rsp["allowed"], false);
        let message = rsp["status"]["message"].as_str().unwrap();
        assert!(message.contains("not found"), "{message}");
        assert_eq!(reviewer.0.load(Ordering::SeqCst), 0);
    }
}
