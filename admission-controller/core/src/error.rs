use crate::{attributes::GroupResource, workload::WorkloadKind, Attributes};
use std::fmt;
use thiserror::Error;

/// Why a request was not admitted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unrecognized build strategy: type {0:?}")]
    UnrecognizedStrategy(String),

    #[error("unrecognized request object {0}")]
    UnrecognizedObject(String),

    #[error("unknown resource type {0} for BuildRequest")]
    UnknownBuildRequestTarget(GroupResource),

    #[error("invalid {kind} object: {source}")]
    InvalidObject {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("build strategy {0} is not allowed")]
    NotAllowed(&'static str),

    #[error("failed to review access: {0}")]
    Review(#[source] anyhow::Error),

    #[error("failed to get {kind} {name}: {source}")]
    Lookup {
        kind: WorkloadKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to convert {kind} {name}: {source}")]
    Convert {
        kind: WorkloadKind,
        name: String,
        #[source]
        source: Box<Error>,
    },
}

/// Rejects an admission request, naming the resource and object under review.
#[derive(Debug, Error)]
pub struct Forbidden {
    resource: GroupResource,
    name: String,
    #[source]
    error: Error,
}

// === impl Forbidden ===

impl Forbidden {
    pub fn new(attrs: &Attributes, error: Error) -> Self {
        Self {
            resource: attrs.resource.clone(),
            name: attrs.name.clone(),
            error,
        }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }
}

impl fmt::Display for Forbidden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} is forbidden: {}", self.resource, self.error)
        } else {
            write!(
                f,
                "{} {:?} is forbidden: {}",
                self.resource, self.name, self.error
            )
        }
    }
}
