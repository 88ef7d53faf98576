#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use build_admission_controller_core as core;
pub use build_admission_controller_k8s_api as k8s;

mod admission;
mod args;
mod clients;
mod metrics;

pub use self::{
    admission::Admission,
    args::Args,
    clients::{ApiLookup, SubjectAccessReviewer},
    metrics::AdmissionMetrics,
};
