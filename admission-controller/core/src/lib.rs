#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod access;
mod attributes;
mod error;
mod gate;
pub mod plugin;
pub mod resolve;
mod strategy;
mod workload;


pub use self::{
    access::{AccessClient, AccessQuery, AccessReview, ReviewAccess},
    attributes::{is_only_mutating_gc_fields, Attributes, GroupKind, GroupResource, Operation},
    error::{Error, Forbidden},
    gate::BuildByStrategy,
    plugin::{register, Builder, InitError, Plugins},
    resolve::{LookupObject, Resolver},
    strategy::{ImageOptimizationPolicy, Strategy, StrategyResource},
    workload::{Workload, WorkloadKind},
};
pub use build_admission_controller_k8s_api as api;
