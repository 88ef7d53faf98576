use crate::core::GroupResource;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct AdmissionMetrics {
    decisions: Family<DecisionLabels, Counter>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    Allowed,
    Denied,
    Skipped,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct DecisionLabels {
    resource: String,
    decision: &'static str,
}

// === impl Decision ===

impl Decision {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::Skipped => "skipped",
        }
    }
}

// === impl AdmissionMetrics ===

impl AdmissionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let decisions = Family::<DecisionLabels, Counter>::default();
        reg.register(
            "decisions",
            "Total number of admission reviews by resource and decision",
            decisions.clone(),
        );
        Self { decisions }
    }

    pub(crate) fn observe(&self, resource: &GroupResource, decision: Decision) {
        self.decisions
            .get_or_create(&DecisionLabels {
                resource: resource.to_string(),
                decision: decision.as_str(),
            })
            .inc();
    }
}
