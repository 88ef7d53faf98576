use crate::{access::ReviewAccess, resolve::LookupObject, BuildByStrategy};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;

/// Creates an uninitialized plugin. Plugins take no configuration.
pub type Factory = fn() -> Builder;

/// A registry of admission plugins, by name.
#[derive(Debug, Default)]
pub struct Plugins {
    factories: BTreeMap<&'static str, Factory>,
}

/// Collects the clients a [`BuildByStrategy`] gate needs.
#[derive(Clone, Default)]
pub struct Builder {
    reviewer: Option<Arc<dyn ReviewAccess>>,
    lookup: Option<Arc<dyn LookupObject>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitError {
    #[error("unknown admission plugin: {0}")]
    UnknownPlugin(String),

    #[error("{} needs a build lookup client", BuildByStrategy::NAME)]
    MissingLookup,

    #[error("{} needs a subject access review client", BuildByStrategy::NAME)]
    MissingReviewer,
}

/// Registers the [`BuildByStrategy`] plugin.
pub fn register(plugins: &mut Plugins) {
    plugins.register(BuildByStrategy::NAME, Builder::default);
}

// === impl Plugins ===

impl Plugins {
    pub fn register(&mut self, name: &'static str, factory: Factory) {
        self.factories.insert(name, factory);
    }

    pub fn new_from_plugins(&self, name: &str) -> Result<Builder, InitError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| InitError::UnknownPlugin(name.to_string()))?;
        Ok(factory())
    }
}

// === impl Builder ===

impl Builder {
    pub fn with_reviewer(self, reviewer: Arc<dyn ReviewAccess>) -> Self {
        Self {
            reviewer: Some(reviewer),
            ..self
        }
    }

    pub fn with_lookup(self, lookup: Arc<dyn LookupObject>) -> Self {
        Self {
            lookup: Some(lookup),
            ..self
        }
    }

    /// Fails unless both clients have been provided.
    pub fn build(self) -> Result<BuildByStrategy, InitError> {
        let lookup = self.lookup.ok_or(InitError::MissingLookup)?;
        let reviewer = self.reviewer.ok_or(InitError::MissingReviewer)?;
        Ok(BuildByStrategy::new(reviewer, lookup))
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("reviewer", &self.reviewer.is_some())
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}
