use crate::api::{self, ObjectMeta, UserInfo};
use kube::core::DynamicObject;
use std::{collections::BTreeMap, fmt};

pub const BUILDS: &str = "builds";
pub const BUILD_CONFIGS: &str = "buildconfigs";

/// The kind of operation an admission request performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

/// Identifies a resource type, without a version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

/// Identifies an object kind, without a version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

/// Describes a single admission request.
///
/// Built by the host for each request and read, never modified, by the gate.
#[derive(Clone, Debug)]
pub struct Attributes {
    pub operation: Operation,
    pub resource: GroupResource,
    pub subresource: Option<String>,
    pub kind: GroupKind,
    pub namespace: String,
    pub name: String,
    pub user: UserInfo,
    pub object: Option<DynamicObject>,
    pub old_object: Option<DynamicObject>,
}

// === impl Operation ===

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("CREATE"),
            Self::Update => f.write_str("UPDATE"),
            Self::Delete => f.write_str("DELETE"),
            Self::Connect => f.write_str("CONNECT"),
        }
    }
}

// === impl GroupResource ===

impl GroupResource {
    pub fn new(group: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }

    /// Returns the build resource this identifies (`builds` or
    /// `buildconfigs`), if any.
    pub fn build_resource(&self) -> Option<&str> {
        if !api::is_build_group(&self.group) {
            return None;
        }
        match self.resource.as_str() {
            r @ (BUILDS | BUILD_CONFIGS) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            return f.write_str(&self.resource);
        }
        write!(f, "{}.{}", self.resource, self.group)
    }
}

// === impl GroupKind ===

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            return f.write_str(&self.kind);
        }
        write!(f, "{}.{}", self.kind, self.group)
    }
}

// === impl Attributes ===

impl Attributes {
    /// Returns true if this is an update that only changes the fields the
    /// garbage collector manages.
    pub fn is_only_mutating_gc_fields(&self) -> bool {
        match (&self.object, &self.old_object) {
            (Some(obj), Some(old)) => is_only_mutating_gc_fields(obj, old),
            _ => false,
        }
    }
}

/// Compares `obj` with `old` after copying the owner references, finalizers,
/// self link and managed fields of `old` onto a copy of `obj`.
///
/// Managed fields are rewritten by the API server for every write, including
/// the garbage collector's, before a webhook sees the object. Empty and absent
/// collections compare equal.
pub fn is_only_mutating_gc_fields(obj: &DynamicObject, old: &DynamicObject) -> bool {
    let mut copied = obj.metadata.clone();
    copied.owner_references = old.metadata.owner_references.clone();
    copied.finalizers = old.metadata.finalizers.clone();
    copied.self_link = old.metadata.self_link.clone();
    copied.managed_fields = old.metadata.managed_fields.clone();

    obj.types == old.types
        && normalize(copied) == normalize(old.metadata.clone())
        && obj.data == old.data
}

fn normalize(mut meta: ObjectMeta) -> ObjectMeta {
    fn none_if_empty<T: IsEmpty>(field: &mut Option<T>) {
        if field.as_ref().is_some_and(IsEmpty::is_empty) {
            *field = None;
        }
    }

    none_if_empty(&mut meta.labels);
    none_if_empty(&mut meta.annotations);
    none_if_empty(&mut meta.finalizers);
    none_if_empty(&mut meta.owner_references);
    none_if_empty(&mut meta.managed_fields);
    meta
}

trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<K, V> IsEmpty for BTreeMap<K, V> {
    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}
