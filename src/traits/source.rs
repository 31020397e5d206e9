//! Discovery and introspection collaborator.

use crate::introspect::{HolderInfo, TypeInfo};
use crate::key::Key;

/// Where the container learns which types exist and how to build them.
///
/// This is the seam to whatever discovers marked types: an explicit
/// [`Catalog`](crate::Catalog), link-time hooks collected by
/// [`LinkedSource`](crate::LinkedSource), or generated code.
///
/// Scan results are ordered. The container registers in that order, which
/// is what makes "first-registered producer wins" deterministic.
pub trait TypeSource: Send + Sync {
    /// Types eligible for graph registration.
    fn scan_injectable(&self) -> Vec<Key>;

    /// Types eligible for factory registration.
    fn scan_factory_holders(&self) -> Vec<Key>;

    /// Describes a type, or `None` if the source knows nothing about it.
    fn introspect(&self, key: &Key) -> Option<TypeInfo>;

    /// Describes a factory holder type and its producer methods.
    fn introspect_holder(&self, key: &Key) -> Option<HolderInfo>;
}

impl<S: TypeSource + ?Sized> TypeSource for std::sync::Arc<S> {
    fn scan_injectable(&self) -> Vec<Key> {
        (**self).scan_injectable()
    }

    fn scan_factory_holders(&self) -> Vec<Key> {
        (**self).scan_factory_holders()
    }

    fn introspect(&self, key: &Key) -> Option<TypeInfo> {
        (**self).introspect(key)
    }

    fn introspect_holder(&self, key: &Key) -> Option<HolderInfo> {
        (**self).introspect_holder(key)
    }
}
