//! Provided [`TypeSource`] implementations.

use crate::internal::Map;
use crate::introspect::{HolderInfo, TypeInfo};
use crate::key::Key;
use crate::traits::TypeSource;

pub mod linked;
pub use linked::{LinkedSource, FACTORY_HOLDERS, INJECTABLE_TYPES};

/// Explicit registration table.
///
/// Types added with [`add`](Self::add) are returned by `scan_injectable`;
/// types added with [`describe`](Self::describe) are only introspectable,
/// which is how a dependency the scanner did not report is still known.
/// Holders work the same way.
///
/// Adding a key twice replaces its description but keeps its scan position.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Catalog, Key, TypeInfo, TypeSource};
///
/// #[derive(Default)]
/// struct Clock;
/// struct Legacy;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .add(TypeInfo::injectable::<Clock>().default_constructor(Clock::default))
///     .describe(TypeInfo::unmarked::<Legacy>());
///
/// assert_eq!(catalog.scan_injectable(), vec![Key::of::<Clock>()]);
/// assert!(catalog.introspect(&Key::of::<Legacy>()).is_some());
/// ```
#[derive(Default, Clone)]
pub struct Catalog {
    scanned: Vec<Key>,
    types: Map<Key, TypeInfo>,
    scanned_holders: Vec<Key>,
    holders: Map<Key, HolderInfo>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type to the injectable scan.
    pub fn add(&mut self, info: impl Into<TypeInfo>) -> &mut Self {
        let info = info.into();
        if !self.scanned.contains(&info.key) {
            self.scanned.push(info.key);
        }
        self.types.insert(info.key, info);
        self
    }

    /// Makes a type introspectable without scanning it.
    pub fn describe(&mut self, info: impl Into<TypeInfo>) -> &mut Self {
        let info = info.into();
        self.types.insert(info.key, info);
        self
    }

    /// Adds a holder to the factory scan.
    pub fn add_holder(&mut self, info: impl Into<HolderInfo>) -> &mut Self {
        let info = info.into();
        if !self.scanned_holders.contains(&info.key) {
            self.scanned_holders.push(info.key);
        }
        self.holders.insert(info.key, info);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len() + self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeSource for Catalog {
    fn scan_injectable(&self) -> Vec<Key> {
        self.scanned.clone()
    }

    fn scan_factory_holders(&self) -> Vec<Key> {
        self.scanned_holders.clone()
    }

    fn introspect(&self, key: &Key) -> Option<TypeInfo> {
        self.types.get(key).cloned()
    }

    fn introspect_holder(&self, key: &Key) -> Option<HolderInfo> {
        self.holders.get(key).cloned()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("scanned", &self.scanned)
            .field("described", &self.types.len())
            .field("scanned_holders", &self.scanned_holders)
            .finish()
    }
}
