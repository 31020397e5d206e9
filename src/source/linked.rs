//! Link-time registration hooks.
//!
//! Crates submit introspection hooks into the distributed slices declared
//! here. [`LinkedSource::collect`] walks the slices once and serves the
//! results like any other [`TypeSource`].
//!
//! ```ignore
//! use ferrous_ioc::{TypeInfo, INJECTABLE_TYPES};
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! fn clock_info() -> TypeInfo {
//!     TypeInfo::injectable::<Clock>().default_constructor(Clock::default).build()
//! }
//!
//! #[linkme::distributed_slice(INJECTABLE_TYPES)]
//! static CLOCK: fn() -> TypeInfo = clock_info;
//! ```
//!
//! Slice order follows the linker, so producers for the same type coming
//! from different hooks should not rely on which one is first.

use linkme::distributed_slice;

use crate::introspect::{HolderInfo, TypeInfo};
use crate::key::Key;
use crate::source::Catalog;
use crate::traits::TypeSource;

/// Hooks describing injectable types.
#[distributed_slice]
pub static INJECTABLE_TYPES: [fn() -> TypeInfo] = [..];

/// Hooks describing factory holders.
#[distributed_slice]
pub static FACTORY_HOLDERS: [fn() -> HolderInfo] = [..];

/// [`TypeSource`] over everything submitted to the link-time slices.
#[derive(Debug, Clone)]
pub struct LinkedSource {
    catalog: Catalog,
}

impl LinkedSource {
    /// Runs every submitted hook.
    ///
    /// Hooks returning an unmarked `TypeInfo` are only described, not scanned.
    pub fn collect() -> Self {
        let mut catalog = Catalog::new();
        for hook in INJECTABLE_TYPES {
            let info = hook();
            if info.is_injectable() {
                catalog.add(info);
            } else {
                catalog.describe(info);
            }
        }
        for hook in FACTORY_HOLDERS {
            catalog.add_holder(hook());
        }
        tracing::debug!(
            injectable = INJECTABLE_TYPES.len(),
            holders = FACTORY_HOLDERS.len(),
            "collected linked type hooks"
        );
        Self { catalog }
    }

    /// The collected hooks as an editable table.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

impl TypeSource for LinkedSource {
    fn scan_injectable(&self) -> Vec<Key> {
        self.catalog.scan_injectable()
    }

    fn scan_factory_holders(&self) -> Vec<Key> {
        self.catalog.scan_factory_holders()
    }

    fn introspect(&self, key: &Key) -> Option<TypeInfo> {
        self.catalog.introspect(key)
    }

    fn introspect_holder(&self, key: &Key) -> Option<HolderInfo> {
        self.catalog.introspect_holder(key)
    }
}
