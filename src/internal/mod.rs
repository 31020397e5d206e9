//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod invoke;

pub(crate) use circular::{with_cycle_guard, PathId, ResolutionStack};
pub(crate) use invoke::invoke_guarded;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "ahash")]
pub(crate) type Set<K> = std::collections::HashSet<K, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Set<K> = std::collections::HashSet<K>;
