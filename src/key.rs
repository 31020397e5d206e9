//! Type identity keys for the container.

use std::any::TypeId;
use std::fmt;

/// Key naming a concrete type in the container.
///
/// Every store in the container (construction plans, producer methods and
/// the instance cache) is indexed by `Key`. Identity is the `TypeId`; the
/// type name only travels along for error messages and diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Key, key_of_type};
///
/// struct Database;
///
/// let key = key_of_type::<Database>();
/// assert_eq!(key, Key::of::<Database>());
/// assert!(key.display_name().ends_with("Database"));
/// assert_ne!(key, key_of_type::<String>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key of the concrete type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Get the type name for display
    ///
    /// This is the `std::any::type_name` result and is not guaranteed to be
    /// stable across compiler versions.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// The `TypeId` this key stands for.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Identity is the TypeId alone, the name is diagnostic only
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Readable ordering for descriptor listings; the id breaks ties between
// distinct types that print the same.
impl Ord for Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(other.name).then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Alpha;
    struct Beta;

    #[test]
    fn equality_follows_type_id() {
        assert_eq!(key_of_type::<Alpha>(), key_of_type::<Alpha>());
        assert_ne!(key_of_type::<Alpha>(), key_of_type::<Beta>());

        let mut set = HashSet::new();
        set.insert(key_of_type::<Alpha>());
        set.insert(key_of_type::<Alpha>());
        set.insert(key_of_type::<Beta>());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ordering_is_by_name() {
        let mut keys = vec![key_of_type::<Beta>(), key_of_type::<Alpha>()];
        keys.sort();
        assert!(keys[0].display_name().ends_with("Alpha"));
        assert!(keys[1].display_name().ends_with("Beta"));
    }

    #[test]
    fn display_prints_type_name() {
        assert_eq!(key_of_type::<u32>().to_string(), "u32");
    }
}
