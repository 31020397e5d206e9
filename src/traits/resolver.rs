//! Resolver traits for instance resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::introspect::AnyArc;
use crate::key::Key;

/// Resolution interface shared by [`Container`](crate::Container) and
/// [`ResolverContext`](crate::ResolverContext).
///
/// Only [`resolve_any`](Self::resolve_any) is required; the typed methods
/// downcast its result.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Catalog, Container, HolderInfo, Resolver};
/// use std::sync::Arc;
///
/// struct Greeting(String);
///
/// #[derive(Default)]
/// struct Greetings;
///
/// let mut catalog = Catalog::new();
/// catalog.add_holder(
///     HolderInfo::factory::<Greetings>()
///         .constructor(Greetings::default)
///         .producer("greeting", |_: &Greetings| Greeting("hi".to_string())),
/// );
///
/// let container = Container::from_source(catalog).unwrap();
/// let first = container.resolve::<Greeting>().unwrap();
/// let second = container.resolve_required::<Greeting>();
/// assert_eq!(first.0, "hi");
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub trait Resolver {
    /// Resolves the type-erased instance for `key`.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves the single instance of `T`.
    fn resolve<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>>
    where
        Self: Sized,
    {
        let key = Key::of::<T>();
        self.resolve_any(&key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(key.display_name()))
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the formatted `DiError` if `T` cannot be resolved.
    fn resolve_required<T: Send + Sync + 'static>(&self) -> Arc<T>
    where
        Self: Sized,
    {
        match self.resolve::<T>() {
            Ok(instance) => instance,
            Err(err) => panic!("failed to resolve {}: {}", std::any::type_name::<T>(), err),
        }
    }
}
