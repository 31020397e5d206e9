//! Resolver context for producer methods.

use std::cell::RefCell;

use crate::error::DiResult;
use crate::internal::ResolutionStack;
use crate::introspect::AnyArc;
use crate::key::Key;
use crate::traits::Resolver;

use super::Container;

/// Context passed to producer methods declared with
/// [`HolderBuilder::producer_with`](crate::HolderBuilder::producer_with).
///
/// It resolves against the same container and shares the resolution stack
/// of the call that invoked the producer, so cycles running through
/// producers are still caught.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Catalog, Container, HolderInfo, Resolver, TypeInfo};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Settings;
///
/// struct Client {
///     settings: Arc<Settings>,
/// }
///
/// #[derive(Default)]
/// struct Clients;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .add(TypeInfo::injectable::<Settings>().default_constructor(Settings::default))
///     .add_holder(
///         HolderInfo::factory::<Clients>()
///             .constructor(Clients::default)
///             .producer_with("client", |_: &Clients, ctx| {
///                 Ok(Client { settings: ctx.resolve::<Settings>()? })
///             }),
///     );
///
/// let container = Container::from_source(catalog).unwrap();
/// let client = container.resolve_required::<Client>();
/// assert!(Arc::ptr_eq(&client.settings, &container.resolve_required::<Settings>()));
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    stack: RefCell<&'a mut ResolutionStack>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container, stack: &'a mut ResolutionStack) -> Self {
        Self {
            container,
            stack: RefCell::new(stack),
        }
    }

    /// The container this context resolves against.
    pub fn container(&self) -> &Container {
        self.container
    }

    /// Number of types currently being built on this resolution path.
    pub fn depth(&self) -> usize {
        self.stack.borrow().depth()
    }
}

impl Resolver for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let mut stack = self.stack.borrow_mut();
        self.container.resolve_in(key, &mut **stack)
    }
}
