//! Plan descriptors for introspection and diagnostics.

use crate::key::Key;

/// How a resolvable type gets built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Injection constructor, dependencies passed as arguments
    Constructor,
    /// Zero-argument constructor followed by field assignment
    Fields,
    /// Producer method on a factory holder
    Producer,
}

/// Describes one resolvable type of a built container.
///
/// Returned by [`Container::descriptors`](crate::Container::descriptors),
/// sorted by type name.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{params, Catalog, Container, HolderInfo, Strategy, TypeInfo};
/// use std::sync::Arc;
///
/// struct Message(String);
///
/// struct Printer {
///     message: Arc<Message>,
/// }
///
/// #[derive(Default)]
/// struct Messages;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .add(TypeInfo::injectable::<Printer>().inject_constructor(params![Message], |args| {
///         Ok(Printer { message: args.next()? })
///     }))
///     .add_holder(
///         HolderInfo::factory::<Messages>()
///             .constructor(Messages::default)
///             .producer("message", |_: &Messages| Message("hi".into())),
///     );
///
/// let container = Container::from_source(catalog).unwrap();
/// let descriptors = container.descriptors();
///
/// let printer = descriptors.iter().find(|d| d.type_name().ends_with("Printer")).unwrap();
/// assert_eq!(printer.strategy, Strategy::Constructor);
/// assert_eq!(printer.dependencies.len(), 1);
///
/// let message = descriptors.iter().find(|d| d.is_produced()).unwrap();
/// assert!(message.producer.as_deref().unwrap().ends_with("Messages::message"));
/// ```
#[derive(Debug, Clone)]
pub struct PlanDescriptor {
    pub key: Key,
    pub strategy: Strategy,
    /// Dependencies in resolution order; empty for producers
    pub dependencies: Vec<Key>,
    /// `Holder::method` for produced types
    pub producer: Option<String>,
}

impl PlanDescriptor {
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    pub fn is_produced(&self) -> bool {
        self.strategy == Strategy::Producer
    }
}
