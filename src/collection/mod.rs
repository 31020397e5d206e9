//! Container builder module.
//!
//! This module contains the [`ContainerBuilder`], which walks a
//! [`TypeSource`], registers factory holders and construction plans, and
//! finally produces a [`Container`].

use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::factories::{FactoryRegistry, ProducerMethod};
use crate::internal::{invoke_guarded, Set};
use crate::introspect::{AnyArc, HolderInfo};
use crate::key::Key;
use crate::provider::Container;
use crate::registration::PlanStore;
use crate::traits::TypeSource;

mod graph;

use graph::{GraphBuilder, Ledger, Visit};

/// Registration phase of a container.
///
/// Factory holders are checked first and their produced types recorded, so
/// that injectable types may depend on produced types. Each injectable root
/// is then registered together with its transitive dependencies, and only
/// then are the holders instantiated. All structural errors (missing
/// markers, missing constructors, cycles) surface before any holder
/// constructor runs.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Catalog, ContainerBuilder, ContainerOptions, Resolver, TypeInfo};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let mut catalog = Catalog::new();
/// catalog.describe(TypeInfo::injectable::<Clock>().default_constructor(Clock::default));
///
/// let mut builder = ContainerBuilder::new(catalog)
///     .with_options(ContainerOptions::default().with_max_depth(16));
/// builder.register::<Clock>().unwrap();
///
/// let container = builder.build();
/// assert!(container.resolve::<Clock>().is_ok());
/// ```
pub struct ContainerBuilder {
    source: Box<dyn TypeSource>,
    options: ContainerOptions,
    plans: PlanStore,
    factories: FactoryRegistry,
    /// Produced by holders checked but not instantiated yet
    declared: Set<Key>,
    ledger: Ledger,
}

impl ContainerBuilder {
    pub fn new<S: TypeSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            options: ContainerOptions::default(),
            plans: PlanStore::new(),
            factories: FactoryRegistry::new(),
            declared: Set::default(),
            ledger: Ledger::default(),
        }
    }

    pub fn with_options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Instantiates every scanned factory holder and binds its producers.
    ///
    /// Holders registered by an earlier call are skipped.
    pub fn register_factories(&mut self) -> DiResult<&mut Self> {
        let pending = self.declare_factories()?;
        self.instantiate_factories(pending)?;
        Ok(self)
    }

    /// Checks the scanned holders not registered yet and records what they
    /// produce. Nothing is instantiated.
    fn declare_factories(&mut self) -> DiResult<Vec<(Key, HolderInfo)>> {
        let mut pending = Vec::new();
        for key in self.source.scan_factory_holders() {
            if self.factories.contains_holder(&key) {
                continue;
            }
            let name = key.display_name();
            let info = self
                .source
                .introspect_holder(&key)
                .filter(|info| info.is_factory())
                .ok_or(DiError::UnsupportedClass(name))?;
            if info.constructor.is_none() {
                return Err(DiError::NoSuitableConstructor(name));
            }
            pending.push((key, info));
        }

        self.declared.extend(
            pending
                .iter()
                .flat_map(|(_, info)| info.producers.iter().map(|p| p.produces)),
        );
        Ok(pending)
    }

    fn instantiate_factories(&mut self, pending: Vec<(Key, HolderInfo)>) -> DiResult<()> {
        let result = pending
            .iter()
            .try_for_each(|(key, info)| self.instantiate_holder(key, info));
        self.declared.clear();
        result
    }

    /// Builds one holder and binds all of its producers, or none of them.
    fn instantiate_holder(&mut self, key: &Key, info: &HolderInfo) -> DiResult<()> {
        let name = key.display_name();
        let constructor = info
            .constructor
            .as_ref()
            .ok_or(DiError::NoSuitableConstructor(name))?;

        let holder: AnyArc = Arc::from(invoke_guarded(name, || constructor())?);
        let methods = info
            .producers
            .iter()
            .map(|producer| ProducerMethod::bind(key, holder.clone(), producer))
            .collect();
        self.factories
            .add_producers(methods, self.options.duplicate_producers)?;
        self.factories.insert_holder(*key, holder);

        tracing::debug!(
            holder = name,
            producers = info.producers.len(),
            "registered factory holder"
        );
        Ok(())
    }

    /// Registers `T` and its transitive dependencies.
    pub fn register<T: 'static>(&mut self) -> DiResult<&mut Self> {
        self.register_key(&Key::of::<T>())
    }

    pub fn register_key(&mut self, key: &Key) -> DiResult<&mut Self> {
        GraphBuilder::new(
            self.source.as_ref(),
            &mut self.plans,
            &mut self.ledger,
            &self.factories,
            &self.declared,
            self.options.max_depth,
        )
        .register(key)?;
        Ok(self)
    }

    /// Whether `T` has a construction plan.
    pub fn is_registered<T: 'static>(&self) -> bool {
        let key = Key::of::<T>();
        self.ledger.state(&key) == Some(Visit::Done) && self.plans.contains_key(&key)
    }

    /// Registers all factory holders and every scanned injectable type, and
    /// builds the container.
    ///
    /// The graph walk sees the types holders produce, but the holders are
    /// only instantiated once every injectable type has been registered.
    pub fn register_all(mut self) -> DiResult<Container> {
        let pending = self.declare_factories()?;
        for key in self.source.scan_injectable() {
            self.register_key(&key)?;
        }
        self.instantiate_factories(pending)?;
        Ok(self.build())
    }

    /// Builds the container from what has been registered so far.
    pub fn build(self) -> Container {
        Container::new(self.plans, self.factories, self.options)
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("options", &self.options)
            .field("plans", &self.plans.len())
            .field("holders", &self.factories.holder_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicateProducers;
    use crate::introspect::TypeInfo;
    use crate::source::Catalog;
    use crate::traits::Resolver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Holder;

    struct Made;

    #[test]
    fn holders_are_registered_once() {
        static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

        let mut catalog = Catalog::new();
        catalog.add_holder(
            HolderInfo::factory::<Holder>()
                .constructor(|| {
                    CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                    Holder
                })
                .producer("made", |_: &Holder| Made),
        );

        let mut builder = ContainerBuilder::new(catalog);
        builder.register_factories().unwrap();
        builder.register_factories().unwrap();
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);

        let container = builder.build();
        assert!(container.resolve::<Made>().is_ok());
    }

    #[test]
    fn register_marks_types_done() {
        let mut catalog = Catalog::new();
        catalog.describe(TypeInfo::injectable::<Holder>().default_constructor(Holder::default));

        let mut builder = ContainerBuilder::new(catalog);
        assert!(!builder.is_registered::<Holder>());
        builder.register::<Holder>().unwrap().register::<Holder>().unwrap();
        assert!(builder.is_registered::<Holder>());
    }

    #[test]
    fn rejected_holder_can_be_retried() {
        struct Other;

        #[derive(Default)]
        struct Rival;

        let mut catalog = Catalog::new();
        catalog
            .add_holder(
                HolderInfo::factory::<Holder>()
                    .constructor(Holder::default)
                    .producer("made", |_: &Holder| Made),
            )
            .add_holder(
                HolderInfo::factory::<Rival>()
                    .constructor(Rival::default)
                    .producer("other", |_: &Rival| Other)
                    .producer("made", |_: &Rival| Made),
            );

        let mut builder = ContainerBuilder::new(catalog)
            .with_options(ContainerOptions::default().with_duplicate_producers(DuplicateProducers::Reject));

        for _ in 0..2 {
            match builder.register_factories() {
                Err(DiError::DuplicateProducer { first, second, .. }) => {
                    assert!(first.ends_with("Holder::made"), "{}", first);
                    assert!(second.ends_with("Rival::made"), "{}", second);
                }
                other => panic!("expected DuplicateProducer, got {:?}", other.map(|_| ())),
            }
            assert!(!builder.factories.provides(&Key::of::<Other>()));
            assert!(!builder.factories.contains_holder(&Key::of::<Rival>()));
        }
        assert!(builder.declared.is_empty());
    }

    #[test]
    fn unmarked_holder_is_unsupported() {
        let mut catalog = Catalog::new();
        catalog.add_holder(HolderInfo::unmarked::<Holder>().constructor(Holder::default));

        match ContainerBuilder::new(catalog).register_all() {
            Err(DiError::UnsupportedClass(name)) => assert!(name.ends_with("Holder")),
            other => panic!("expected UnsupportedClass, got {:?}", other.map(|_| ())),
        }
    }
}
