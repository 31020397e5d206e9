//! Container module for resolving registered types.
//!
//! This module contains the [`Container`] produced by a
//! [`ContainerBuilder`](crate::ContainerBuilder) and the resolution logic
//! that turns construction plans and producer methods into cached instances.

use std::sync::Arc;

use crate::collection::ContainerBuilder;
use crate::config::ContainerOptions;
use crate::descriptors::{PlanDescriptor, Strategy};
use crate::error::{DiError, DiResult};
use crate::factories::{FactoryRegistry, ProducerMethod};
use crate::internal::{invoke_guarded, with_cycle_guard, ResolutionStack};
use crate::introspect::{AnyArc, Args};
use crate::key::Key;
use crate::registration::{ConstructionPlan, PlanStore};
use crate::traits::{Resolver, TypeSource};

mod cache;
pub mod context;
pub use context::ResolverContext;

use cache::{Entry, InstanceCache};

/// Dependency injection container.
///
/// Every resolvable type has exactly one instance per container. The first
/// `resolve` of a type builds it (recursively building its dependencies),
/// later ones return the cached `Arc`. Construction is at-most-once even
/// when several threads ask for the same type at the same time.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone; clones share the same
/// plans and the same instances.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{params, Catalog, Container, Resolver, TypeInfo};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Database;
///
/// struct UserService {
///     db: Arc<Database>,
/// }
///
/// let mut catalog = Catalog::new();
/// catalog
///     .add(TypeInfo::injectable::<Database>().default_constructor(Database::default))
///     .add(TypeInfo::injectable::<UserService>().inject_constructor(params![Database], |args| {
///         Ok(UserService { db: args.next()? })
///     }));
///
/// let container = Container::from_source(catalog).unwrap();
/// let users = container.resolve_required::<UserService>();
/// assert!(Arc::ptr_eq(&users.db, &container.resolve_required::<Database>()));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    plans: PlanStore,
    factories: FactoryRegistry,
    cache: InstanceCache,
    options: ContainerOptions,
}

/// What builds a given key.
enum Origin<'a> {
    Plan(&'a ConstructionPlan),
    Producer(&'a ProducerMethod),
}

impl Container {
    /// Starts a builder over `source`.
    pub fn builder<S: TypeSource + 'static>(source: S) -> ContainerBuilder {
        ContainerBuilder::new(source)
    }

    /// Registers every factory holder and injectable type `source` reports.
    ///
    /// Shorthand for `Container::builder(source).register_all()`.
    pub fn from_source<S: TypeSource + 'static>(source: S) -> DiResult<Self> {
        ContainerBuilder::new(source).register_all()
    }

    pub(crate) fn new(plans: PlanStore, factories: FactoryRegistry, options: ContainerOptions) -> Self {
        tracing::debug!(
            plans = plans.len(),
            holders = factories.holder_count(),
            "container built"
        );
        Self {
            inner: Arc::new(ContainerInner {
                plans,
                factories,
                cache: InstanceCache::new(),
                options,
            }),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Whether `T` can be resolved.
    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_key(&Key::of::<T>())
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.inner.plans.contains_key(key) || self.inner.factories.provides(key)
    }

    /// Number of instances built so far.
    pub fn cached_count(&self) -> usize {
        self.inner.cache.len()
    }

    /// Describes every resolvable type.
    ///
    /// A type with both a plan and a producer is built from its plan, so
    /// only the plan is listed.
    pub fn descriptors(&self) -> Vec<PlanDescriptor> {
        let mut out: Vec<PlanDescriptor> = self
            .inner
            .plans
            .iter()
            .map(|(key, plan)| PlanDescriptor {
                key: *key,
                strategy: plan.strategy(),
                dependencies: plan.dependencies(),
                producer: None,
            })
            .collect();

        out.extend(
            self.inner
                .factories
                .producers()
                .filter(|m| !self.inner.plans.contains_key(&m.produces))
                .map(|m| PlanDescriptor {
                    key: m.produces,
                    strategy: Strategy::Producer,
                    dependencies: Vec::new(),
                    producer: Some(m.qualified_name()),
                }),
        );

        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        for d in self.descriptors() {
            let built = if self.inner.cache.get(&d.key).is_some() { "built" } else { "pending" };
            match &d.producer {
                Some(producer) => {
                    s.push_str(&format!("  {}: {:?} via {} [{}]\n", d.key, d.strategy, producer, built));
                }
                None => {
                    let deps: Vec<&str> = d.dependencies.iter().map(|k| k.display_name()).collect();
                    s.push_str(&format!(
                        "  {}: {:?} [{}] <- [{}]\n",
                        d.key,
                        d.strategy,
                        built,
                        deps.join(", ")
                    ));
                }
            }
        }
        s
    }

    fn origin(&self, key: &Key) -> Option<Origin<'_>> {
        if let Some(plan) = self.inner.plans.get(key) {
            return Some(Origin::Plan(plan));
        }
        self.inner.factories.producer_for(key).map(Origin::Producer)
    }

    /// Resolves `key` on an existing resolution path.
    pub(crate) fn resolve_in(&self, key: &Key, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        if let Some(hit) = self.inner.cache.get(key) {
            tracing::trace!(type_name = key.display_name(), "cache hit");
            return Ok(hit);
        }

        let origin = self
            .origin(key)
            .ok_or(DiError::UnsupportedClass(key.display_name()))?;

        with_cycle_guard(stack, key, |stack| {
            let slot = match self.inner.cache.acquire(key, stack.id()) {
                Ok(Entry::Ready(value)) => return Ok(value),
                Ok(Entry::Vacant(slot)) => slot,
                Err(chain) => return Err(stack.wait_cycle(&chain)),
            };
            slot.fill(|| self.construct(key, &origin, stack))
        })
    }

    fn construct(&self, key: &Key, origin: &Origin<'_>, stack: &mut ResolutionStack) -> DiResult<AnyArc> {
        let name = key.display_name();

        let instance = match origin {
            Origin::Plan(ConstructionPlan::Constructor { params, invoke }) => {
                let mut values = Vec::with_capacity(params.len());
                for param in params {
                    values.push(self.resolve_in(param, stack)?);
                }
                let mut args = Args::new(name, values);
                let boxed = invoke_guarded(name, || invoke(&mut args))?;
                AnyArc::from(boxed)
            }
            Origin::Plan(ConstructionPlan::Fields { construct, fields }) => {
                let mut boxed = invoke_guarded(name, || construct())?;
                for field in fields {
                    let value = self.resolve_in(&field.dependency, stack)?;
                    invoke_guarded(name, || (field.assign)(boxed.as_mut(), value)).map_err(|err| {
                        let source = match err {
                            DiError::ConstructionFailure { source, .. } => source,
                            other => Arc::new(other),
                        };
                        DiError::FieldInjection {
                            owner: name,
                            field: field.name,
                            source,
                        }
                    })?;
                }
                AnyArc::from(boxed)
            }
            Origin::Producer(method) => {
                let ctx = ResolverContext::new(self, stack);
                invoke_guarded(name, || (method.invoke)(method.holder.as_ref(), &ctx))?
            }
        };

        tracing::debug!(
            type_name = name,
            strategy = ?self.strategy_of(origin),
            "constructed instance"
        );
        Ok(instance)
    }

    fn strategy_of(&self, origin: &Origin<'_>) -> Strategy {
        match origin {
            Origin::Plan(plan) => plan.strategy(),
            Origin::Producer(_) => Strategy::Producer,
        }
    }
}

impl Resolver for Container {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let mut stack = ResolutionStack::new(self.inner.options.max_depth);
        self.resolve_in(key, &mut stack)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("plans", &self.inner.plans.len())
            .field("holders", &self.inner.factories.holder_count())
            .field("cached", &self.inner.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{HolderInfo, TypeInfo};
    use crate::params;
    use crate::source::Catalog;

    #[derive(Default)]
    struct Clock;

    struct Journal {
        clock: Arc<Clock>,
    }

    #[derive(Default)]
    struct Stamp(u64);

    #[derive(Default)]
    struct Stamps;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add(TypeInfo::injectable::<Clock>().default_constructor(Clock::default))
            .add(
                TypeInfo::injectable::<Journal>()
                    .inject_constructor(params![Clock], |args| Ok(Journal { clock: args.next()? })),
            )
            .add_holder(
                HolderInfo::factory::<Stamps>()
                    .constructor(Stamps::default)
                    .producer("stamp", |_: &Stamps| Stamp(7)),
            );
        catalog
    }

    #[test]
    fn cache_fills_lazily() {
        let container = Container::from_source(catalog()).unwrap();
        assert_eq!(container.cached_count(), 0);

        let journal = container.resolve::<Journal>().unwrap();
        assert_eq!(container.cached_count(), 2);
        assert!(Arc::ptr_eq(&journal.clock, &container.resolve::<Clock>().unwrap()));
    }

    #[test]
    fn unknown_key_leaves_no_cache_entry() {
        struct Unknown;
        let container = Container::from_source(catalog()).unwrap();

        assert!(matches!(
            container.resolve::<Unknown>(),
            Err(DiError::UnsupportedClass(name)) if name.ends_with("Unknown")
        ));
        assert_eq!(container.cached_count(), 0);
        assert!(!container.contains::<Unknown>());
    }

    #[test]
    fn descriptors_cover_plans_and_producers() {
        let container = Container::from_source(catalog()).unwrap();
        let descriptors = container.descriptors();

        assert_eq!(descriptors.len(), 3);
        let stamp = descriptors.iter().find(|d| d.key == Key::of::<Stamp>()).unwrap();
        assert_eq!(stamp.strategy, Strategy::Producer);
        assert!(stamp.producer.as_deref().unwrap().ends_with("Stamps::stamp"));

        let journal = descriptors.iter().find(|d| d.key == Key::of::<Journal>()).unwrap();
        assert_eq!(journal.dependencies, vec![Key::of::<Clock>()]);
        assert_eq!(container.resolve::<Stamp>().unwrap().0, 7);
    }

    #[test]
    fn clones_share_instances() {
        let container = Container::from_source(catalog()).unwrap();
        let other = container.clone();
        assert!(Arc::ptr_eq(
            &container.resolve::<Clock>().unwrap(),
            &other.resolve::<Clock>().unwrap()
        ));
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn debug_string_lists_every_type() {
        let container = Container::from_source(catalog()).unwrap();
        container.resolve::<Clock>().unwrap();

        let dump = container.to_debug_string();
        assert!(dump.contains("Journal"));
        assert!(dump.contains("Stamps::stamp"));
        assert!(dump.contains("[built]"));
    }
}
