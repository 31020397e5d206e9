//! Factory holders and the producer methods bound to them.

use crate::config::DuplicateProducers;
use crate::error::{DiError, DiResult};
use crate::internal::Map;
use crate::introspect::{AnyArc, ProducerFn, ProducerInfo};
use crate::key::Key;

/// A producer method bound to the holder instance that owns it.
#[derive(Clone)]
pub(crate) struct ProducerMethod {
    pub(crate) holder_name: &'static str,
    pub(crate) name: &'static str,
    pub(crate) produces: Key,
    pub(crate) holder: AnyArc,
    pub(crate) invoke: ProducerFn,
}

impl ProducerMethod {
    pub(crate) fn bind(holder_key: &Key, holder: AnyArc, info: &ProducerInfo) -> Self {
        Self {
            holder_name: holder_key.display_name(),
            name: info.name,
            produces: info.produces,
            holder,
            invoke: info.invoke.clone(),
        }
    }

    /// `Holder::method`, for logs and errors.
    pub(crate) fn qualified_name(&self) -> String {
        format!("{}::{}", self.holder_name, self.name)
    }
}

/// Holder instances plus producer methods indexed by produced type.
#[derive(Default)]
pub(crate) struct FactoryRegistry {
    holders: Map<Key, AnyArc>,
    producers: Map<Key, ProducerMethod>,
}

impl FactoryRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains_holder(&self, key: &Key) -> bool {
        self.holders.contains_key(key)
    }

    pub(crate) fn insert_holder(&mut self, key: Key, holder: AnyArc) {
        self.holders.insert(key, holder);
    }

    /// Adds a bound producer.
    ///
    /// The first producer registered for a type keeps the binding. Later ones
    /// are ignored under [`DuplicateProducers::FirstWins`] and rejected under
    /// [`DuplicateProducers::Reject`].
    pub(crate) fn add_producer(
        &mut self,
        method: ProducerMethod,
        policy: DuplicateProducers,
    ) -> DiResult<()> {
        if let Some(existing) = self.producers.get(&method.produces) {
            return match policy {
                DuplicateProducers::FirstWins => {
                    tracing::warn!(
                        type_name = method.produces.display_name(),
                        kept = %existing.qualified_name(),
                        ignored = %method.qualified_name(),
                        "duplicate producer ignored"
                    );
                    Ok(())
                }
                DuplicateProducers::Reject => Err(DiError::DuplicateProducer {
                    produced: method.produces.display_name(),
                    first: existing.qualified_name(),
                    second: method.qualified_name(),
                }),
            };
        }

        tracing::debug!(
            type_name = method.produces.display_name(),
            holder = method.holder_name,
            producer = method.name,
            "bound producer method"
        );
        self.producers.insert(method.produces, method);
        Ok(())
    }

    /// Adds every producer of one holder, or none of them.
    ///
    /// Under [`DuplicateProducers::Reject`] the whole batch is checked, against
    /// bound producers and against itself, before anything is bound.
    pub(crate) fn add_producers(
        &mut self,
        methods: Vec<ProducerMethod>,
        policy: DuplicateProducers,
    ) -> DiResult<()> {
        if policy == DuplicateProducers::Reject {
            for (i, method) in methods.iter().enumerate() {
                let earlier = self
                    .producers
                    .get(&method.produces)
                    .or_else(|| methods[..i].iter().find(|m| m.produces == method.produces));
                if let Some(existing) = earlier {
                    return Err(DiError::DuplicateProducer {
                        produced: method.produces.display_name(),
                        first: existing.qualified_name(),
                        second: method.qualified_name(),
                    });
                }
            }
        }

        for method in methods {
            self.add_producer(method, policy)?;
        }
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn producer_for(&self, key: &Key) -> Option<&ProducerMethod> {
        self.producers.get(key)
    }

    pub(crate) fn provides(&self, key: &Key) -> bool {
        self.producers.contains_key(key)
    }

    pub(crate) fn producers(&self) -> impl Iterator<Item = &ProducerMethod> {
        self.producers.values()
    }

    pub(crate) fn holder_count(&self) -> usize {
        self.holders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::HolderInfo;
    use crate::key::key_of_type;
    use std::sync::Arc;

    struct Out(&'static str);

    #[derive(Default)]
    struct First;

    #[derive(Default)]
    struct Second;

    fn bound<H: Default + Send + Sync + 'static>(tag: &'static str) -> ProducerMethod {
        let info = HolderInfo::factory::<H>()
            .constructor(H::default)
            .producer("make", move |_: &H| Out(tag))
            .build();
        ProducerMethod::bind(&info.key(), Arc::new(H::default()), &info.producers[0])
    }

    #[test]
    fn first_registered_producer_wins() {
        let mut registry = FactoryRegistry::new();
        registry.add_producer(bound::<First>("first"), DuplicateProducers::FirstWins).unwrap();
        registry.add_producer(bound::<Second>("second"), DuplicateProducers::FirstWins).unwrap();

        let method = registry.producer_for(&key_of_type::<Out>()).unwrap();
        assert!(method.holder_name.ends_with("First"));
        assert!(method.qualified_name().ends_with("First::make"));
    }

    #[test]
    fn reject_policy_reports_both_producers() {
        let mut registry = FactoryRegistry::new();
        registry.add_producer(bound::<First>("first"), DuplicateProducers::Reject).unwrap();

        match registry.add_producer(bound::<Second>("second"), DuplicateProducers::Reject) {
            Err(DiError::DuplicateProducer { first, second, .. }) => {
                assert!(first.ends_with("First::make"));
                assert!(second.ends_with("Second::make"));
            }
            _ => panic!("expected DuplicateProducer"),
        }
        assert!(registry.provides(&key_of_type::<Out>()));
    }

    #[test]
    fn rejected_batch_binds_nothing() {
        struct Other;

        let mut registry = FactoryRegistry::new();
        registry.add_producer(bound::<First>("first"), DuplicateProducers::Reject).unwrap();

        let info = HolderInfo::factory::<Second>()
            .constructor(Second::default)
            .producer("other", |_: &Second| Other)
            .producer("make", |_: &Second| Out("second"))
            .build();
        let holder: AnyArc = Arc::new(Second);
        let methods = info
            .producers
            .iter()
            .map(|p| ProducerMethod::bind(&info.key(), holder.clone(), p))
            .collect();

        let err = registry.add_producers(methods, DuplicateProducers::Reject).unwrap_err();
        assert!(matches!(err, DiError::DuplicateProducer { .. }));
        assert!(!registry.provides(&key_of_type::<Other>()));
    }
}
