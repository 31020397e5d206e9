//! Construction plans and the store holding them.

use crate::descriptors::Strategy;
use crate::error::{DiError, DiResult};
use crate::internal::Map;
use crate::introspect::{ConstructorFn, DefaultFn, InjectField, TypeInfo};
use crate::key::Key;

/// How a registered type is built, decided once at registration.
#[derive(Clone)]
pub(crate) enum ConstructionPlan {
    /// Resolve `params` in order, then call `invoke` with the values
    Constructor {
        params: Vec<Key>,
        invoke: ConstructorFn,
    },
    /// Call `construct`, then assign each field's resolved dependency
    Fields {
        construct: DefaultFn,
        fields: Vec<InjectField>,
    },
}

impl ConstructionPlan {
    /// Strategy selection for an injectable type.
    ///
    /// An injection constructor wins; without one the type needs a
    /// zero-argument constructor and gets its dependencies from fields.
    pub(crate) fn select(info: &TypeInfo) -> DiResult<Self> {
        if let Some(ctor) = &info.inject_constructor {
            return Ok(ConstructionPlan::Constructor {
                params: ctor.params.clone(),
                invoke: ctor.invoke.clone(),
            });
        }

        let construct = info
            .default_constructor
            .clone()
            .ok_or(DiError::NoSuitableConstructor(info.key.display_name()))?;

        Ok(ConstructionPlan::Fields {
            construct,
            fields: info.inject_fields.clone(),
        })
    }

    /// Dependency keys, in the order they are resolved.
    pub(crate) fn dependencies(&self) -> Vec<Key> {
        match self {
            ConstructionPlan::Constructor { params, .. } => params.clone(),
            ConstructionPlan::Fields { fields, .. } => {
                fields.iter().map(|f| f.dependency).collect()
            }
        }
    }

    pub(crate) fn strategy(&self) -> Strategy {
        match self {
            ConstructionPlan::Constructor { .. } => Strategy::Constructor,
            ConstructionPlan::Fields { .. } => Strategy::Fields,
        }
    }
}

/// Type descriptor store: one plan per registered key.
#[derive(Default)]
pub(crate) struct PlanStore {
    plans: Map<Key, ConstructionPlan>,
}

impl PlanStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores the plan for `key` unless one is already present.
    ///
    /// Returns `false` when the key was already planned; the first plan is kept.
    pub(crate) fn insert(&mut self, key: Key, plan: ConstructionPlan) -> bool {
        if self.plans.contains_key(&key) {
            return false;
        }
        self.plans.insert(key, plan);
        true
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&ConstructionPlan> {
        self.plans.get(key)
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.plans.contains_key(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &ConstructionPlan)> {
        self.plans.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.plans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::TypeInfo;
    use crate::key::key_of_type;
    use crate::params;
    use std::sync::Arc;

    #[derive(Default)]
    struct Leaf;

    struct WithCtor {
        _leaf: Arc<Leaf>,
    }

    #[derive(Default)]
    struct WithFields {
        leaf: Option<Arc<Leaf>>,
    }

    struct Bare;

    #[test]
    fn inject_constructor_wins_over_default() {
        let info = TypeInfo::injectable::<WithCtor>()
            .inject_constructor(params![Leaf], |args| Ok(WithCtor { _leaf: args.next()? }))
            .try_default_constructor(|| Err("never used".into()))
            .build();

        let plan = ConstructionPlan::select(&info).unwrap();
        assert_eq!(plan.strategy(), Strategy::Constructor);
        assert_eq!(plan.dependencies(), vec![key_of_type::<Leaf>()]);
    }

    #[test]
    fn default_constructor_selects_fields() {
        let info = TypeInfo::injectable::<WithFields>()
            .default_constructor(WithFields::default)
            .inject_field::<Leaf, _>("leaf", |t, l| t.leaf = Some(l))
            .build();

        let plan = ConstructionPlan::select(&info).unwrap();
        assert_eq!(plan.strategy(), Strategy::Fields);
        assert_eq!(plan.dependencies(), vec![key_of_type::<Leaf>()]);
    }

    #[test]
    fn no_constructor_is_rejected() {
        let info = TypeInfo::injectable::<Bare>().build();
        assert!(matches!(
            ConstructionPlan::select(&info),
            Err(DiError::NoSuitableConstructor(name)) if name.ends_with("Bare")
        ));
    }

    #[test]
    fn store_keeps_first_plan() {
        let mut store = PlanStore::new();
        let info = TypeInfo::injectable::<Leaf>().default_constructor(Leaf::default).build();
        let plan = ConstructionPlan::select(&info).unwrap();

        assert!(store.insert(key_of_type::<Leaf>(), plan.clone()));
        assert!(!store.insert(key_of_type::<Leaf>(), plan));
        assert_eq!(store.len(), 1);
        assert!(store.contains_key(&key_of_type::<Leaf>()));
    }
}
