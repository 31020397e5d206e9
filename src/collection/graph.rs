//! Dependency graph walk performed at registration time.

use crate::error::{DiError, DiResult};
use crate::factories::FactoryRegistry;
use crate::internal::{Map, ResolutionStack, Set};
use crate::key::Key;
use crate::registration::{ConstructionPlan, PlanStore};
use crate::traits::TypeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    InProgress,
    Done,
}

/// Visit state of every key the builder has walked.
///
/// Keys absent from the ledger are unvisited. A failed walk removes the
/// keys it left in progress, so the builder can be retried.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    states: Map<Key, Visit>,
}

impl Ledger {
    pub(crate) fn state(&self, key: &Key) -> Option<Visit> {
        self.states.get(key).copied()
    }

    fn begin(&mut self, key: Key) {
        self.states.insert(key, Visit::InProgress);
    }

    fn finish(&mut self, key: Key) {
        self.states.insert(key, Visit::Done);
    }

    fn abandon(&mut self, key: &Key) {
        if self.state(key) == Some(Visit::InProgress) {
            self.states.remove(key);
        }
    }
}

/// One depth-first registration walk.
pub(crate) struct GraphBuilder<'a> {
    source: &'a dyn TypeSource,
    plans: &'a mut PlanStore,
    ledger: &'a mut Ledger,
    factories: &'a FactoryRegistry,
    declared: &'a Set<Key>,
    stack: ResolutionStack,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        source: &'a dyn TypeSource,
        plans: &'a mut PlanStore,
        ledger: &'a mut Ledger,
        factories: &'a FactoryRegistry,
        declared: &'a Set<Key>,
        max_depth: usize,
    ) -> Self {
        Self {
            source,
            plans,
            ledger,
            factories,
            declared,
            stack: ResolutionStack::new(max_depth),
        }
    }

    /// Registers `key` and everything it transitively depends on.
    ///
    /// Dependencies already planned are skipped, and so are dependencies
    /// that are not injectable but have a producer: those are leaves here
    /// and get built by their producer at resolution time.
    pub(crate) fn register(&mut self, key: &Key) -> DiResult<()> {
        match self.ledger.state(key) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => return Err(self.stack.cycle_to(key)),
            None => {}
        }

        let info = self
            .source
            .introspect(key)
            .filter(|info| info.is_injectable())
            .ok_or(DiError::UnsupportedClass(key.display_name()))?;
        let plan = ConstructionPlan::select(&info)?;

        self.stack.enter(key)?;
        self.ledger.begin(*key);

        let result = self.register_dependencies(&plan);
        self.stack.exit(key);

        match result {
            Ok(()) => {
                self.ledger.finish(*key);
                tracing::debug!(
                    type_name = key.display_name(),
                    strategy = ?plan.strategy(),
                    dependencies = plan.dependencies().len(),
                    "registered type"
                );
                self.plans.insert(*key, plan);
                Ok(())
            }
            Err(err) => {
                self.ledger.abandon(key);
                Err(err)
            }
        }
    }

    fn register_dependencies(&mut self, plan: &ConstructionPlan) -> DiResult<()> {
        for dep in plan.dependencies() {
            if self.plans.contains_key(&dep) {
                continue;
            }
            if self.is_produced(&dep) && !self.is_injectable(&dep) {
                tracing::trace!(type_name = dep.display_name(), "dependency is produced");
                continue;
            }
            self.register(&dep)?;
        }
        Ok(())
    }

    /// Bound to a producer, or declared by a holder not instantiated yet.
    fn is_produced(&self, key: &Key) -> bool {
        self.factories.provides(key) || self.declared.contains(key)
    }

    fn is_injectable(&self, key: &Key) -> bool {
        self.source
            .introspect(key)
            .map(|info| info.is_injectable())
            .unwrap_or(false)
    }
}
