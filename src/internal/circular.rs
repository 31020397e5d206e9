//! Circular dependency detection infrastructure.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Identifies one resolution path across threads.
pub(crate) type PathId = u64;

static NEXT_PATH: AtomicU64 = AtomicU64::new(1);

/// Keys currently being built or registered, innermost last.
///
/// A key on the stack is *in-progress*. Entering it again means the walk has
/// come back to a type it has not finished, which is a cycle. The stack is an
/// explicit value owned by one walk (one `register` root or one top-level
/// `resolve` call), so independent containers and threads never share it.
#[derive(Debug)]
pub(crate) struct ResolutionStack {
    id: PathId,
    path: Vec<Key>,
    max_depth: usize,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            id: NEXT_PATH.fetch_add(1, Ordering::Relaxed),
            path: Vec::new(),
            max_depth,
        }
    }

    pub(crate) fn id(&self) -> PathId {
        self.id
    }

    /// Marks `key` in-progress.
    ///
    /// Circular detection happens before the push, so the reported path ends
    /// with the repeated key: `A -> B -> A`.
    pub(crate) fn enter(&mut self, key: &Key) -> DiResult<()> {
        if self.contains(key) {
            return Err(self.cycle_to(key));
        }

        if self.path.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.max_depth));
        }

        self.path.push(*key);
        Ok(())
    }

    /// The cycle closed by walking from the current path back into `key`.
    pub(crate) fn cycle_to(&self, key: &Key) -> DiError {
        let mut path: Vec<&'static str> = self.path.iter().map(|k| k.display_name()).collect();
        path.push(key.display_name());
        DiError::CyclicDependency(path)
    }

    /// The cycle closed by waiting on another path.
    ///
    /// `chain` lists the keys the blocking paths wait on, in order; its last
    /// key is one this path is building. The reported path starts at that key:
    /// `A -> B -> A` when this path builds `A`, waits on `B`, and `B`'s builder
    /// waits on `A`.
    pub(crate) fn wait_cycle(&self, chain: &[Key]) -> DiError {
        let start = chain
            .last()
            .and_then(|last| self.path.iter().position(|k| k == last))
            .unwrap_or(0);
        let path = self.path[start..]
            .iter()
            .chain(chain)
            .map(|k| k.display_name())
            .collect();
        DiError::CyclicDependency(path)
    }

    pub(crate) fn exit(&mut self, key: &Key) {
        let last = self.path.pop();
        debug_assert_eq!(last.as_ref(), Some(key));
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.path.iter().any(|k| k == key)
    }

    pub(crate) fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Runs `f` with `key` on the stack, popping it again whatever `f` returns.
pub(crate) fn with_cycle_guard<T, F>(stack: &mut ResolutionStack, key: &Key, f: F) -> DiResult<T>
where
    F: FnOnce(&mut ResolutionStack) -> DiResult<T>,
{
    stack.enter(key)?;
    let result = f(stack);
    stack.exit(key);
    result
}
