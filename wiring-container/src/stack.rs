//! In-progress resolution stack.
//!
//! One stack per top-level `retrieve` call, threaded through nested
//! resolutions by the [`Provider`](crate::provider::Provider). It acts as
//! an ordered set: a push of a service already on the stack is a cycle.

use std::sync::Arc;

use tracing::warn;
use wiring_support::rendering::render_chain;

use crate::descriptor::ServiceDescriptor;
use crate::error::{ChainLink, CircularDependencyError, Result, WiringError};
use crate::key::ServiceKey;

#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    entries: Vec<Arc<ServiceDescriptor>>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.iter().any(|d| d.key() == key)
    }

    /// Fails if `descriptor` is already on the stack.
    ///
    /// The error chain lists the whole stack bottom to top, then the
    /// offending service.
    pub fn check(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        if !self.contains(descriptor.key()) {
            return Ok(());
        }

        let mut chain: Vec<ChainLink> = self.entries.iter().map(|d| d.link()).collect();
        chain.push(descriptor.link());

        let labels: Vec<String> = chain.iter().map(ChainLink::label).collect();
        warn!(cycle = %render_chain(&labels), "Circular dependency detected");

        Err(WiringError::CircularDependency(CircularDependencyError {
            chain,
        }))
    }

    /// Pushes `descriptor`, failing if it is already on the stack.
    pub fn push(&mut self, descriptor: &Arc<ServiceDescriptor>) -> Result<()> {
        self.check(descriptor)?;
        self.entries.push(Arc::clone(descriptor));
        Ok(())
    }

    /// Pops the top entry, which must be `key`.
    pub fn pop(&mut self, key: &ServiceKey) {
        let popped = self.entries.pop();
        debug_assert!(popped.as_ref().is_some_and(|d| d.key() == key));
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{construct_fn, erase};
    use crate::key::identity;
    use crate::lifetime::Lifetime;

    fn descriptor(name: &str, lifetime: Lifetime) -> Arc<ServiceDescriptor> {
        let id = identity::<u8>(name).unwrap();
        let construct = construct_fn(|_| Ok(erase(Arc::new(0u8))));
        Arc::new(ServiceDescriptor::factory(id.key().clone(), lifetime, construct))
    }

    #[test]
    fn push_and_pop() {
        let a = descriptor("a", Lifetime::Singleton);
        let mut stack = ResolutionStack::new();

        stack.push(&a).unwrap();
        assert!(stack.contains(a.key()));
        assert_eq!(stack.depth(), 1);

        stack.pop(a.key());
        assert!(!stack.contains(a.key()));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn revisit_reports_full_chain() {
        let a = descriptor("a", Lifetime::Transient);
        let b = descriptor("b", Lifetime::Singleton);
        let c = descriptor("c", Lifetime::Singleton);
        let mut stack = ResolutionStack::new();

        stack.push(&a).unwrap();
        stack.push(&b).unwrap();
        stack.push(&c).unwrap();

        match stack.push(&b) {
            Err(WiringError::CircularDependency(err)) => {
                assert_eq!(err.names(), vec!["a", "b", "c", "b"]);
                assert_eq!(err.chain[0].label(), "Transient Factory a");
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn check_leaves_stack_untouched() {
        let a = descriptor("a", Lifetime::Transient);
        let b = descriptor("b", Lifetime::Transient);
        let mut stack = ResolutionStack::new();
        stack.push(&a).unwrap();

        assert!(stack.check(&b).is_ok());
        assert!(matches!(
            stack.check(&a),
            Err(WiringError::CircularDependency(_))
        ));
        assert_eq!(stack.depth(), 1);
    }
}
