//! # Resolver
//!
//! Builds instances on demand from a frozen snapshot of the registry.
//!
//! # Resolution
//! For every request the resolver:
//! 1. maps a name to its identity through the name index,
//! 2. looks up the descriptor,
//! 3. rejects it if the requiring service would outlive it,
//! 4. returns a cached singleton if there is one,
//! 5. otherwise pushes the identity on the request's in-progress stack
//!    (unless its subgraph was already validated), runs the construction
//!    function with a [`Provider`], caches Singletons, marks the identity
//!    validated and pops it again.
//!
//! A rejected dependency is never constructed. The one exception is a
//! dependency whose declared names lead back onto the stack: it is built
//! only so the cycle it closes is reported instead of the violation.
//!
//! ```text
//! retrieve(D) ─> D ─provider─> C ─provider─> B (cached) ─> A (cached)
//!                │ stack: [D]   │ stack: [D, C]
//! ```
//!
//! # Concurrency
//! Cache hits never block. Singleton constructions are serialised by a
//! re-entrant lock, so a singleton is built at most once even when several
//! threads ask for it first; nested resolutions on the same thread
//! re-enter it. Transients are built without the lock. Every top-level
//! call gets its own stack.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::ReentrantMutex;
use tracing::{debug, error, instrument, trace, warn};
use wiring_support::rendering::suggest_similar;

use crate::descriptor::{Instance, ServiceDescriptor};
use crate::error::{
    LifetimeViolationError, NotRegisteredError, Result, UnknownNameError, WiringError,
};
use crate::key::{ServiceId, ServiceKey, ServiceRef};
use crate::provider::{Provider, Resolve};
use crate::stack::ResolutionStack;

/// Resolves identities into live instances.
///
/// Created by [`Registry::build`](crate::registry::Registry::build). Owns
/// its singleton cache and validated set for its whole life; nothing is
/// ever evicted.
///
/// A singleton factory runs while holding the construction lock. It must
/// not hand a `retrieve` of another uncached singleton to a different
/// thread and wait for it: that thread blocks on the same lock.
pub struct Resolver {
    descriptors: HashMap<ServiceKey, Arc<ServiceDescriptor>>,
    names: HashMap<Arc<str>, ServiceKey>,
    validated: DashSet<ServiceKey>,
    singletons: DashMap<ServiceKey, Instance>,
    construction: ReentrantMutex<()>,
    max_suggestions: usize,
}

impl Resolver {
    pub(crate) fn new(
        descriptors: HashMap<ServiceKey, Arc<ServiceDescriptor>>,
        names: HashMap<Arc<str>, ServiceKey>,
        max_suggestions: usize,
    ) -> Self {
        debug!(services = descriptors.len(), "Resolver created");
        Self {
            descriptors,
            names,
            validated: DashSet::new(),
            singletons: DashMap::new(),
            construction: ReentrantMutex::new(()),
            max_suggestions,
        }
    }

    /// Resolves a typed identity.
    ///
    /// ```rust,ignore
    /// let client: Arc<dyn ApiClient> = resolver.retrieve(&api)?;
    /// ```
    pub fn retrieve<T>(&self, id: &ServiceId<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get(id)
    }

    /// Resolves a service by its registered name.
    pub fn retrieve_named<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_named(name)
    }

    /// Resolves a key or name to the type-erased instance.
    ///
    /// Each call is a new top-level request with its own in-progress stack.
    #[instrument(level = "trace", skip_all, fields(service = %service))]
    pub fn retrieve_ref(&self, service: ServiceRef<'_>) -> Result<Instance> {
        let stack = RefCell::new(ResolutionStack::new());
        self.resolve_within(service, &stack, None)
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors.contains_key(key)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether `key`'s subgraph has completed resolution at least once.
    pub fn is_validated(&self, key: &ServiceKey) -> bool {
        self.validated.contains(key)
    }

    /// Whether a singleton instance is cached for `key`.
    pub fn is_cached(&self, key: &ServiceKey) -> bool {
        self.singletons.contains_key(key)
    }

    /// Resolves `service` inside an ongoing request.
    ///
    /// `stack` is the request's in-progress stack; `required_by` is the
    /// descriptor whose construction asked for `service`.
    pub(crate) fn resolve_within(
        &self,
        service: ServiceRef<'_>,
        stack: &RefCell<ResolutionStack>,
        required_by: Option<&ServiceDescriptor>,
    ) -> Result<Instance> {
        let key = self.lookup(service, required_by)?;
        let descriptor = self.descriptor(&key, required_by)?;

        if let Some(consumer) = required_by {
            if !consumer.lifetime().can_depend_on(descriptor.lifetime()) {
                return Err(self.reject(consumer, descriptor, stack));
            }
        }

        match self.cached(descriptor)? {
            Some(instance) => {
                trace!(service = %key, "Singleton cache hit");
                Ok(instance)
            }
            None => self.construct(descriptor, stack),
        }
    }

    /// Error for `consumer` requiring the shorter-lived `dependency`.
    ///
    /// A cycle through `dependency` takes precedence over the violation.
    fn reject(
        &self,
        consumer: &ServiceDescriptor,
        dependency: &Arc<ServiceDescriptor>,
        stack: &RefCell<ResolutionStack>,
    ) -> WiringError {
        let leads_back = {
            let stack = stack.borrow();
            if let Err(cycle) = stack.check(dependency) {
                return cycle;
            }
            self.leads_back(dependency, &stack)
        };

        if leads_back {
            if let Err(cycle @ WiringError::CircularDependency(_)) =
                self.construct(dependency, stack)
            {
                return cycle;
            }
        }

        lifetime_violation(consumer, dependency)
    }

    /// Whether the declared names reachable from `descriptor` include a
    /// service on `stack`.
    fn leads_back(&self, descriptor: &ServiceDescriptor, stack: &ResolutionStack) -> bool {
        let mut pending = vec![descriptor];
        let mut seen: HashSet<&ServiceKey> = HashSet::new();

        while let Some(current) = pending.pop() {
            if !seen.insert(current.key()) {
                continue;
            }
            for &name in current.dependencies() {
                let Some(next) = self.names.get(name).and_then(|k| self.descriptors.get(k))
                else {
                    continue;
                };
                if stack.contains(next.key()) {
                    return true;
                }
                pending.push(next.as_ref());
            }
        }
        false
    }

    fn construct(
        &self,
        descriptor: &Arc<ServiceDescriptor>,
        stack: &RefCell<ResolutionStack>,
    ) -> Result<Instance> {
        let singleton = descriptor.lifetime().is_cached();
        let _guard = singleton.then(|| self.construction.lock());

        // Another thread may have finished it while we waited.
        if singleton {
            if let Some(instance) = self.cached(descriptor)? {
                return Ok(instance);
            }
        }

        let key = descriptor.key();
        let tracked = !self.validated.contains(key);
        if tracked {
            stack.borrow_mut().push(descriptor)?;
        }

        trace!(service = %descriptor.label(), tracked, "Constructing");
        let provider = Provider::new(self, stack, descriptor);
        let result = descriptor.construct(&provider);

        if tracked {
            stack.borrow_mut().pop(key);
        }
        let instance = result?;

        self.validated.insert(key.clone());
        if singleton {
            self.singletons.insert(key.clone(), Arc::clone(&instance));
            debug!(service = %key, "Singleton cached");
        }

        Ok(instance)
    }

    /// Cached singleton for `descriptor`, if any.
    ///
    /// A cached entry must belong to a validated Singleton; anything else
    /// is a resolver bug.
    fn cached(&self, descriptor: &ServiceDescriptor) -> Result<Option<Instance>> {
        let key = descriptor.key();
        let Some(instance) = self.singletons.get(key).map(|entry| Arc::clone(entry.value()))
        else {
            return Ok(None);
        };

        let detail = if !descriptor.lifetime().is_cached() {
            "instance cached for a non-singleton service"
        } else if !self.validated.contains(key) {
            "instance cached before its service was validated"
        } else {
            return Ok(Some(instance));
        };

        error!(service = %descriptor.label(), detail, "Internal consistency failure");
        Err(WiringError::InternalConsistency {
            service: descriptor.label(),
            detail,
        })
    }

    fn lookup(
        &self,
        service: ServiceRef<'_>,
        required_by: Option<&ServiceDescriptor>,
    ) -> Result<ServiceKey> {
        match service {
            ServiceRef::Key(key) => Ok(key.clone()),
            ServiceRef::Name(name) => self.names.get(name).cloned().ok_or_else(|| {
                let available: Vec<&str> = self.names.keys().map(|n| n.as_ref()).collect();
                WiringError::UnknownName(UnknownNameError {
                    name: name.to_string(),
                    required_by: required_by.map(ServiceDescriptor::label),
                    suggestions: suggest_similar(name, &available, self.max_suggestions),
                })
            }),
        }
    }

    fn descriptor(
        &self,
        key: &ServiceKey,
        required_by: Option<&ServiceDescriptor>,
    ) -> Result<&Arc<ServiceDescriptor>> {
        self.descriptors.get(key).ok_or_else(|| {
            WiringError::NotRegistered(NotRegisteredError {
                requested: key.name().to_string(),
                required_by: required_by.map(ServiceDescriptor::label),
            })
        })
    }
}

fn lifetime_violation(consumer: &ServiceDescriptor, dependency: &ServiceDescriptor) -> WiringError {
    warn!(
        consumer = %consumer.label(),
        dependency = %dependency.label(),
        "Lifetime violation detected"
    );
    WiringError::LifetimeViolation(LifetimeViolationError {
        dependency: dependency.link(),
        consumer: consumer.link(),
    })
}

impl Resolve for Resolver {
    fn resolve_ref(&self, service: ServiceRef<'_>) -> Result<Instance> {
        self.retrieve_ref(service)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("registered", &self.descriptors.len())
            .field("validated", &self.validated.len())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::erase;
    use crate::inject::inject;
    use crate::key::identity;
    use crate::lifetime::Lifetime;
    use crate::registry::Registry;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn resolve_instance() {
        let answer = identity::<i32>("answer").unwrap();
        let resolver = Registry::new()
            .register_instance(&answer, 42)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(*resolver.retrieve(&answer).unwrap(), 42);
        assert!(resolver.is_cached(answer.key()));
        assert!(resolver.is_validated(answer.key()));
    }

    #[test]
    fn transient_factory_runs_every_time() {
        let counter = Arc::new(AtomicU32::new(0));
        let ticket = identity::<u32>("ticket").unwrap();

        let resolver = Registry::new()
            .register_factory(Lifetime::Transient, &ticket, {
                let counter = counter.clone();
                move |_| Ok(counter.fetch_add(1, Ordering::SeqCst))
            })
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(*resolver.retrieve(&ticket).unwrap(), 0);
        assert_eq!(*resolver.retrieve(&ticket).unwrap(), 1);
        assert!(!resolver.is_cached(ticket.key()));
        assert!(resolver.is_validated(ticket.key()));
    }

    #[test]
    fn resolve_by_name() {
        let url = identity::<String>("url").unwrap();
        let resolver = Registry::new()
            .register_instance(&url, String::from("postgres://localhost"))
            .unwrap()
            .build()
            .unwrap();

        let by_name: Arc<String> = resolver.retrieve_named("url").unwrap();
        let by_id = resolver.retrieve(&url).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_id));
        assert!(resolver.contains_name("url"));
    }

    #[test]
    fn name_with_wrong_type() {
        let url = identity::<String>("url").unwrap();
        let resolver = Registry::new()
            .register_instance(&url, String::from("x"))
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            resolver.retrieve_named::<u32>("url"),
            Err(WiringError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unknown_name_suggests() {
        let cache = identity::<u8>("local_cache").unwrap();
        let resolver = Registry::new()
            .register_instance(&cache, 0u8)
            .unwrap()
            .build()
            .unwrap();

        match resolver.retrieve_named::<u8>("local_cach") {
            Err(WiringError::UnknownName(err)) => {
                assert_eq!(err.suggestions, vec!["local_cache".to_string()]);
                assert!(err.required_by.is_none());
            }
            other => panic!("Expected UnknownName, got: {other:?}"),
        }
    }

    #[test]
    fn missing_injected_dependency_names_requester() {
        let repo = identity::<u8>("repo").unwrap();
        let resolver = Registry::new()
            .register_injected(Lifetime::Transient, &repo, inject(&["db"], |_: Arc<u8>| 0u8))
            .unwrap()
            .build()
            .unwrap();

        match resolver.retrieve(&repo) {
            Err(WiringError::UnknownName(err)) => {
                assert_eq!(err.name, "db");
                assert_eq!(err.required_by.as_deref(), Some("Transient Injected repo"));
            }
            other => panic!("Expected UnknownName, got: {other:?}"),
        }
        assert!(!resolver.is_validated(repo.key()));
    }

    #[test]
    fn stack_unwinds_when_factory_recovers() {
        let missing = identity::<u8>("missing").unwrap();
        let optional = identity::<u8>("optional").unwrap();

        let resolver = Registry::new()
            .register_factory(Lifetime::Transient, &optional, {
                let missing = missing.clone();
                move |p: &Provider<'_>| {
                    let fallback = p.get(&missing).map(|v| *v).unwrap_or(7);
                    assert_eq!(p.depth(), 1);
                    Ok(fallback)
                }
            })
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(*resolver.retrieve(&optional).unwrap(), 7);
    }

    #[test]
    fn cached_transient_is_internal_failure() {
        let ticket = identity::<u32>("ticket").unwrap();
        let resolver = Registry::new()
            .register_factory(Lifetime::Transient, &ticket, |_| Ok(1u32))
            .unwrap()
            .build()
            .unwrap();

        resolver
            .singletons
            .insert(ticket.key().clone(), erase(Arc::new(9u32)));

        let err = resolver.retrieve(&ticket).unwrap_err();
        assert!(err.is_internal());
        match err {
            WiringError::InternalConsistency { service, detail } => {
                assert_eq!(service, "Transient Factory ticket");
                assert_eq!(detail, "instance cached for a non-singleton service");
            }
            other => panic!("Expected InternalConsistency, got: {other:?}"),
        }
    }

    #[test]
    fn cached_before_validation_is_internal_failure() {
        let pool = identity::<u32>("pool").unwrap();
        let resolver = Registry::new()
            .register_factory(Lifetime::Singleton, &pool, |_| Ok(1u32))
            .unwrap()
            .build()
            .unwrap();

        resolver
            .singletons
            .insert(pool.key().clone(), erase(Arc::new(9u32)));

        match resolver.retrieve(&pool) {
            Err(WiringError::InternalConsistency { detail, .. }) => {
                assert_eq!(detail, "instance cached before its service was validated");
            }
            other => panic!("Expected InternalConsistency, got: {other:?}"),
        }
    }

    #[test]
    fn debug_display() {
        let a = identity::<i32>("a").unwrap();
        let resolver = Registry::new()
            .register_instance(&a, 1)
            .unwrap()
            .build()
            .unwrap();
        resolver.retrieve(&a).unwrap();

        let debug = format!("{resolver:?}");
        assert!(debug.contains("Resolver"));
        assert!(debug.contains("singletons: 1"));
    }
}
