//! The provider callback handed to construction functions.
//!
//! Factories resolve their own dependencies through the [`Provider`] they
//! receive. It carries the in-progress stack of the current top-level
//! request and the descriptor being built, so nested resolutions take part
//! in cycle and lifetime checks.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use wiring_container::prelude::*;
//!
//! struct Config { url: String }
//! struct Client { url: String }
//!
//! let config = identity::<Config>("config")?;
//! let client = identity::<Client>("client")?;
//!
//! let resolver = Registry::new()
//!     .register_instance(&config, Config { url: "https://api".into() })?
//!     .register_factory(Lifetime::Transient, &client, {
//!         let config = config.clone();
//!         move |p: &Provider<'_>| {
//!             let config = p.get(&config)?;
//!             Ok(Client { url: config.url.clone() })
//!         }
//!     })?
//!     .build()?;
//!
//! assert_eq!(resolver.retrieve(&client)?.url, "https://api");
//! # Ok::<(), WiringError>(())
//! ```

use std::cell::RefCell;
use std::sync::Arc;

use crate::descriptor::{Instance, ServiceDescriptor, downcast};
use crate::error::Result;
use crate::key::{ServiceId, ServiceRef};
use crate::resolver::Resolver;
use crate::stack::ResolutionStack;

/// Anything that can resolve a [`ServiceRef`].
///
/// Implemented by [`Resolver`] (each call is a new top-level request) and
/// by [`Provider`] (nested inside a construction).
pub trait Resolve {
    /// Resolves a key or a registered name to a type-erased instance.
    fn resolve_ref(&self, service: ServiceRef<'_>) -> Result<Instance>;

    /// Resolves a typed identity.
    fn get<T>(&self, id: &ServiceId<T>) -> Result<Arc<T>>
    where
        Self: Sized,
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_ref(ServiceRef::Key(id.key()))?;
        downcast(&instance, id.name())
    }

    /// Resolves a service by registered name.
    ///
    /// Fails with `TypeMismatch` if the service is not a `T`.
    fn get_named<T>(&self, name: &str) -> Result<Arc<T>>
    where
        Self: Sized,
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_ref(ServiceRef::Name(name))?;
        downcast(&instance, name)
    }
}

/// Resolution context passed to factories and constructors.
pub struct Provider<'r> {
    resolver: &'r Resolver,
    stack: &'r RefCell<ResolutionStack>,
    required_by: &'r ServiceDescriptor,
}

impl<'r> Provider<'r> {
    pub(crate) fn new(
        resolver: &'r Resolver,
        stack: &'r RefCell<ResolutionStack>,
        required_by: &'r ServiceDescriptor,
    ) -> Self {
        Self {
            resolver,
            stack,
            required_by,
        }
    }

    /// The descriptor currently being constructed.
    pub fn requester(&self) -> &ServiceDescriptor {
        self.required_by
    }

    /// Number of services currently under construction in this request.
    pub fn depth(&self) -> usize {
        self.stack.borrow().depth()
    }
}

impl Resolve for Provider<'_> {
    fn resolve_ref(&self, service: ServiceRef<'_>) -> Result<Instance> {
        self.resolver
            .resolve_within(service, self.stack, Some(self.required_by))
    }
}

impl std::fmt::Debug for Provider<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("required_by", &self.required_by.label())
            .field("depth", &self.depth())
            .finish()
    }
}
