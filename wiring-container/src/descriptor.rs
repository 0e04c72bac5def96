//! Service descriptors: how to build instances for one identity.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ChainLink, Result, WiringError};
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::provider::Provider;

/// Type-erased instance as stored by the resolver.
///
/// Always wraps an `Arc<T>` so trait-object services survive erasure and
/// every holder of a singleton shares the same allocation.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased construction function.
///
/// Receives the [`Provider`] for resolving nested dependencies.
pub type ConstructFn = Arc<dyn Fn(&Provider<'_>) -> Result<Instance> + Send + Sync>;

/// Boxes a closure as a [`ConstructFn`].
pub(crate) fn construct_fn<F>(f: F) -> ConstructFn
where
    F: Fn(&Provider<'_>) -> Result<Instance> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Erases an `Arc<T>`.
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// Recovers the `Arc<T>` stored by [`erase`].
pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &Instance,
    service: &str,
) -> Result<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| WiringError::type_mismatch(service, std::any::type_name::<T>()))
}

/// How a descriptor produces its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionStyle {
    /// Pre-built value, always Singleton.
    Instance,
    /// Opaque user function receiving the provider.
    Factory,
    /// Constructor called with dependencies resolved by name.
    Injected,
}

impl ConstructionStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionStyle::Instance => "Instance",
            ConstructionStyle::Factory => "Factory",
            ConstructionStyle::Injected => "Injected",
        }
    }
}

impl fmt::Display for ConstructionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable registration record for a single identity.
#[derive(Clone)]
pub struct ServiceDescriptor {
    key: ServiceKey,
    lifetime: Lifetime,
    style: ConstructionStyle,
    dependencies: &'static [&'static str],
    construct: ConstructFn,
}

impl ServiceDescriptor {
    pub(crate) fn instance(key: ServiceKey, value: Instance) -> Self {
        Self {
            key,
            lifetime: Lifetime::Singleton,
            style: ConstructionStyle::Instance,
            dependencies: &[],
            construct: construct_fn(move |_| Ok(Arc::clone(&value))),
        }
    }

    pub(crate) fn factory(key: ServiceKey, lifetime: Lifetime, construct: ConstructFn) -> Self {
        Self {
            key,
            lifetime,
            style: ConstructionStyle::Factory,
            dependencies: &[],
            construct,
        }
    }

    pub(crate) fn injected(
        key: ServiceKey,
        lifetime: Lifetime,
        dependencies: &'static [&'static str],
        construct: ConstructFn,
    ) -> Self {
        Self {
            key,
            lifetime,
            style: ConstructionStyle::Injected,
            dependencies,
            construct,
        }
    }

    #[inline]
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    pub fn style(&self) -> ConstructionStyle {
        self.style
    }

    /// Dependency names declared by an Injected constructor.
    ///
    /// Empty for Instance and Factory descriptors.
    #[inline]
    pub fn dependencies(&self) -> &'static [&'static str] {
        self.dependencies
    }

    /// Diagnostic label, e.g. `"Singleton Injected B"`.
    pub fn label(&self) -> String {
        self.link().label()
    }

    pub(crate) fn link(&self) -> ChainLink {
        ChainLink {
            name: self.name().to_string(),
            lifetime: self.lifetime,
            style: self.style.as_str(),
        }
    }

    pub(crate) fn construct(&self, provider: &Provider<'_>) -> Result<Instance> {
        (self.construct)(provider)
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("style", &self.style)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
