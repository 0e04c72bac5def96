//! Collects service descriptors before resolution.
//!
//! Registration consumes and returns the registry so calls chain with
//! `?`. [`Registry::build`] snapshots everything registered so far into an
//! independent [`Resolver`].
//!
//! ```text
//! Registry ──register_*()──> Registry ──build()──> Resolver
//! ```
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use wiring_container::prelude::*;
//!
//! struct Constants { base_url: &'static str }
//! struct ApiClient { constants: Arc<Constants> }
//!
//! let constants = identity::<Constants>("constants")?;
//! let api = identity::<ApiClient>("api")?;
//!
//! let resolver = Registry::new()
//!     .register_instance(&constants, Constants { base_url: "https://example.org" })?
//!     .register_injected(
//!         Lifetime::Singleton,
//!         &api,
//!         inject(&["constants"], |constants: Arc<Constants>| ApiClient { constants }),
//!     )?
//!     .build()?;
//!
//! let client = resolver.retrieve(&api)?;
//! assert_eq!(client.constants.base_url, "https://example.org");
//! # Ok::<(), WiringError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::descriptor::{ServiceDescriptor, construct_fn, erase};
use crate::error::{
    AlreadyRegisteredError, ArityMismatchError, DuplicateNameError, Result, WiringError,
};
use crate::graph::GraphValidator;
use crate::inject::{Construct, Injected};
use crate::key::{ServiceId, ServiceKey, ServiceRef};
use crate::lifetime::Lifetime;
use crate::module::Module;
use crate::provider::{Provider, Resolve};
use crate::resolver::Resolver;
use crate::settings::RegistrySettings;

/// Builder holding every registration until [`build`](Registry::build).
#[derive(Clone, Default)]
pub struct Registry {
    descriptors: HashMap<ServiceKey, Arc<ServiceDescriptor>>,
    names: HashMap<Arc<str>, ServiceKey>,
    settings: RegistrySettings,
}

impl Registry {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with `settings`.
    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    // ── Instance ──

    /// Registers a pre-built value. Always a Singleton.
    ///
    /// `value` may be a `T` or an `Arc<T>`; the latter is how trait-object
    /// services are registered.
    pub fn register_instance<T>(
        mut self,
        id: &ServiceId<T>,
        value: impl Into<Arc<T>>,
    ) -> Result<Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let descriptor = ServiceDescriptor::instance(id.key().clone(), erase(value.into()));
        self.insert(descriptor)?;
        Ok(self)
    }

    // ── Factory ──

    /// Registers a factory with the given lifetime.
    ///
    /// The factory is opaque: it resolves whatever it needs through the
    /// [`Provider`] it receives.
    pub fn register_factory<T, R, F>(
        mut self,
        lifetime: Lifetime,
        id: &ServiceId<T>,
        factory: F,
    ) -> Result<Self>
    where
        T: ?Sized + Send + Sync + 'static,
        R: Into<Arc<T>> + 'static,
        F: Fn(&Provider<'_>) -> Result<R> + Send + Sync + 'static,
    {
        let construct = construct_fn(move |provider| {
            let value: Arc<T> = factory(provider)?.into();
            Ok(erase(value))
        });

        let descriptor = ServiceDescriptor::factory(id.key().clone(), lifetime, construct);
        self.insert(descriptor)?;
        Ok(self)
    }

    // ── Injected ──

    /// Registers a constructor fed by its declared dependency names.
    ///
    /// # Errors
    /// [`WiringError::ArityMismatch`] when the number of declared names
    /// differs from the constructor's parameter count. The registry is
    /// left unchanged.
    pub fn register_injected<T, F, Args>(
        mut self,
        lifetime: Lifetime,
        id: &ServiceId<T>,
        constructor: Injected<F, Args>,
    ) -> Result<Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Construct<Args>,
        F::Output: Into<Arc<T>>,
        Args: 'static,
    {
        if constructor.dependencies().len() != constructor.arity() {
            return Err(WiringError::ArityMismatch(ArityMismatchError {
                service: id.name().to_string(),
                declared: constructor.dependencies().to_vec(),
                arity: constructor.arity(),
            }));
        }

        let (dependencies, constructor) = constructor.into_parts();
        let construct = construct_fn(move |provider| {
            let mut args = Vec::with_capacity(dependencies.len());
            for &name in dependencies {
                args.push((name, provider.resolve_ref(ServiceRef::Name(name))?));
            }
            let value: Arc<T> = constructor.construct(args)?.into();
            Ok(erase(value))
        });

        let descriptor =
            ServiceDescriptor::injected(id.key().clone(), lifetime, dependencies, construct);
        self.insert(descriptor)?;
        Ok(self)
    }

    // ── Modules ──

    /// Lets `module` register its services.
    pub fn add_module(self, module: &dyn Module) -> Result<Self> {
        debug!(module = module.name(), "Adding module");
        module.register(self)
    }

    // ── Build ──

    /// Snapshots the registrations into a new [`Resolver`].
    ///
    /// May be called any number of times; resolvers share no mutable state
    /// with the registry or with each other. With
    /// [`validate_on_build`](RegistrySettings::validate_on_build) the
    /// declared Injected dependencies are checked first.
    #[instrument(skip(self), name = "registry_build")]
    pub fn build(&self) -> Result<Resolver> {
        info!(registered = self.descriptors.len(), "Building resolver");

        if self.settings.validate_on_build {
            GraphValidator::new(&self.descriptors, &self.names, self.settings.max_suggestions)
                .validate()?;
        }

        Ok(Resolver::new(
            self.descriptors.clone(),
            self.names.clone(),
            self.settings.max_suggestions,
        ))
    }

    // ── Introspection ──

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Descriptor registered for `key`, if any.
    pub fn get(&self, key: &ServiceKey) -> Option<&ServiceDescriptor> {
        self.descriptors.get(key).map(Arc::as_ref)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(|n| n.as_ref()).collect();
        names.sort_unstable();
        names
    }

    // ── Internal ──

    fn insert(&mut self, descriptor: ServiceDescriptor) -> Result<()> {
        let key = descriptor.key().clone();

        if let Some(owner) = self.names.get(key.name()) {
            if *owner != key {
                return Err(WiringError::DuplicateName(DuplicateNameError {
                    name: key.name().to_string(),
                }));
            }
        }

        if !self.settings.allow_override && self.descriptors.contains_key(&key) {
            return Err(WiringError::AlreadyRegistered(AlreadyRegisteredError {
                service: key.name().to_string(),
            }));
        }

        debug!(
            service = %key,
            lifetime = %descriptor.lifetime(),
            style = %descriptor.style(),
            "Registered service"
        );
        self.names.insert(key.shared_name(), key.clone());
        self.descriptors.insert(key, Arc::new(descriptor));
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.descriptors.len())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ConstructionStyle;
    use crate::inject::inject;
    use crate::key::identity;

    struct Database;
    struct Repo {
        _db: Arc<Database>,
    }

    #[test]
    fn register_each_style() {
        let db = identity::<Database>("db").unwrap();
        let repo = identity::<Repo>("repo").unwrap();
        let counter = identity::<u64>("counter").unwrap();

        let registry = Registry::new()
            .register_instance(&db, Database)
            .unwrap()
            .register_injected(
                Lifetime::Transient,
                &repo,
                inject(&["db"], |db: Arc<Database>| Repo { _db: db }),
            )
            .unwrap()
            .register_factory(Lifetime::Transient, &counter, |_| Ok(1u64))
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(db.key()).unwrap().style(), ConstructionStyle::Instance);
        assert_eq!(registry.get(repo.key()).unwrap().dependencies(), &["db"]);
        assert_eq!(registry.get(counter.key()).unwrap().style(), ConstructionStyle::Factory);
        assert_eq!(registry.names(), vec!["counter", "db", "repo"]);
    }

    #[test]
    fn arity_mismatch_rejected_at_registration() {
        let repo = identity::<Repo>("repo").unwrap();

        let result = Registry::new().register_injected(
            Lifetime::Transient,
            &repo,
            inject(&["db", "cache"], |db: Arc<Database>| Repo { _db: db }),
        );

        match result {
            Err(WiringError::ArityMismatch(err)) => {
                assert_eq!(err.service, "repo");
                assert_eq!(err.declared, vec!["db", "cache"]);
                assert_eq!(err.arity, 1);
            }
            Err(other) => panic!("Expected ArityMismatch, got: {other:?}"),
            Ok(_) => panic!("Expected ArityMismatch"),
        }
    }

    #[test]
    fn missing_declarations_rejected() {
        let repo = identity::<Repo>("repo").unwrap();
        let result = Registry::new().register_injected(
            Lifetime::Transient,
            &repo,
            Injected::new(|db: Arc<Database>| Repo { _db: db }),
        );
        assert!(matches!(result, Err(WiringError::ArityMismatch(_))));
    }

    #[test]
    fn reregistering_replaces() {
        let n = identity::<u32>("n").unwrap();
        let registry = Registry::new()
            .register_instance(&n, 1u32)
            .unwrap()
            .register_factory(Lifetime::Transient, &n, |_| Ok(2u32))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(n.key()).unwrap().lifetime(), Lifetime::Transient);
    }

    #[test]
    fn override_can_be_disabled() {
        let n = identity::<u32>("n").unwrap();
        let result = Registry::with_settings(RegistrySettings::default().allow_override(false))
            .register_instance(&n, 1u32)
            .unwrap()
            .register_instance(&n, 2u32);

        assert!(matches!(result, Err(WiringError::AlreadyRegistered(_))));
    }

    #[test]
    fn duplicate_name_rejected() {
        let first = identity::<u32>("port").unwrap();
        let second = identity::<u32>("port").unwrap();

        let result = Registry::new()
            .register_instance(&first, 80u32)
            .unwrap()
            .register_instance(&second, 443u32);

        match result {
            Err(WiringError::DuplicateName(err)) => assert_eq!(err.name, "port"),
            Err(other) => panic!("Expected DuplicateName, got: {other:?}"),
            Ok(_) => panic!("Expected DuplicateName"),
        }
    }

    #[test]
    fn debug_display() {
        let n = identity::<u32>("n").unwrap();
        let registry = Registry::new().register_instance(&n, 1u32).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("Registry"));
        assert!(debug.contains("registered: 1"));
    }
}
