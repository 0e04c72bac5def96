//! Service identities.
//!
//! A [`ServiceKey`] is an opaque token: two keys are equal only when they
//! were produced by the same call to [`identity`], never because their
//! names match. [`ServiceId<T>`] is the typed handle application code
//! holds; [`ServiceRef`] is what a request targets: a key or a bare name.

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{MalformedIdentityError, Result, WiringError};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Untyped service identity.
///
/// Carries a human-readable name and the Rust type name of the service
/// for diagnostics. Equality and hashing only look at the token.
#[derive(Clone)]
pub struct ServiceKey {
    id: u64,
    name: Arc<str>,
    type_name: &'static str,
}

impl ServiceKey {
    fn new<T: ?Sized + 'static>(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(WiringError::MalformedIdentity(MalformedIdentityError {
                type_name: type_name::<T>(),
            }));
        }

        Ok(Self {
            id: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
            type_name: type_name::<T>(),
        })
    }

    /// The name this identity was created with.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified Rust type of the service.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey#{}({:?}: {})", self.id, self.name, self.type_name)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Typed service identity.
///
/// `T` is the service type handed out by the resolver as `Arc<T>`; it may
/// be a trait object.
///
/// # Examples
/// ```
/// use wiring_container::key::{identity, ServiceId};
///
/// trait ApiClient: Send + Sync {}
///
/// let api: ServiceId<dyn ApiClient> = identity("api").unwrap();
/// let other: ServiceId<dyn ApiClient> = identity("api").unwrap();
///
/// assert_eq!(api.name(), "api");
/// assert_ne!(api, other); // same name, different token
/// assert!(identity::<u32>("").is_err());
/// ```
pub struct ServiceId<T: ?Sized> {
    key: ServiceKey,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + 'static> ServiceId<T> {
    /// Creates a fresh identity named `name`.
    ///
    /// # Errors
    /// [`WiringError::MalformedIdentity`] if `name` is empty.
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            key: ServiceKey::new::<T>(name)?,
            _marker: PhantomData,
        })
    }
}

impl<T: ?Sized> ServiceId<T> {
    #[inline]
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.key.name()
    }
}

impl<T: ?Sized> Clone for ServiceId<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for ServiceId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for ServiceId<T> {}

impl<T: ?Sized> Hash for ServiceId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for ServiceId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceId").field(&self.key).finish()
    }
}

impl<T: ?Sized> AsRef<ServiceKey> for ServiceId<T> {
    fn as_ref(&self) -> &ServiceKey {
        &self.key
    }
}

/// Creates a new identity for a service of type `T`.
///
/// # Errors
/// [`WiringError::MalformedIdentity`] if `name` is empty.
pub fn identity<T: ?Sized + 'static>(name: &str) -> Result<ServiceId<T>> {
    ServiceId::new(name)
}

/// Target of a resolution request.
#[derive(Debug, Clone, Copy)]
pub enum ServiceRef<'a> {
    /// A statically held identity.
    Key(&'a ServiceKey),
    /// A registered name, looked up through the resolver's name index.
    Name(&'a str),
}

impl<'a> From<&'a ServiceKey> for ServiceRef<'a> {
    fn from(key: &'a ServiceKey) -> Self {
        ServiceRef::Key(key)
    }
}

impl<'a, T: ?Sized> From<&'a ServiceId<T>> for ServiceRef<'a> {
    fn from(id: &'a ServiceId<T>) -> Self {
        ServiceRef::Key(id.key())
    }
}

impl<'a> From<&'a str> for ServiceRef<'a> {
    fn from(name: &'a str) -> Self {
        ServiceRef::Name(name)
    }
}

impl fmt::Display for ServiceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRef::Key(key) => write!(f, "{key}"),
            ServiceRef::Name(name) => write!(f, "{name:?}"),
        }
    }
}
