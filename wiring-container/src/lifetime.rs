//! Service lifetimes.
//!
//! - [`Lifetime::Transient`]: a new instance on every resolution
//! - [`Lifetime::Singleton`]: one instance per resolver, built lazily
//!
//! # Ordering
//! `Transient < Singleton`. A service may only depend on services whose
//! lifetime is not shorter than its own.
use std::fmt;

use serde::Deserialize;

/// How long a resolved instance may live.
///
/// # Examples
/// ```
/// use wiring_container::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton > Lifetime::Transient);
/// assert!(Lifetime::Transient.can_depend_on(Lifetime::Singleton));
/// assert!(!Lifetime::Singleton.can_depend_on(Lifetime::Transient));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// New instance on every resolution. Never cached.
    Transient,

    /// One instance for the resolver's whole life.
    ///
    /// Built on first resolution and cached until the resolver is dropped.
    Singleton,
}

impl Lifetime {
    /// Returns `true` if resolved instances are cached.
    #[inline]
    pub fn is_cached(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Whether a service with this lifetime may hold a `dependency` one.
    #[inline]
    pub fn can_depend_on(self, dependency: Lifetime) -> bool {
        dependency >= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lifetime::Transient => "Transient",
            Lifetime::Singleton => "Singleton",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_ordering() {
        assert!(Lifetime::Singleton > Lifetime::Transient);
        assert_eq!(
            Lifetime::Transient.max(Lifetime::Singleton),
            Lifetime::Singleton
        );
    }

    #[test]
    fn dependency_rules() {
        assert!(Lifetime::Transient.can_depend_on(Lifetime::Transient));
        assert!(Lifetime::Transient.can_depend_on(Lifetime::Singleton));
        assert!(Lifetime::Singleton.can_depend_on(Lifetime::Singleton));
        assert!(!Lifetime::Singleton.can_depend_on(Lifetime::Transient));
    }

    #[test]
    fn lifetime_is_cached() {
        assert!(Lifetime::Singleton.is_cached());
        assert!(!Lifetime::Transient.is_cached());
    }

    #[test]
    fn lifetime_display() {
        assert_eq!(Lifetime::Singleton.to_string(), "Singleton");
        assert_eq!(Lifetime::Transient.to_string(), "Transient");
    }

    #[test]
    fn lifetime_from_config() {
        let parsed: Lifetime = serde_json::from_str("\"singleton\"").unwrap();
        assert_eq!(parsed, Lifetime::Singleton);
    }
}
