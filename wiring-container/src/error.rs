//! Error types for registration and resolution.
//!
//! Every error here is a configuration mistake meant to be fixed by the
//! developer. [`WiringError::InternalConsistency`] is the exception: it
//! reports a bug in the resolver itself.

use std::fmt;

use wiring_support::rendering::{
    ChainEntry, render_chain, render_chain_vertical, shorten_type_name,
};

use crate::lifetime::Lifetime;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// Identity created with an empty name.
    #[error("{}", .0)]
    MalformedIdentity(MalformedIdentityError),

    /// Injected registration whose declared dependencies don't match
    /// the constructor's parameter count.
    #[error("{}", .0)]
    ArityMismatch(ArityMismatchError),

    /// A different identity already uses this name.
    #[error("{}", .0)]
    DuplicateName(DuplicateNameError),

    /// Identity already registered and overriding is disabled.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// Requested identity has no descriptor.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// Requested name is not in the name index.
    #[error("{}", .0)]
    UnknownName(UnknownNameError),

    /// Resolution revisited a service that is still being constructed.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A longer-lived service required a shorter-lived one.
    #[error("{}", .0)]
    LifetimeViolation(LifetimeViolationError),

    /// The resolved instance is not of the requested type.
    #[error("Type mismatch for {service}: expected {expected}")]
    TypeMismatch {
        service: String,
        expected: &'static str,
    },

    /// A factory failed with its own error.
    #[error("Failed to construct {service}: {source}")]
    ConstructionFailed {
        service: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Resolver invariant broken. Indicates a bug in the resolver, not
    /// a misconfiguration.
    #[error("Internal consistency failure for {service}: {detail}")]
    InternalConsistency { service: String, detail: &'static str },
}

impl WiringError {
    /// Wraps an arbitrary factory error.
    pub fn construction(
        service: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        WiringError::ConstructionFailed {
            service: service.into(),
            source: source.into(),
        }
    }

    /// `true` for resolver bugs, `false` for configuration mistakes.
    pub fn is_internal(&self) -> bool {
        matches!(self, WiringError::InternalConsistency { .. })
    }

    pub(crate) fn type_mismatch(service: &str, expected: &'static str) -> Self {
        WiringError::TypeMismatch {
            service: service.to_string(),
            expected,
        }
    }
}

/// Identity created with an empty name.
#[derive(Debug)]
pub struct MalformedIdentityError {
    /// Service type the identity was meant for.
    pub type_name: &'static str,
}

impl fmt::Display for MalformedIdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Malformed service identity for {}: name must not be empty",
            shorten_type_name(self.type_name)
        )
    }
}

/// Declared dependency names don't match the constructor's arity.
#[derive(Debug)]
pub struct ArityMismatchError {
    pub service: String,
    pub declared: Vec<&'static str>,
    pub arity: usize,
}

impl fmt::Display for ArityMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dependency count mismatch for {}: {} declared {:?}, constructor takes {}",
            self.service,
            self.declared.len(),
            self.declared,
            self.arity,
        )?;
        write!(
            f,
            "\n  Hint: Keep the dependency list and the constructor parameters in sync"
        )
    }
}

/// A second identity tried to register under an existing name.
#[derive(Debug)]
pub struct DuplicateNameError {
    pub name: String,
}

impl fmt::Display for DuplicateNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service name {:?} is already used by another identity",
            self.name
        )?;
        write!(
            f,
            "\n  Hint: Reuse the existing identity to replace its registration"
        )
    }
}

/// Identity registered twice while overriding is disabled.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub service: String,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service already registered: {}", self.service)?;
        write!(f, "\n  Hint: Enable allow_override in the registry settings")
    }
}

/// Requested identity was never registered.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// Name of the requested service.
    pub requested: String,
    /// Label of the service that required it, if any.
    pub required_by: Option<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service not registered: {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        write!(
            f,
            "\n  Hint: Did you forget to register {:?} before calling build()?",
            self.requested
        )
    }
}

/// Requested name is not registered.
#[derive(Debug)]
pub struct UnknownNameError {
    pub name: String,
    pub required_by: Option<String>,
    /// Registered names close to the requested one.
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnknownNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No service registered under name {:?}", self.name)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }
        Ok(())
    }
}

/// One service on a resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub name: String,
    pub lifetime: Lifetime,
    pub style: &'static str,
}

impl ChainLink {
    /// Short label: `"<lifetime> <style> <name>"`.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.lifetime, self.style, self.name)
    }
}

/// Circular dependency detected during resolution.
///
/// `chain` holds every service on the resolution stack in the order they
/// were entered, followed by the service that closed the cycle.
#[derive(Debug)]
pub struct CircularDependencyError {
    pub chain: Vec<ChainLink>,
}

impl CircularDependencyError {
    /// Names along the chain, in order.
    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|l| l.name.as_str()).collect()
    }

    /// Multi-line rendering of the chain, one service per line.
    pub fn render_vertical(&self) -> String {
        let entries: Vec<ChainEntry> = self
            .chain
            .iter()
            .map(|l| ChainEntry {
                name: l.name.clone(),
                lifetime: l.lifetime.to_string(),
                style: l.style.to_string(),
            })
            .collect();
        render_chain_vertical(&entries)
    }
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.chain.iter().map(ChainLink::label).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&labels))?;
        write!(
            f,
            "\n  Hint: Break the cycle by restructuring one of these services"
        )
    }
}

/// A longer-lived service required a shorter-lived one.
///
/// A Transient frozen inside a Singleton would never be refreshed.
#[derive(Debug)]
pub struct LifetimeViolationError {
    /// The service being required.
    pub dependency: ChainLink,
    /// The service that required it.
    pub consumer: ChainLink,
}

impl fmt::Display for LifetimeViolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lifetime violation: {} cannot depend on {}",
            self.consumer.label(),
            self.dependency.label(),
        )?;
        write!(
            f,
            "\n  Hint: Make {} {} or make {} {}",
            self.dependency.name,
            self.consumer.lifetime,
            self.consumer.name,
            self.dependency.lifetime,
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, WiringError>;
