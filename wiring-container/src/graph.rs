//! Build-time validation of declared dependencies.
//!
//! Injected descriptors declare their dependencies by name, so part of the
//! graph is known before anything is constructed. When enabled through
//! [`RegistrySettings::validate_on_build`](crate::settings::RegistrySettings),
//! [`Registry::build`](crate::registry::Registry::build) walks those edges
//! and reports the errors `retrieve` would otherwise report later:
//! - unknown dependency names
//! - cycles
//! - longer-lived services declaring shorter-lived dependencies
//!
//! Factories are opaque and contribute no edges.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use wiring_support::rendering::{render_chain, suggest_similar};

use crate::descriptor::ServiceDescriptor;
use crate::error::{
    ChainLink, CircularDependencyError, LifetimeViolationError, Result, UnknownNameError,
    WiringError,
};
use crate::key::ServiceKey;

/// Depth-first walk over declared dependency names.
pub(crate) struct GraphValidator<'a> {
    descriptors: &'a HashMap<ServiceKey, Arc<ServiceDescriptor>>,
    names: &'a HashMap<Arc<str>, ServiceKey>,
    max_suggestions: usize,
    /// Current DFS path, for cycle detection and error reporting
    path: Vec<&'a ServiceDescriptor>,
    validated: HashSet<ServiceKey>,
}

impl<'a> GraphValidator<'a> {
    pub fn new(
        descriptors: &'a HashMap<ServiceKey, Arc<ServiceDescriptor>>,
        names: &'a HashMap<Arc<str>, ServiceKey>,
        max_suggestions: usize,
    ) -> Self {
        Self {
            descriptors,
            names,
            max_suggestions,
            path: Vec::new(),
            validated: HashSet::new(),
        }
    }

    /// Validates every registered descriptor.
    ///
    /// Descriptors are visited in name order so the reported error does
    /// not depend on hash order.
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&mut self) -> Result<()> {
        let mut roots: Vec<&'a ServiceDescriptor> =
            self.descriptors.values().map(Arc::as_ref).collect();
        roots.sort_by(|a, b| a.name().cmp(b.name()));

        debug!(services = roots.len(), "Validating declared dependencies");

        for descriptor in roots {
            self.visit(descriptor)?;
        }

        debug!("Declared dependencies are valid");
        Ok(())
    }

    fn visit(&mut self, descriptor: &'a ServiceDescriptor) -> Result<()> {
        if self.validated.contains(descriptor.key()) {
            return Ok(());
        }

        if self.path.iter().any(|d| d.key() == descriptor.key()) {
            let mut chain: Vec<ChainLink> = self.path.iter().map(|d| d.link()).collect();
            chain.push(descriptor.link());
            let labels: Vec<String> = chain.iter().map(ChainLink::label).collect();
            warn!(cycle = %render_chain(&labels), "Circular dependency declared");
            return Err(WiringError::CircularDependency(CircularDependencyError {
                chain,
            }));
        }

        self.path.push(descriptor);
        for &name in descriptor.dependencies() {
            let dependency = self.lookup(name, descriptor)?;

            // A cycle through the dependency is reported before the violation.
            if !descriptor.lifetime().can_depend_on(dependency.lifetime())
                && !self.leads_back(dependency)
            {
                warn!(
                    consumer = %descriptor.label(),
                    dependency = %dependency.label(),
                    "Lifetime violation declared"
                );
                return Err(WiringError::LifetimeViolation(LifetimeViolationError {
                    dependency: dependency.link(),
                    consumer: descriptor.link(),
                }));
            }

            self.visit(dependency)?;
        }
        self.path.pop();

        self.validated.insert(descriptor.key().clone());
        Ok(())
    }

    /// Whether `descriptor` is on the current path or declares its way
    /// back onto it.
    fn leads_back(&self, descriptor: &'a ServiceDescriptor) -> bool {
        let mut pending = vec![descriptor];
        let mut seen: HashSet<&ServiceKey> = HashSet::new();

        while let Some(current) = pending.pop() {
            if self.path.iter().any(|d| d.key() == current.key()) {
                return true;
            }
            if !seen.insert(current.key()) {
                continue;
            }
            pending.extend(
                current
                    .dependencies()
                    .iter()
                    .filter_map(|&name| self.names.get(name))
                    .filter_map(|key| self.descriptors.get(key))
                    .map(Arc::as_ref),
            );
        }
        false
    }

    fn lookup(
        &self,
        name: &str,
        required_by: &ServiceDescriptor,
    ) -> Result<&'a ServiceDescriptor> {
        self.names
            .get(name)
            .and_then(|key| self.descriptors.get(key))
            .map(Arc::as_ref)
            .ok_or_else(|| {
                let available: Vec<&str> = self.names.keys().map(|n| n.as_ref()).collect();
                WiringError::UnknownName(UnknownNameError {
                    name: name.to_string(),
                    required_by: Some(required_by.label()),
                    suggestions: suggest_similar(name, &available, self.max_suggestions),
                })
            })
    }
}
