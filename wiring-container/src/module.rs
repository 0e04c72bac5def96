//! Reusable groups of registrations.
//!
//! A module bundles the registrations of one area of an application so
//! the startup code stays a list of modules rather than one long chain:
//!
//! ```rust,ignore
//! let resolver = Registry::new()
//!     .add_module(&StorageModule)?
//!     .add_module(&NetworkModule { base_url })?
//!     .build()?;
//! ```

use crate::error::Result;
use crate::registry::Registry;

/// A group of related registrations.
pub trait Module: Send + Sync {
    /// Registers this module's services into `registry`.
    fn register(&self, registry: Registry) -> Result<Registry>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
