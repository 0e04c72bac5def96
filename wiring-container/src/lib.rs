//! Core registry and resolver for wiring.
//!
//! Services are registered under named identities, then resolved lazily
//! with singleton caching, cycle detection and lifetime checks.

pub mod descriptor;
pub mod error;
mod graph;
pub mod inject;
pub mod key;
pub mod lifetime;
pub mod module;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod settings;
mod stack;

pub use descriptor::{ConstructionStyle, Instance, ServiceDescriptor};
pub use error::{Result, WiringError};
pub use inject::{Construct, Injected, inject};
pub use key::{ServiceId, ServiceKey, ServiceRef, identity};
pub use lifetime::Lifetime;
pub use module::Module;
pub use provider::{Provider, Resolve};
pub use registry::Registry;
pub use resolver::Resolver;
pub use settings::RegistrySettings;

pub mod prelude {
    pub use crate::descriptor::{ConstructionStyle, Instance, ServiceDescriptor};
    pub use crate::error::{Result, WiringError};
    pub use crate::inject::{Construct, Injected, inject};
    pub use crate::key::{ServiceId, ServiceKey, ServiceRef, identity};
    pub use crate::lifetime::Lifetime;
    pub use crate::module::Module;
    pub use crate::provider::{Provider, Resolve};
    pub use crate::registry::Registry;
    pub use crate::resolver::Resolver;
    pub use crate::settings::RegistrySettings;
}
