//! # Wiring: a small dependency injection runtime for Rust
//!
//! Register services under named identities, then resolve them lazily.
//! Singletons are built once and cached, transients are rebuilt on every
//! request, and every resolution is checked for cycles and for
//! longer-lived services depending on shorter-lived ones.
//!
//! ```
//! use std::sync::Arc;
//! use wiring::prelude::*;
//!
//! struct Constants { retries: u32 }
//! struct Client { constants: Arc<Constants> }
//!
//! let constants = identity::<Constants>("constants")?;
//! let client = identity::<Client>("client")?;
//!
//! let resolver = Registry::new()
//!     .register_instance(&constants, Constants { retries: 3 })?
//!     .register_injected(
//!         Lifetime::Singleton,
//!         &client,
//!         inject(&["constants"], |constants: Arc<Constants>| Client { constants }),
//!     )?
//!     .build()?;
//!
//! assert_eq!(resolver.retrieve(&client)?.constants.retries, 3);
//! # Ok::<(), WiringError>(())
//! ```

pub use wiring_container::*;
pub use wiring_support::*;
