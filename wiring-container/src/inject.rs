//! Constructor-like callables for Injected registrations.
//!
//! An [`Injected`] pairs a constructor taking `Arc<D1>, …, Arc<Dn>` with the
//! list of registered names to feed it, in parameter order:
//!
//! ```
//! use std::sync::Arc;
//! use wiring_container::inject::{inject, Construct};
//!
//! struct Config;
//! struct Client { config: Arc<Config> }
//!
//! let ctor = inject(&["config"], |config: Arc<Config>| Client { config });
//! assert_eq!(ctor.dependencies(), &["config"]);
//! assert_eq!(ctor.arity(), 1);
//! ```
//!
//! The registry refuses the registration when the two counts differ.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptor::{Instance, downcast};
use crate::error::{Result, WiringError};

/// Something callable with resolved dependencies.
///
/// Implemented for closures and functions of up to eight `Arc<_>`
/// parameters. `Args` is the parameter tuple (`(Arc<D1>, …)`) and only
/// exists to keep the impls apart.
pub trait Construct<Args>: Send + Sync + 'static {
    /// What the constructor returns.
    type Output;

    /// Formal parameter count.
    const ARITY: usize;

    /// Calls the constructor. `args` holds one `(name, instance)` pair per
    /// parameter, already resolved.
    fn construct(&self, args: Vec<(&'static str, Instance)>) -> Result<Self::Output>;
}

macro_rules! impl_construct {
    ($arity:expr; $($dep:ident),*) => {
        impl<F, R, $($dep,)*> Construct<($(Arc<$dep>,)*)> for F
        where
            F: Fn($(Arc<$dep>),*) -> R + Send + Sync + 'static,
            $($dep: ?Sized + Send + Sync + 'static,)*
        {
            type Output = R;
            const ARITY: usize = $arity;

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn construct(&self, args: Vec<(&'static str, Instance)>) -> Result<R> {
                let mut args = args.into_iter();
                $(
                    let $dep: Arc<$dep> = match args.next() {
                        Some((name, instance)) => downcast::<$dep>(&instance, name)?,
                        None => {
                            return Err(WiringError::InternalConsistency {
                                service: std::any::type_name::<$dep>().to_string(),
                                detail: "constructor argument missing",
                            });
                        }
                    };
                )*
                Ok(self($($dep),*))
            }
        }
    };
}

impl_construct!(0;);
impl_construct!(1; A1);
impl_construct!(2; A1, A2);
impl_construct!(3; A1, A2, A3);
impl_construct!(4; A1, A2, A3, A4);
impl_construct!(5; A1, A2, A3, A4, A5);
impl_construct!(6; A1, A2, A3, A4, A5, A6);
impl_construct!(7; A1, A2, A3, A4, A5, A6, A7);
impl_construct!(8; A1, A2, A3, A4, A5, A6, A7, A8);

/// A constructor plus its declared dependency names.
pub struct Injected<F, Args> {
    dependencies: &'static [&'static str],
    constructor: F,
    _args: PhantomData<fn(Args)>,
}

impl<F, Args> Injected<F, Args>
where
    F: Construct<Args>,
{
    /// A constructor without declared dependencies.
    pub fn new(constructor: F) -> Self {
        Self::with_dependencies(&[], constructor)
    }

    /// A constructor fed by `dependencies`, in parameter order.
    pub fn with_dependencies(dependencies: &'static [&'static str], constructor: F) -> Self {
        Self {
            dependencies,
            constructor,
            _args: PhantomData,
        }
    }

    /// Declared dependency names.
    pub fn dependencies(&self) -> &'static [&'static str] {
        self.dependencies
    }

    /// Parameter count of the constructor.
    pub fn arity(&self) -> usize {
        F::ARITY
    }

    pub(crate) fn into_parts(self) -> (&'static [&'static str], F) {
        (self.dependencies, self.constructor)
    }
}

/// Shorthand for [`Injected::with_dependencies`].
pub fn inject<F, Args>(dependencies: &'static [&'static str], constructor: F) -> Injected<F, Args>
where
    F: Construct<Args>,
{
    Injected::with_dependencies(dependencies, constructor)
}
