//! Adapters bridge a non-canonical module input shape to the canonical one
//! a provider expects. They are the only place such translation happens.

use std::fmt;
use wayfinder_api::{ContractId, ModuleContract};

type SourceFactory<M> = Box<dyn Fn() -> M + Send + Sync>;
type Adapt<S, T> = Box<dyn Fn(S) -> T + Send + Sync>;

/// Bridges modules of contract `S` to contract `T`.
///
/// Both contracts must expose the same destination capability, so routing
/// through the adapter yields the same kind of destination as routing to `T`.
/// `adapt` only maps fields; a completion registered on the source module is
/// moved to the adapted module by the router.
pub struct ModuleAdapter<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    factory: SourceFactory<S::Module>,
    adapt: Adapt<S::Module, T::Module>,
}

impl<S, T> ModuleAdapter<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    pub fn new<A>(adapt: A) -> Self
    where
        S::Module: Default,
        A: Fn(S::Module) -> T::Module + Send + Sync + 'static,
    {
        Self::with_factory(<S::Module as Default>::default, adapt)
    }

    pub fn with_factory<F, A>(factory: F, adapt: A) -> Self
    where
        F: Fn() -> S::Module + Send + Sync + 'static,
        A: Fn(S::Module) -> T::Module + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            adapt: Box::new(adapt),
        }
    }

    pub fn source(&self) -> ContractId {
        ContractId::of::<S>()
    }

    pub fn target(&self) -> ContractId {
        ContractId::of::<T>()
    }

    /// A fresh module in the source shape, for the caller to prepare.
    pub fn instantiate(&self) -> S::Module {
        (self.factory)()
    }

    pub fn adapt(&self, module: S::Module) -> T::Module {
        (self.adapt)(module)
    }
}

impl<S, T> fmt::Debug for ModuleAdapter<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleAdapter")
            .field("source", &self.source())
            .field("target", &self.target())
            .finish()
    }
}
