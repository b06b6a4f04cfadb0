//! Resolved routes: how a requested contract reaches a provider.

use crate::adapter::ModuleAdapter;
use crate::provider::{Built, ModuleProvider};
use std::sync::Arc;
use wayfinder_api::{ModuleContract, ModuleIdentity, ModuleInstance, RouteError, RouteResult};

/// A resolved path from contract `C` to the provider that will build it.
pub(crate) trait ModuleRoute<C: ModuleContract>: Send + Sync {
    /// Identity of the provider at the end of the route.
    fn target(&self) -> ModuleIdentity;

    fn is_adapted(&self) -> bool;

    /// True iff a provider is bound at the end of the route.
    fn can_make_destination(&self) -> bool;

    fn instantiate(&self) -> RouteResult<C::Module>;

    /// Translate the prepared module if needed and build the destination.
    fn build(&self, module: C::Module) -> RouteResult<Built<C::Destination>>;
}

pub(crate) struct DirectRoute<C: ModuleContract> {
    pub(crate) provider: Arc<ModuleProvider<C>>,
}

impl<C: ModuleContract> ModuleRoute<C> for DirectRoute<C> {
    fn target(&self) -> ModuleIdentity {
        self.provider.identity()
    }

    fn is_adapted(&self) -> bool {
        false
    }

    fn can_make_destination(&self) -> bool {
        true
    }

    fn instantiate(&self) -> RouteResult<C::Module> {
        self.provider.instantiate()
    }

    fn build(&self, module: C::Module) -> RouteResult<Built<C::Destination>> {
        self.provider.build(module)
    }
}

pub(crate) struct AdaptedRoute<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    pub(crate) adapter: Arc<ModuleAdapter<S, T>>,
    pub(crate) provider: Option<Arc<ModuleProvider<T>>>,
}

impl<S, T> AdaptedRoute<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    fn provider(&self) -> RouteResult<&Arc<ModuleProvider<T>>> {
        self.provider
            .as_ref()
            .ok_or_else(|| RouteError::IncompatibleInput {
                requested: self.adapter.source().name().to_string(),
                required: self.adapter.target().name().to_string(),
            })
    }
}

impl<S, T> ModuleRoute<S> for AdaptedRoute<S, T>
where
    S: ModuleContract,
    T: ModuleContract<Destination = S::Destination>,
{
    fn target(&self) -> ModuleIdentity {
        ModuleIdentity::of::<T>()
    }

    fn is_adapted(&self) -> bool {
        true
    }

    fn can_make_destination(&self) -> bool {
        self.provider.is_some()
    }

    fn instantiate(&self) -> RouteResult<S::Module> {
        self.provider()?;
        Ok(self.adapter.instantiate())
    }

    fn build(&self, mut module: S::Module) -> RouteResult<Built<S::Destination>> {
        let provider = self.provider()?;
        // The caller's completion follows the module across the adapter.
        let completion = module.completion_slot().take();
        let mut adapted = self.adapter.adapt(module);
        if let Some(completion) = completion {
            let slot = adapted.completion_slot();
            match slot.take() {
                Some(own) => {
                    slot.set(move |destination: &S::Destination| {
                        own(destination);
                        completion(destination);
                    });
                }
                None => {
                    slot.set(completion);
                }
            }
        }
        provider.build(adapted)
    }
}
