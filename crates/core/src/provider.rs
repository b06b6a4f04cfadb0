//! Module providers: the factory bound to a contract in the registry.

use std::fmt;
use std::sync::Arc;
use wayfinder_api::{
    BoxError, ModuleCompletion, ModuleContract, ModuleIdentity, ModuleInstance, PipelineStage,
    RouteError, RouteResult,
};

type ModuleFactory<M> = Box<dyn Fn() -> Result<M, BoxError> + Send + Sync>;
type DestinationBuilder<M, D> = Box<dyn Fn(&M) -> Result<Arc<D>, BoxError> + Send + Sync>;

/// Creates fresh module instances for contract `C` and turns a prepared
/// module into its destination.
pub struct ModuleProvider<C: ModuleContract> {
    identity: ModuleIdentity,
    factory: ModuleFactory<C::Module>,
    build: DestinationBuilder<C::Module, C::Destination>,
}

/// A destination together with the completion its module registered.
pub struct Built<D: ?Sized> {
    pub destination: Arc<D>,
    pub completion: Option<ModuleCompletion<D>>,
}

impl<C: ModuleContract> ModuleProvider<C> {
    pub fn new<F, B>(factory: F, build: B) -> Self
    where
        F: Fn() -> Result<C::Module, BoxError> + Send + Sync + 'static,
        B: Fn(&C::Module) -> Result<Arc<C::Destination>, BoxError> + Send + Sync + 'static,
    {
        Self {
            identity: ModuleIdentity::of::<C>(),
            factory: Box::new(factory),
            build: Box::new(build),
        }
    }

    /// Provider whose modules start from `Default`.
    pub fn with_default<B>(build: B) -> Self
    where
        C::Module: Default,
        B: Fn(&C::Module) -> Result<Arc<C::Destination>, BoxError> + Send + Sync + 'static,
    {
        Self::new(|| Ok(C::Module::default()), build)
    }

    pub fn identity(&self) -> ModuleIdentity {
        self.identity
    }

    pub fn instantiate(&self) -> RouteResult<C::Module> {
        (self.factory)().map_err(|e| self.construction_failed(PipelineStage::Instantiating, e))
    }

    /// Build the destination from a prepared module. The module is consumed;
    /// its completion callback is handed back to the caller to fire.
    pub fn build(&self, mut module: C::Module) -> RouteResult<Built<C::Destination>> {
        let destination = (self.build)(&module)
            .map_err(|e| self.construction_failed(PipelineStage::Preparing, e))?;
        let completion = module.completion_slot().take();
        Ok(Built {
            destination,
            completion,
        })
    }

    fn construction_failed(&self, stage: PipelineStage, error: BoxError) -> RouteError {
        RouteError::ConstructionFailed {
            module: self.identity.contract.name().to_string(),
            stage,
            reason: error.to_string(),
        }
    }
}

impl<C: ModuleContract> fmt::Debug for ModuleProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleProvider")
            .field("identity", &self.identity)
            .finish()
    }
}
