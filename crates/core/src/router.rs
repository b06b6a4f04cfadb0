//! Router facade: resolve a module contract and make its destination.

use crate::completion::RouteCompletion;
use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::pipeline::{GlobalErrorHandler, ModulePreparer, Pipeline, Request};
use crate::registry::ModuleRegistry;
use crate::route::ModuleRoute;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use wayfinder_api::{
    Action, ModuleContract, ModuleIdentity, PerformConfig, RoutableModule, RouteError,
};

/// Entry point for routing. Holds no state about past calls; each
/// `make_destination*` call runs an independent pipeline.
pub struct Router {
    registry: Arc<ModuleRegistry>,
    dispatcher: Dispatcher,
    error_handler: RwLock<Option<GlobalErrorHandler>>,
}

impl Router {
    pub fn new(registry: Arc<ModuleRegistry>, config: RouterConfig) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(config.dispatch),
            error_handler: RwLock::new(None),
        }
    }

    /// Router over the process-wide registry, configured from the environment.
    pub fn shared() -> Self {
        Self::new(ModuleRegistry::global(), RouterConfig::from_env())
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Set the error handler invoked for every failed route, for debugging and logging.
    pub fn set_global_error_handler<F>(&self, handler: F)
    where
        F: Fn(&ModuleIdentity, Action, &RouteError) + Send + Sync + 'static,
    {
        *self
            .error_handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    pub fn clear_global_error_handler(&self) {
        *self
            .error_handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Resolve `module`. `None` when neither a provider nor an adapter is
    /// registered for it.
    pub fn to<C: ModuleContract>(&self, _module: RoutableModule<C>) -> Option<RouteHandle<'_, C>> {
        self.registry
            .snapshot()
            .resolve::<C>()
            .map(|route| RouteHandle {
                router: self,
                route,
            })
    }

    /// Resolve a handle through a registered string identifier. The
    /// identifier must be bound to exactly `C`.
    pub fn to_identifier<C: ModuleContract>(&self, identifier: &str) -> Option<RouteHandle<'_, C>> {
        match self.registry.identifier(identifier) {
            Some(identity) if identity == ModuleIdentity::of::<C>() => {
                self.to(RoutableModule::<C>::new())
            }
            Some(identity) => {
                tracing::debug!(
                    identifier = %identifier,
                    bound = %identity,
                    "Identifier is bound to a different module"
                );
                None
            }
            None => None,
        }
    }

    pub fn make_destination<C: ModuleContract>(
        &self,
        _module: RoutableModule<C>,
    ) -> Option<Arc<C::Destination>> {
        self.pipeline::<C>(None).run(Request::bare())
    }

    pub fn make_destination_with_preparation<'p, C, P>(
        &self,
        _module: RoutableModule<C>,
        preparation: P,
    ) -> Option<Arc<C::Destination>>
    where
        C: ModuleContract,
        P: FnOnce(&mut C::Module) + 'p,
    {
        self.pipeline::<C>(None)
            .run(Request::with_preparation(preparation))
    }

    /// The caller fills the handler config and may prepare the module through
    /// the preparer, which also exercises the performer path.
    pub fn make_destination_configuring<'p, C, F>(
        &self,
        _module: RoutableModule<C>,
        configure: F,
    ) -> Option<Arc<C::Destination>>
    where
        C: ModuleContract,
        F: FnOnce(&mut PerformConfig<C::Destination>, &mut ModulePreparer<'p, C::Module>),
    {
        self.pipeline::<C>(None).run(Request::configuring(configure))
    }

    /// Resolves lazily when `route` is `None`, so unregistered modules still
    /// run through the pipeline and reach the error handlers.
    fn pipeline<C: ModuleContract>(&self, route: Option<Arc<dyn ModuleRoute<C>>>) -> Pipeline<C> {
        let route = route.or_else(|| self.registry.snapshot().resolve::<C>());
        let error_handler = self
            .error_handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Pipeline::new(route, self.dispatcher, error_handler)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::shared()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("dispatch", &self.dispatcher.mode())
            .field("modules", &self.registry.identities().len())
            .finish()
    }
}

/// A resolved module contract, borrowed from its router.
pub struct RouteHandle<'r, C: ModuleContract> {
    router: &'r Router,
    route: Arc<dyn ModuleRoute<C>>,
}

impl<'r, C: ModuleContract> RouteHandle<'r, C> {
    pub fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::of::<C>()
    }

    /// Identity of the provider that will build the destination.
    pub fn target(&self) -> ModuleIdentity {
        self.route.target()
    }

    pub fn is_adapted(&self) -> bool {
        self.route.is_adapted()
    }

    /// True iff a provider is bound and reachable. Never instantiates a module.
    pub fn can_make_destination(&self) -> bool {
        self.route.can_make_destination()
    }

    pub fn make_destination(&self) -> Option<Arc<C::Destination>> {
        self.pipeline().run(Request::bare())
    }

    pub fn make_destination_with_preparation<'p, P>(
        &self,
        preparation: P,
    ) -> Option<Arc<C::Destination>>
    where
        P: FnOnce(&mut C::Module) + 'p,
    {
        self.pipeline().run(Request::with_preparation(preparation))
    }

    pub fn make_destination_configuring<'p, F>(&self, configure: F) -> Option<Arc<C::Destination>>
    where
        F: FnOnce(&mut PerformConfig<C::Destination>, &mut ModulePreparer<'p, C::Module>),
    {
        self.pipeline().run(Request::configuring(configure))
    }

    /// Like `make_destination_configuring`, also returning a future that
    /// resolves with the terminal result once handlers have been delivered.
    pub fn perform<'p, F>(
        &self,
        configure: F,
    ) -> (Option<Arc<C::Destination>>, RouteCompletion<C::Destination>)
    where
        F: FnOnce(&mut PerformConfig<C::Destination>, &mut ModulePreparer<'p, C::Module>),
    {
        let (sender, completion) = RouteCompletion::channel(self.identity().contract.name());
        let mut request = Request::configuring(configure);
        request.config.chain_completion(move |action, result| {
            let _ = sender.send((action, result));
        });
        (self.pipeline().run(request), completion)
    }

    fn pipeline(&self) -> Pipeline<C> {
        self.router.pipeline(Some(Arc::clone(&self.route)))
    }
}

impl<C: ModuleContract> fmt::Debug for RouteHandle<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandle")
            .field("identity", &self.identity())
            .field("target", &self.target())
            .field("can_make_destination", &self.can_make_destination())
            .finish()
    }
}
