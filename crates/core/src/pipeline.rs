//! Destination construction pipeline.
//!
//! One run per `make_destination` call:
//! `Resolving -> Adapting -> Instantiating -> Preparing ->
//! AwaitingModuleCompletion -> Dispatching -> Done`.
//! Failures short-circuit to `Done` and are reported through the error
//! handlers; the destination is only returned on success. A panic in a
//! factory, preparation, build step or module completion counts as a
//! `ConstructionFailed` at that stage.

use crate::dispatch::Dispatcher;
use crate::provider::Built;
use crate::route::ModuleRoute;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use wayfinder_api::{
    Action, ModuleContract, ModuleIdentity, PerformConfig, PipelineStage, RouteError,
    RouteOutcome, RouteResult,
};

type Preparation<'p, M> = Box<dyn FnOnce(&mut M) + 'p>;

/// Observer invoked for every failed route, in addition to per-call handlers.
pub type GlobalErrorHandler = Arc<dyn Fn(&ModuleIdentity, Action, &RouteError) + Send + Sync>;

/// Handed to the configuring form so the caller can prepare the module.
/// Preparing through it exercises the performer path.
pub struct ModulePreparer<'p, M> {
    preparation: Option<Preparation<'p, M>>,
}

impl<'p, M> ModulePreparer<'p, M> {
    pub(crate) fn new() -> Self {
        Self { preparation: None }
    }

    /// Supply the preparation closure. A second call replaces the first.
    pub fn prepare_module<F>(&mut self, preparation: F)
    where
        F: FnOnce(&mut M) + 'p,
    {
        if self.preparation.replace(Box::new(preparation)).is_some() {
            tracing::warn!("prepare_module called more than once, keeping the last preparation");
        }
    }

    pub(crate) fn into_inner(self) -> Option<Preparation<'p, M>> {
        self.preparation
    }
}

/// Everything one call brings to the pipeline.
pub(crate) struct Request<'p, C: ModuleContract> {
    pub(crate) preparation: Option<Preparation<'p, C::Module>>,
    pub(crate) config: PerformConfig<C::Destination>,
    /// Whether `preparation` came from the performer.
    pub(crate) performer: bool,
}

impl<'p, C: ModuleContract> Request<'p, C> {
    pub(crate) fn bare() -> Self {
        Self {
            preparation: None,
            config: PerformConfig::new(),
            performer: false,
        }
    }

    pub(crate) fn with_preparation<P>(preparation: P) -> Self
    where
        P: FnOnce(&mut C::Module) + 'p,
    {
        Self {
            preparation: Some(Box::new(preparation)),
            config: PerformConfig::new(),
            performer: false,
        }
    }

    pub(crate) fn configuring<F>(configure: F) -> Self
    where
        F: FnOnce(&mut PerformConfig<C::Destination>, &mut ModulePreparer<'p, C::Module>),
    {
        let mut config = PerformConfig::new();
        let mut preparer = ModulePreparer::new();
        configure(&mut config, &mut preparer);
        let preparation = preparer.into_inner();
        Self {
            performer: preparation.is_some(),
            preparation,
            config,
        }
    }
}

pub(crate) struct Pipeline<C: ModuleContract> {
    identity: ModuleIdentity,
    route: Option<Arc<dyn ModuleRoute<C>>>,
    dispatcher: Dispatcher,
    error_handler: Option<GlobalErrorHandler>,
}

impl<C: ModuleContract> Pipeline<C> {
    pub(crate) fn new(
        route: Option<Arc<dyn ModuleRoute<C>>>,
        dispatcher: Dispatcher,
        error_handler: Option<GlobalErrorHandler>,
    ) -> Self {
        Self {
            identity: ModuleIdentity::of::<C>(),
            route,
            dispatcher,
            error_handler,
        }
    }

    pub(crate) fn run(self, request: Request<'_, C>) -> Option<Arc<C::Destination>> {
        let Request {
            preparation,
            config,
            performer,
        } = request;

        match self.construct(preparation) {
            Ok(destination) => {
                self.enter(PipelineStage::Dispatching);
                let outcome = RouteOutcome::success(Arc::clone(&destination), performer);
                let _ticket = self.dispatcher.dispatch(move || config.deliver(outcome));
                self.enter(PipelineStage::Done);
                Some(destination)
            }
            Err(error) => {
                // The performer path starts at `Preparing`.
                let performer = performer && error.stage().reaches_performer();
                self.report(&error, performer);
                let outcome = RouteOutcome::failure(error, performer);
                let _ticket = self.dispatcher.dispatch(move || config.deliver(outcome));
                None
            }
        }
    }

    fn construct(
        &self,
        preparation: Option<Preparation<'_, C::Module>>,
    ) -> RouteResult<Arc<C::Destination>> {
        self.enter(PipelineStage::Resolving);
        let route = self
            .route
            .as_ref()
            .ok_or_else(|| RouteError::UnregisteredModule {
                module: self.identity.to_string(),
            })?;

        self.enter(PipelineStage::Adapting);
        if !route.can_make_destination() {
            return Err(RouteError::IncompatibleInput {
                requested: self.identity.contract.name().to_string(),
                required: route.target().contract.name().to_string(),
            });
        }

        self.enter(PipelineStage::Instantiating);
        let mut module = self.guard(PipelineStage::Instantiating, || route.instantiate())?;

        self.enter(PipelineStage::Preparing);
        if let Some(preparation) = preparation {
            self.guard(PipelineStage::Preparing, || {
                preparation(&mut module);
                Ok(())
            })?;
        }
        let Built {
            destination,
            completion,
        } = self.guard(PipelineStage::Preparing, || route.build(module))?;

        self.enter(PipelineStage::AwaitingModuleCompletion);
        if let Some(completion) = completion {
            self.guard(PipelineStage::AwaitingModuleCompletion, || {
                completion(&*destination);
                Ok(())
            })?;
        }

        Ok(destination)
    }

    /// Run caller or provider code, turning a panic into `ConstructionFailed`.
    fn guard<T>(
        &self,
        stage: PipelineStage,
        work: impl FnOnce() -> RouteResult<T>,
    ) -> RouteResult<T> {
        panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
            Err(RouteError::ConstructionFailed {
                module: self.identity.contract.name().to_string(),
                stage,
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            })
        })
    }

    fn enter(&self, stage: PipelineStage) {
        tracing::debug!(module = %self.identity.contract, stage = %stage, "pipeline.stage");
    }

    fn report(&self, error: &RouteError, performer: bool) {
        tracing::warn!(
            module = %self.identity,
            stage = %error.stage(),
            "Failed to make destination: {}",
            error
        );
        if let Some(handler) = &self.error_handler {
            handler(&self.identity, Action::Provider, error);
            if performer {
                handler(&self.identity, Action::Performer, error);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_api::{CompletionSlot, ModuleInstance};

    trait Label: Send + Sync {}

    #[derive(Default)]
    struct LabelModule {
        text: String,
        completion: CompletionSlot<dyn Label>,
    }

    impl ModuleInstance for LabelModule {
        type Destination = dyn Label;

        fn completion_slot(&mut self) -> &mut CompletionSlot<dyn Label> {
            &mut self.completion
        }
    }

    struct LabelInput;

    impl ModuleContract for LabelInput {
        type Module = LabelModule;
        type Destination = dyn Label;
    }

    #[test]
    fn test_configuring_without_preparer_is_not_performer() {
        let request = Request::<LabelInput>::configuring(|config, _| {
            config.on_success(|_| {});
        });
        assert!(!request.performer);
        assert!(request.preparation.is_none());
        assert!(!request.config.is_empty());
    }

    #[test]
    fn test_last_preparation_wins() {
        let request = Request::<LabelInput>::configuring(|_, preparer| {
            preparer.prepare_module(|module| module.text.push_str("first"));
            preparer.prepare_module(|module| module.text.push_str("second"));
        });
        assert!(request.performer);

        let mut module = LabelModule::default();
        (request.preparation.unwrap())(&mut module);
        assert_eq!(module.text, "second");
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 1");
    }

    #[test]
    fn test_preparation_is_not_performer() {
        let request = Request::<LabelInput>::with_preparation(|module: &mut LabelModule| {
            module.text.clear();
        });
        assert!(!request.performer);
        assert!(request.preparation.is_some());
    }
}
