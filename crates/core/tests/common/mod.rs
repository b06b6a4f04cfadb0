#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use wayfinder_core::api::{BoxError, CompletionSlot, ModuleContract, ModuleInstance};
use wayfinder_core::{ModuleAdapter, ModuleProvider, ModuleRegistry, Router, RouterConfig};

pub trait AServiceInput: Send + Sync {
    fn title(&self) -> Option<String>;
}

pub struct AService {
    title: Option<String>,
}

impl AServiceInput for AService {
    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

#[derive(Default)]
pub struct AServiceModule {
    pub title: Option<String>,
    completion: CompletionSlot<dyn AServiceInput>,
}

impl ModuleInstance for AServiceModule {
    type Destination = dyn AServiceInput;

    fn completion_slot(&mut self) -> &mut CompletionSlot<dyn AServiceInput> {
        &mut self.completion
    }
}

pub struct AServiceModuleInput;

impl ModuleContract for AServiceModuleInput {
    type Module = AServiceModule;
    type Destination = dyn AServiceInput;
}

/// Older module shape for the same capability, only reachable via an adapter.
#[derive(Default)]
pub struct LegacyAServiceModule {
    pub name: String,
    completion: CompletionSlot<dyn AServiceInput>,
}

impl ModuleInstance for LegacyAServiceModule {
    type Destination = dyn AServiceInput;

    fn completion_slot(&mut self) -> &mut CompletionSlot<dyn AServiceInput> {
        &mut self.completion
    }
}

pub struct LegacyAServiceModuleInput;

impl ModuleContract for LegacyAServiceModuleInput {
    type Module = LegacyAServiceModule;
    type Destination = dyn AServiceInput;
}

/// A second canonical shape that never gets a provider.
pub struct DraftAServiceModuleInput;

impl ModuleContract for DraftAServiceModuleInput {
    type Module = AServiceModule;
    type Destination = dyn AServiceInput;
}

/// Factory always fails.
pub struct BrokenFactoryInput;

impl ModuleContract for BrokenFactoryInput {
    type Module = AServiceModule;
    type Destination = dyn AServiceInput;
}

/// Factory works, building the destination fails.
pub struct BrokenBuildInput;

impl ModuleContract for BrokenBuildInput {
    type Module = AServiceModule;
    type Destination = dyn AServiceInput;
}

/// Factory panics instead of returning an error.
pub struct PanickingFactoryInput;

impl ModuleContract for PanickingFactoryInput {
    type Module = AServiceModule;
    type Destination = dyn AServiceInput;
}

fn build_service(module: &AServiceModule) -> Result<Arc<dyn AServiceInput>, BoxError> {
    Ok(Arc::new(AService {
        title: module.title.clone(),
    }))
}

pub fn a_service_provider() -> ModuleProvider<AServiceModuleInput> {
    ModuleProvider::with_default(build_service)
}

pub fn broken_factory_provider() -> ModuleProvider<BrokenFactoryInput> {
    ModuleProvider::new(|| Err("no module for you".into()), build_service)
}

pub fn broken_build_provider() -> ModuleProvider<BrokenBuildInput> {
    ModuleProvider::with_default(|_: &AServiceModule| Err("destination refused".into()))
}

pub fn panicking_factory_provider() -> ModuleProvider<PanickingFactoryInput> {
    ModuleProvider::new(|| panic!("factory exploded"), build_service)
}

pub fn legacy_adapter() -> ModuleAdapter<LegacyAServiceModuleInput, AServiceModuleInput> {
    ModuleAdapter::new(|legacy: LegacyAServiceModule| AServiceModule {
        title: Some(legacy.name),
        ..Default::default()
    })
}

pub fn draft_adapter() -> ModuleAdapter<LegacyAServiceModuleInput, DraftAServiceModuleInput> {
    ModuleAdapter::new(|legacy: LegacyAServiceModule| AServiceModule {
        title: Some(format!("draft {}", legacy.name)),
        ..Default::default()
    })
}

/// Adapter that registers a completion of its own on the adapted module.
pub fn observing_adapter(
    recorder: Recorder,
) -> ModuleAdapter<LegacyAServiceModuleInput, AServiceModuleInput> {
    ModuleAdapter::new(move |legacy: LegacyAServiceModule| {
        let mut module = AServiceModule {
            title: Some(legacy.name),
            ..Default::default()
        };
        let recorder = recorder.clone();
        module.make_destination_completion(move |_| recorder.push("adapter completion"));
        module
    })
}

/// Registry with the canonical provider and the failing providers.
pub fn setup_registry() -> Arc<ModuleRegistry> {
    let registry = ModuleRegistry::new();
    registry.register_provider(a_service_provider()).unwrap();
    registry.register_provider(broken_factory_provider()).unwrap();
    registry.register_provider(broken_build_provider()).unwrap();
    registry.register_provider(panicking_factory_provider()).unwrap();
    Arc::new(registry)
}

pub fn immediate_router(registry: Arc<ModuleRegistry>) -> Router {
    Router::new(registry, RouterConfig::immediate())
}

/// Shared, ordered log of what fired.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }
}
