//! Process-wide module registry.
//!
//! Maps module identities to providers and `(source, target)` contract pairs
//! to adapters. Writers are serialized by a mutex and publish a new table;
//! readers load the current table without locking.

use crate::adapter::ModuleAdapter;
use crate::provider::ModuleProvider;
use crate::route::{AdaptedRoute, DirectRoute, ModuleRoute};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use wayfinder_api::{
    ContractId, ModuleContract, ModuleIdentity, RegistryError, RegistryResult,
};

static GLOBAL_REGISTRY: Lazy<Arc<ModuleRegistry>> = Lazy::new(|| Arc::new(ModuleRegistry::new()));

/// Something that knows how to register its modules, typically one per
/// feature area. Collected by bootstrap code and applied at startup.
pub trait Registrant: Send + Sync {
    fn register(&self, registry: &ModuleRegistry) -> RegistryResult<()>;
}

type AnyEntry = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor of an adapted route for source contract `S`.
struct AdapterBinding<S: ModuleContract> {
    resolve: Box<dyn Fn(&RegistryTable) -> Arc<dyn ModuleRoute<S>> + Send + Sync>,
}

#[derive(Clone)]
struct AdapterEntry {
    source: ModuleIdentity,
    target: ModuleIdentity,
    binding: AnyEntry,
}

#[derive(Clone, Default)]
pub(crate) struct RegistryTable {
    providers: HashMap<ModuleIdentity, AnyEntry>,
    adapters: HashMap<(ContractId, ContractId), AdapterEntry>,
    identifiers: HashMap<String, ModuleIdentity>,
}

impl RegistryTable {
    fn provider<C: ModuleContract>(&self) -> Option<Arc<ModuleProvider<C>>> {
        self.providers
            .get(&ModuleIdentity::of::<C>())
            .and_then(|entry| Arc::clone(entry).downcast::<ModuleProvider<C>>().ok())
    }

    fn has_provider(&self, identity: &ModuleIdentity) -> bool {
        self.providers.contains_key(identity)
    }

    /// Resolve the route for `C`: a direct provider wins, otherwise the first
    /// adapter (by target name) whose target has a provider, otherwise any
    /// adapter so the caller can report the incompatibility.
    pub(crate) fn resolve<C: ModuleContract>(&self) -> Option<Arc<dyn ModuleRoute<C>>> {
        if let Some(provider) = self.provider::<C>() {
            return Some(Arc::new(DirectRoute { provider }));
        }

        let source = ContractId::of::<C>();
        let mut candidates: Vec<&AdapterEntry> = self
            .adapters
            .values()
            .filter(|entry| entry.source.contract == source)
            .collect();
        candidates.sort_by_key(|entry| {
            (
                !self.has_provider(&entry.target),
                entry.target.contract.name(),
            )
        });

        candidates.into_iter().find_map(|entry| {
            let binding = Arc::clone(&entry.binding)
                .downcast::<AdapterBinding<C>>()
                .ok()?;
            Some((binding.resolve)(self))
        })
    }
}

/// Registry of module providers and adapters.
pub struct ModuleRegistry {
    table: ArcSwap<RegistryTable>,
    writer: Mutex<()>,
    finished: AtomicBool,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(RegistryTable::default()),
            writer: Mutex::new(()),
            finished: AtomicBool::new(false),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ModuleRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Bind `C` to `provider`. Fails if `C` is already bound; nothing is overwritten.
    pub fn register_provider<C: ModuleContract>(
        &self,
        provider: ModuleProvider<C>,
    ) -> RegistryResult<()> {
        let identity = provider.identity();
        self.update(|table| {
            if table.providers.contains_key(&identity) {
                return Err(RegistryError::DuplicateRegistration {
                    key: identity.to_string(),
                });
            }
            table.providers.insert(identity, Arc::new(provider));
            Ok(())
        })?;
        tracing::info!(module = %identity, "Registered module provider");
        Ok(())
    }

    /// Bind the contract pair `(S, T)` to `adapter`. Fails if the pair is already bound.
    pub fn register_adapter<S, T>(&self, adapter: ModuleAdapter<S, T>) -> RegistryResult<()>
    where
        S: ModuleContract,
        T: ModuleContract<Destination = S::Destination>,
    {
        let source = ModuleIdentity::of::<S>();
        let target = ModuleIdentity::of::<T>();
        debug_assert!(source.shares_capability(&target));
        let adapter = Arc::new(adapter);
        let binding = AdapterBinding::<S> {
            resolve: Box::new(move |table: &RegistryTable| -> Arc<dyn ModuleRoute<S>> {
                Arc::new(AdaptedRoute {
                    adapter: Arc::clone(&adapter),
                    provider: table.provider::<T>(),
                })
            }),
        };

        self.update(|table| {
            let key = (source.contract, target.contract);
            if table.adapters.contains_key(&key) {
                return Err(RegistryError::DuplicateRegistration {
                    key: format!("{} => {}", source.contract, target.contract),
                });
            }
            table.adapters.insert(
                key,
                AdapterEntry {
                    source,
                    target,
                    binding: Arc::new(binding),
                },
            );
            Ok(())
        })?;
        tracing::info!(source = %source, target = %target, "Registered module adapter");
        Ok(())
    }

    /// Bind a unique string identifier (e.g. `app://login`) to contract `C`.
    pub fn register_identifier<C: ModuleContract>(
        &self,
        identifier: impl Into<String>,
    ) -> RegistryResult<()> {
        let identifier = identifier.into();
        let identity = ModuleIdentity::of::<C>();
        self.update(|table| {
            if let Some(bound) = table.identifiers.get(&identifier) {
                return Err(RegistryError::IdentifierConflict {
                    identifier: identifier.clone(),
                    bound: bound.to_string(),
                });
            }
            table.identifiers.insert(identifier.clone(), identity);
            Ok(())
        })?;
        tracing::info!(
            identifier = %identifier,
            module = %identity,
            "Registered module identifier"
        );
        Ok(())
    }

    /// Apply every registrant in order, stopping at the first failure.
    pub fn register_all<'a>(
        &self,
        registrants: impl IntoIterator<Item = &'a dyn Registrant>,
    ) -> RegistryResult<()> {
        for registrant in registrants {
            registrant.register(self)?;
        }
        Ok(())
    }

    pub fn lookup<C: ModuleContract>(&self) -> Option<Arc<ModuleProvider<C>>> {
        self.table.load().provider::<C>()
    }

    pub fn identifier(&self, identifier: &str) -> Option<ModuleIdentity> {
        self.table.load().identifiers.get(identifier).copied()
    }

    /// Every identity reachable through the registry, providers and adapter
    /// sources alike, sorted by contract name.
    pub fn identities(&self) -> Vec<ModuleIdentity> {
        let table = self.table.load();
        let mut identities: Vec<ModuleIdentity> = table.providers.keys().copied().collect();
        for entry in table.adapters.values() {
            if !identities.contains(&entry.source) {
                identities.push(entry.source);
            }
        }
        identities.sort_by_key(|identity| identity.contract.name());
        identities
    }

    /// Close the registry. Later registrations fail with `RegistrationClosed`.
    pub fn finish_registration(&self) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.finished.store(true, Ordering::Release);
        tracing::debug!("Module registration finished");
    }

    pub fn is_registration_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot(&self) -> Arc<RegistryTable> {
        self.table.load_full()
    }

    fn update<F>(&self, mutate: F) -> RegistryResult<()>
    where
        F: FnOnce(&mut RegistryTable) -> RegistryResult<()>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.finished.load(Ordering::Acquire) {
            return Err(RegistryError::RegistrationClosed);
        }
        let mut next = RegistryTable::clone(&self.table.load());
        mutate(&mut next)?;
        self.table.store(Arc::new(next));
        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
