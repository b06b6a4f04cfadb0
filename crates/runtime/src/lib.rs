mod logging;

use std::sync::Arc;
use wayfinder_api::RegistryResult;
use wayfinder_core::{ModuleRegistry, Registrant, Router, RouterConfig};

pub use logging::{init_logging, log_dir};

/// Bootstraps the process-wide router.
///
/// Applies every registrant to the global registry, closes registration and
/// returns a router configured from the environment.
pub fn bootstrap<'a>(
    registrants: impl IntoIterator<Item = &'a dyn Registrant>,
) -> RegistryResult<Arc<Router>> {
    bootstrap_with(ModuleRegistry::global(), registrants, RouterConfig::from_env())
}

/// Same as [`bootstrap`], against an explicit registry and config.
pub fn bootstrap_with<'a>(
    registry: Arc<ModuleRegistry>,
    registrants: impl IntoIterator<Item = &'a dyn Registrant>,
    config: RouterConfig,
) -> RegistryResult<Arc<Router>> {
    if let Err(e) = registry.register_all(registrants) {
        tracing::error!("Failed to register modules: {}", e);
        return Err(e);
    }
    registry.finish_registration();

    let modules = registry.identities().len();
    let router = Router::new(registry, config);
    tracing::info!(modules, ?router, "Router ready");
    Ok(Arc::new(router))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_api::{
        BoxError, CompletionSlot, ModuleContract, ModuleInstance, RegistryError,
    };
    use wayfinder_core::ModuleProvider;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Hello(String);

    impl Greeter for Hello {
        fn greet(&self) -> String {
            format!("hello {}", self.0)
        }
    }

    #[derive(Default)]
    struct GreeterModule {
        name: String,
        completion: CompletionSlot<dyn Greeter>,
    }

    impl ModuleInstance for GreeterModule {
        type Destination = dyn Greeter;

        fn completion_slot(&mut self) -> &mut CompletionSlot<dyn Greeter> {
            &mut self.completion
        }
    }

    struct GreeterInput;

    impl ModuleContract for GreeterInput {
        type Module = GreeterModule;
        type Destination = dyn Greeter;
    }

    struct GreeterRegistrant;

    impl Registrant for GreeterRegistrant {
        fn register(&self, registry: &ModuleRegistry) -> RegistryResult<()> {
            registry.register_provider(ModuleProvider::<GreeterInput>::with_default(
                |module: &GreeterModule| {
                    let greeter: Arc<dyn Greeter> = Arc::new(Hello(module.name.clone()));
                    Ok::<_, BoxError>(greeter)
                },
            ))?;
            registry.register_identifier::<GreeterInput>("app://greeter")
        }
    }

    #[test]
    fn test_bootstrap_with_registrants() {
        let registry = Arc::new(ModuleRegistry::new());
        let registrants: [&dyn Registrant; 1] = [&GreeterRegistrant];
        let router =
            bootstrap_with(Arc::clone(&registry), registrants, RouterConfig::immediate()).unwrap();

        assert!(registry.is_registration_finished());
        let greeter = router
            .to_identifier::<GreeterInput>("app://greeter")
            .unwrap()
            .make_destination_with_preparation(|module: &mut GreeterModule| {
                module.name = "world".to_string();
            })
            .unwrap();
        assert_eq!(greeter.greet(), "hello world");
    }

    #[test]
    fn test_bootstrap_rejects_late_registration() {
        let registry = Arc::new(ModuleRegistry::new());
        let empty = std::iter::empty();
        bootstrap_with(Arc::clone(&registry), empty, RouterConfig::immediate()).unwrap();

        let registrants: [&dyn Registrant; 1] = [&GreeterRegistrant];
        assert_eq!(
            registry.register_all(registrants),
            Err(RegistryError::RegistrationClosed)
        );
    }

    #[test]
    fn test_bootstrap_reports_duplicates() {
        let registry = Arc::new(ModuleRegistry::new());
        let registrants: [&dyn Registrant; 2] = [&GreeterRegistrant, &GreeterRegistrant];
        let result = bootstrap_with(Arc::clone(&registry), registrants, RouterConfig::immediate());

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateRegistration { .. })
        ));
        assert!(!registry.is_registration_finished());
        assert!(registry.lookup::<GreeterInput>().is_some());
    }
}
