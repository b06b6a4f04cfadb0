pub mod config;
pub mod error;
pub mod models;
pub mod module;

// Re-export commonly used types
pub use config::{CompletionHandler, ErrorHandler, PerformConfig, RouteOutcome, SuccessHandler};
pub use error::{BoxError, RegistryError, RegistryResult, RouteError, RouteResult};
pub use models::*;
pub use module::{CompletionSlot, ModuleCompletion, ModuleContract, ModuleInstance};
