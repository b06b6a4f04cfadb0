pub mod adapter;
pub mod completion;
pub mod config;
pub mod pipeline;
pub mod provider;
pub mod registry;
pub mod router;

mod dispatch;
mod route;

pub use adapter::ModuleAdapter;
pub use completion::RouteCompletion;
pub use config::{DISPATCH_ENV, DispatchMode, RouterConfig};
pub use pipeline::{GlobalErrorHandler, ModulePreparer};
pub use provider::{Built, ModuleProvider};
pub use registry::{ModuleRegistry, Registrant};
pub use router::{RouteHandle, Router};

pub use wayfinder_api as api;
