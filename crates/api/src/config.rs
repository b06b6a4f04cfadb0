//! Per-call handler configuration.
//!
//! A `PerformConfig` collects the optional callbacks a caller wants for one
//! routing call. Handlers are `FnOnce`, so each one can run at most once;
//! `deliver` enforces the rest of the firing rules:
//! - exactly one of `success_handler` / `error_handler` for the provider path
//! - at most one of the performer pair, only if the performer path ran
//! - `completion_handler` last, exactly once

use crate::error::{RouteError, RouteResult};
use crate::models::Action;
use std::fmt;
use std::sync::Arc;

pub type SuccessHandler<D> = Box<dyn FnOnce(Arc<D>) + Send>;
pub type ErrorHandler = Box<dyn FnOnce(Action, RouteError) + Send>;
pub type CompletionHandler<D> = Box<dyn FnOnce(Action, RouteResult<Arc<D>>) + Send>;

pub struct PerformConfig<D: ?Sized> {
    pub success_handler: Option<SuccessHandler<D>>,
    pub performer_success_handler: Option<SuccessHandler<D>>,
    pub error_handler: Option<ErrorHandler>,
    pub performer_error_handler: Option<ErrorHandler>,
    pub completion_handler: Option<CompletionHandler<D>>,
}

impl<D: ?Sized + 'static> PerformConfig<D> {
    pub fn new() -> Self {
        Self {
            success_handler: None,
            performer_success_handler: None,
            error_handler: None,
            performer_error_handler: None,
            completion_handler: None,
        }
    }

    pub fn on_success<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Arc<D>) + Send + 'static,
    {
        self.success_handler = Some(Box::new(handler));
        self
    }

    pub fn on_performer_success<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Arc<D>) + Send + 'static,
    {
        self.performer_success_handler = Some(Box::new(handler));
        self
    }

    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Action, RouteError) + Send + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    pub fn on_performer_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Action, RouteError) + Send + 'static,
    {
        self.performer_error_handler = Some(Box::new(handler));
        self
    }

    pub fn on_completion<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Action, RouteResult<Arc<D>>) + Send + 'static,
    {
        self.completion_handler = Some(Box::new(handler));
        self
    }

    /// Wrap the completion handler so `observer` sees the terminal result after it.
    pub fn chain_completion<F>(&mut self, observer: F)
    where
        F: FnOnce(Action, RouteResult<Arc<D>>) + Send + 'static,
    {
        let previous = self.completion_handler.take();
        self.completion_handler = Some(Box::new(move |action, result: RouteResult<Arc<D>>| {
            if let Some(previous) = previous {
                previous(action, result.clone());
            }
            observer(action, result);
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.success_handler.is_none()
            && self.performer_success_handler.is_none()
            && self.error_handler.is_none()
            && self.performer_error_handler.is_none()
            && self.completion_handler.is_none()
    }

    /// Fire the handlers for `outcome` in order: provider, performer, completion.
    pub fn deliver(self, outcome: RouteOutcome<D>) {
        let RouteOutcome {
            provider,
            performer,
        } = outcome;

        match &provider {
            Ok(destination) => {
                if let Some(handler) = self.success_handler {
                    handler(Arc::clone(destination));
                }
            }
            Err(error) => {
                if let Some(handler) = self.error_handler {
                    handler(Action::Provider, error.clone());
                }
            }
        }

        // The performer outcome is always the last to complete, so it wins the
        // completion report when present.
        let (action, terminal) = match performer {
            Some(result) => {
                match &result {
                    Ok(destination) => {
                        if let Some(handler) = self.performer_success_handler {
                            handler(Arc::clone(destination));
                        }
                    }
                    Err(error) => {
                        if let Some(handler) = self.performer_error_handler {
                            handler(Action::Performer, error.clone());
                        }
                    }
                }
                (Action::Performer, result)
            }
            None => (Action::Provider, provider),
        };

        if let Some(handler) = self.completion_handler {
            handler(action, terminal);
        }
    }
}

impl<D: ?Sized + 'static> Default for PerformConfig<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> fmt::Debug for PerformConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformConfig")
            .field("success_handler", &self.success_handler.is_some())
            .field(
                "performer_success_handler",
                &self.performer_success_handler.is_some(),
            )
            .field("error_handler", &self.error_handler.is_some())
            .field(
                "performer_error_handler",
                &self.performer_error_handler.is_some(),
            )
            .field("completion_handler", &self.completion_handler.is_some())
            .finish()
    }
}

/// Result of both construction paths for one call.
pub struct RouteOutcome<D: ?Sized> {
    pub provider: RouteResult<Arc<D>>,
    /// `None` when the performer path was never entered.
    pub performer: Option<RouteResult<Arc<D>>>,
}

impl<D: ?Sized> RouteOutcome<D> {
    pub fn success(destination: Arc<D>, performer: bool) -> Self {
        Self {
            performer: performer.then(|| Ok(Arc::clone(&destination))),
            provider: Ok(destination),
        }
    }

    pub fn failure(error: RouteError, performer: bool) -> Self {
        Self {
            performer: performer.then(|| Err(error.clone())),
            provider: Err(error),
        }
    }
}
