//! Module contracts and the mutable module instance callers prepare.

use std::fmt;

/// Callback a module registers to observe its finished destination.
pub type ModuleCompletion<D> = Box<dyn FnOnce(&D)>;

/// A routable module contract.
///
/// Implemented by a marker type that names the module input shape callers
/// prepare (`Module`) and the capability the produced destination exposes
/// (`Destination`, usually a `dyn Trait`).
pub trait ModuleContract: 'static {
    type Module: ModuleInstance<Destination = Self::Destination>;
    type Destination: ?Sized + Send + Sync + 'static;
}

/// The configuration object a caller populates before the destination is made.
pub trait ModuleInstance: 'static {
    type Destination: ?Sized + Send + Sync + 'static;

    fn completion_slot(&mut self) -> &mut CompletionSlot<Self::Destination>;

    /// Register the callback invoked with the finished destination.
    /// Invoked at most once, after preparation and before any handler.
    fn make_destination_completion<F>(&mut self, completion: F)
    where
        F: FnOnce(&Self::Destination) + 'static,
        Self: Sized,
    {
        self.completion_slot().set(completion);
    }
}

/// Single-use storage for a module's completion callback.
pub struct CompletionSlot<D: ?Sized> {
    callback: Option<ModuleCompletion<D>>,
}

impl<D: ?Sized> CompletionSlot<D> {
    pub fn new() -> Self {
        Self { callback: None }
    }

    /// Store `completion`, replacing any earlier one. Returns true if one was replaced.
    pub fn set<F>(&mut self, completion: F) -> bool
    where
        F: FnOnce(&D) + 'static,
    {
        self.callback.replace(Box::new(completion)).is_some()
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    pub fn take(&mut self) -> Option<ModuleCompletion<D>> {
        self.callback.take()
    }
}

impl<D: ?Sized> Default for CompletionSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> fmt::Debug for CompletionSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
