//! Handler dispatch.
//!
//! All handlers of one call are packed into a single job, so they never race
//! each other. In deferred mode the job is spawned on the current Tokio
//! runtime and held back until the returned `DispatchTicket` is dropped,
//! which the pipeline does only as it hands the destination to the caller.

use crate::config::DispatchMode;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Dispatcher {
    mode: DispatchMode,
}

/// Releases a deferred job when dropped.
pub(crate) struct DispatchTicket {
    _release: Option<oneshot::Sender<()>>,
}

impl Dispatcher {
    pub(crate) fn new(mode: DispatchMode) -> Self {
        Self { mode }
    }

    pub(crate) fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub(crate) fn dispatch<F>(&self, job: F) -> DispatchTicket
    where
        F: FnOnce() + Send + 'static,
    {
        match self.mode {
            DispatchMode::Immediate => {
                job();
                DispatchTicket { _release: None }
            }
            DispatchMode::Deferred => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let (release, gate) = oneshot::channel::<()>();
                    handle.spawn(async move {
                        // Resolves with an error once the ticket is dropped.
                        let _ = gate.await;
                        job();
                    });
                    DispatchTicket {
                        _release: Some(release),
                    }
                }
                Err(_) => {
                    tracing::debug!("No Tokio runtime available, dispatching handlers inline");
                    job();
                    DispatchTicket { _release: None }
                }
            },
        }
    }
}
