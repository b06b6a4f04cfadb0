use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use wayfinder_api::{Action, PipelineStage, RouteError, RouteResult};

/// Resolves with the terminal result of one routing call, i.e. what the
/// completion handler receives.
pub struct RouteCompletion<D: ?Sized> {
    module: &'static str,
    receiver: oneshot::Receiver<(Action, RouteResult<Arc<D>>)>,
}

impl<D: ?Sized> RouteCompletion<D> {
    pub(crate) fn channel(
        module: &'static str,
    ) -> (oneshot::Sender<(Action, RouteResult<Arc<D>>)>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { module, receiver })
    }
}

impl<D: ?Sized> Future for RouteCompletion<D> {
    type Output = (Action, RouteResult<Arc<D>>);

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let module = self.module;
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                (
                    Action::Provider,
                    Err(RouteError::ConstructionFailed {
                        module: module.to_string(),
                        stage: PipelineStage::Dispatching,
                        reason: "completion was dropped before delivery".to_string(),
                    }),
                )
            })
        })
    }
}
