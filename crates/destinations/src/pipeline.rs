//! DestinationPipeline - queues batches until the frame is ready, tears the
//! frame down once firing completes

use std::sync::Arc;

use contracts::{DestinationBatch, Dom, NodeHandle, BODY_TAG};
use futures::future::{BoxFuture, FutureExt, Shared};
use observability::Logger;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::deferred::{Deferred, DeferredPromise};
use crate::error::DestinationError;
use crate::executor::{FireContext, FireDestinations, FireDestinationsFactory, Outstanding};
use crate::frame::{FrameFuture, FrameProvisioner};

type ExecutorFuture<E> = Shared<BoxFuture<'static, Result<Arc<E>, DestinationError>>>;

/// Builder for a `DestinationPipeline`
pub struct PipelineBuilder<D, F> {
    dom: Arc<D>,
    factory: F,
    logger: Logger,
    completion: Option<Deferred>,
    host_selector: String,
}

impl<D, F> PipelineBuilder<D, F>
where
    D: Dom + Sync + 'static,
    F: FireDestinationsFactory,
{
    pub fn new(dom: Arc<D>, factory: F, logger: Logger) -> Self {
        Self {
            dom,
            factory,
            logger,
            completion: None,
            host_selector: BODY_TAG.to_string(),
        }
    }

    /// Use a caller-owned completion signal instead of a fresh one
    pub fn completion(mut self, completion: Deferred) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Override the host element selector
    pub fn host_selector(mut self, selector: impl Into<String>) -> Self {
        self.host_selector = selector.into();
        self
    }

    /// Start provisioning and spawn the worker tasks
    ///
    /// # Errors
    /// `NoRuntime` when called outside a Tokio runtime.
    #[instrument(name = "destination_pipeline_spawn", skip(self), fields(host = %self.host_selector))]
    pub fn spawn(self) -> Result<DestinationPipeline, DestinationError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DestinationError::NoRuntime)?;

        let completion = self.completion.unwrap_or_default();
        let outstanding = Outstanding::new();
        let frame = FrameProvisioner::new(Arc::clone(&self.dom))
            .host_selector(self.host_selector)
            .provision();
        let executor = derive_executor(
            frame.clone(),
            self.factory,
            self.logger.clone(),
            completion.clone(),
            outstanding.clone(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(fire_worker(executor, rx));
        runtime.spawn(teardown(self.dom, frame.clone(), completion.promise()));

        debug!("Destination pipeline started");

        Ok(DestinationPipeline {
            queue: tx,
            frame,
            completion,
            outstanding,
            logger: self.logger,
        })
    }
}

/// Handle to a running destination pipeline
pub struct DestinationPipeline {
    queue: mpsc::UnboundedSender<DestinationBatch>,
    frame: FrameFuture,
    completion: Deferred,
    outstanding: Outstanding,
    logger: Logger,
}

impl DestinationPipeline {
    /// Queue a batch; fire-and-forget
    ///
    /// Waits for provisioning transparently. Batches queued against a failed
    /// provisioning are dropped with the provisioning error logged.
    ///
    /// The batch counts as outstanding from here on, so completion cannot
    /// resolve while it is still queued.
    pub fn fire(&self, batch: DestinationBatch) {
        self.logger.log(
            "Queueing destinations.",
            &serde_json::json!({ "count": batch.len() }),
        );
        self.outstanding.enqueue();
        if let Err(e) = self.queue.send(batch) {
            self.outstanding.settle();
            warn!(destinations = e.0.len(), "Fire worker stopped, batch dropped");
        }
    }

    /// Batches queued or being fired
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Completes once the completion signal resolves
    pub fn firing_completed(&self) -> DeferredPromise {
        self.completion.promise()
    }

    /// The completion signal itself
    pub fn completion(&self) -> &Deferred {
        &self.completion
    }

    /// Shared provisioning future
    pub fn frame(&self) -> impl std::future::Future<Output = Result<NodeHandle, DestinationError>> {
        self.frame.clone()
    }
}

fn derive_executor<F>(
    frame: FrameFuture,
    factory: F,
    logger: Logger,
    completion: Deferred,
    outstanding: Outstanding,
) -> ExecutorFuture<F::Executor>
where
    F: FireDestinationsFactory,
{
    async move {
        let frame = frame.await?;
        let context = FireContext {
            frame,
            logger,
            completion,
            outstanding,
        };
        factory
            .create(context)
            .map(Arc::new)
            .map_err(|e| DestinationError::executor(e.to_string()))
    }
    .boxed()
    .shared()
}

/// Worker task: waits for the executor, then fires queued batches in order
#[instrument(name = "destination_fire_worker", skip_all)]
async fn fire_worker<E>(executor: ExecutorFuture<E>, mut rx: mpsc::UnboundedReceiver<DestinationBatch>)
where
    E: FireDestinations + Sync + 'static,
{
    let executor = match executor.await {
        Ok(executor) => executor,
        Err(e) => {
            observability::record_provisioning_failed();
            error!(error = %e, "Destination frame unavailable");
            while let Some(batch) = rx.recv().await {
                warn!(error = %e, destinations = batch.len(), "Destination batch not fired");
            }
            return;
        }
    };

    info!("Destination frame ready");

    while let Some(batch) = rx.recv().await {
        let executor = Arc::clone(&executor);
        // Batches are independent; a slow one must not hold up the next
        tokio::spawn(async move {
            executor.fire(batch).await;
        });
    }

    debug!("Destination queue closed");
}

/// Teardown task: removes the frame once the completion signal resolves
async fn teardown<D>(dom: Arc<D>, frame: FrameFuture, completion: DeferredPromise)
where
    D: Dom + Sync + 'static,
{
    completion.await;

    let frame = match frame.await {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "No frame to remove");
            return;
        }
    };

    match dom.remove_node(&frame) {
        Ok(true) => {
            observability::record_frame_removed();
            debug!(frame = %frame, "Destination frame removed");
        }
        Ok(false) => debug!(frame = %frame, "Destination frame already detached"),
        Err(e) => warn!(frame = %frame, error = %e, "Destination frame removal failed"),
    }
}
