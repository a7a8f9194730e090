//! Fire executors - deliver destination batches inside the hidden frame

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{ContractError, DestinationBatch, Dom, NodeHandle};
use observability::Logger;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::deferred::Deferred;

/// Delivers destination batches
#[trait_variant::make(FireDestinations: Send)]
pub trait LocalFireDestinations {
    /// Fire every destination in `batch`
    async fn fire(&self, batch: DestinationBatch);
}

/// Batches queued on a pipeline but not yet fired
///
/// The pipeline counts a batch when it is enqueued; the executor settles it
/// after firing. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct Outstanding(Arc<AtomicUsize>);

impl Outstanding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more queued batch
    pub fn enqueue(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Settle one batch; `true` when nothing remains outstanding
    ///
    /// Saturates at zero so executors driven without a pipeline still settle.
    pub fn settle(&self) -> bool {
        let previous = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_default();
        previous <= 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything an executor needs from the pipeline
#[derive(Debug, Clone)]
pub struct FireContext {
    /// Provisioned hidden frame
    pub frame: NodeHandle,
    pub logger: Logger,
    /// Resolved by the executor once no batch is outstanding
    pub completion: Deferred,
    /// Shared with the pipeline's queue
    pub outstanding: Outstanding,
}

/// Derives a frame-scoped executor once the frame exists
pub trait FireDestinationsFactory: Send + Sync + 'static {
    type Executor: FireDestinations + Sync + 'static;

    fn create(&self, context: FireContext) -> Result<Self::Executor, ContractError>;
}

/// Recognized destination descriptors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Destination {
    /// Pixel-style request to `url`
    Url {
        url: String,
        #[serde(default, rename = "hideReferrer")]
        hide_referrer: bool,
    },
}

impl Destination {
    /// Interpret a descriptor; `None` for anything unrecognized
    pub fn parse(descriptor: &Value) -> Option<Self> {
        Destination::deserialize(descriptor).ok()
    }
}

/// Executor that appends one hidden beacon per URL destination to the frame
pub struct FrameFireExecutor<D> {
    dom: Arc<D>,
    context: FireContext,
}

impl<D> FrameFireExecutor<D>
where
    D: Dom + Sync + 'static,
{
    pub fn new(dom: Arc<D>, context: FireContext) -> Self {
        Self { dom, context }
    }

    /// Batches queued or being fired
    pub fn outstanding(&self) -> usize {
        self.context.outstanding.get()
    }

    fn fire_url(&self, url: &str, hide_referrer: bool) -> Result<NodeHandle, ContractError> {
        let mut attrs = vec![("src", url), ("width", "0"), ("height", "0")];
        if hide_referrer {
            attrs.push(("referrerpolicy", "no-referrer"));
        }
        let beacon = self.dom.create_node("IMG", &attrs)?;
        self.dom.append_node(&self.context.frame, beacon)
    }
}

impl<D> FireDestinations for FrameFireExecutor<D>
where
    D: Dom + Sync + 'static,
{
    #[instrument(
        name = "frame_fire_executor_fire",
        skip(self, batch),
        fields(frame = %self.context.frame, destinations = batch.len())
    )]
    async fn fire(&self, batch: DestinationBatch) {
        let mut fired = 0;
        for descriptor in &batch {
            match Destination::parse(descriptor) {
                Some(Destination::Url { url, hide_referrer }) => {
                    match self.fire_url(&url, hide_referrer) {
                        Ok(_) => fired += 1,
                        Err(e) => warn!(url = %url, error = %e, "Destination fire failed"),
                    }
                }
                None => {
                    observability::record_destination_skipped();
                    self.context
                        .logger
                        .warn("Skipping unrecognized destination.", descriptor);
                }
            }
        }

        observability::record_destinations_fired(fired);
        self.context
            .logger
            .log("Destinations fired.", &json!({ "count": fired }));

        if self.context.outstanding.settle() && self.context.completion.resolve() {
            debug!("All outstanding destinations fired");
        }
    }
}

/// Factory for `FrameFireExecutor`
pub struct FrameFireExecutorFactory<D> {
    dom: Arc<D>,
}

impl<D> FrameFireExecutorFactory<D> {
    pub fn new(dom: Arc<D>) -> Self {
        Self { dom }
    }
}

impl<D> FireDestinationsFactory for FrameFireExecutorFactory<D>
where
    D: Dom + Sync + 'static,
{
    type Executor = FrameFireExecutor<D>;

    fn create(&self, context: FireContext) -> Result<Self::Executor, ContractError> {
        Ok(FrameFireExecutor::new(Arc::clone(&self.dom), context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::MemoryDom;
    use observability::LogController;
    use serde_json::json;

    fn executor(dom: &Arc<MemoryDom>) -> (FrameFireExecutor<MemoryDom>, Deferred, NodeHandle) {
        let body = dom.body().unwrap();
        let frame = dom.create_node("IFRAME", &[]).unwrap();
        let frame = dom.append_node(&body, frame).unwrap();
        let completion = Deferred::new();
        let context = FireContext {
            frame: frame.clone(),
            logger: Logger::new("beacon", LogController::new()),
            completion: completion.clone(),
            outstanding: Outstanding::new(),
        };
        (
            FrameFireExecutor::new(Arc::clone(dom), context),
            completion,
            frame,
        )
    }

    #[test]
    fn test_parse_url_destination() {
        let parsed = Destination::parse(&json!({
            "type": "url",
            "url": "https://a.test/pixel",
            "hideReferrer": true
        }));
        assert_eq!(
            parsed,
            Some(Destination::Url {
                url: "https://a.test/pixel".into(),
                hide_referrer: true
            })
        );
        assert_eq!(Destination::parse(&json!({ "type": "cookie" })), None);
        assert_eq!(Destination::parse(&json!("https://a.test")), None);
    }

    #[tokio::test]
    async fn test_fire_appends_beacons_into_frame() {
        let dom = Arc::new(MemoryDom::with_body());
        let (executor, completion, frame) = executor(&dom);

        FireDestinations::fire(
            &executor,
            DestinationBatch::new(vec![
                json!({ "type": "url", "url": "https://a.test/1" }),
                json!({ "type": "url", "url": "https://a.test/2", "hideReferrer": true }),
                json!({ "type": "unknown" }),
            ]),
        )
        .await;

        let beacons = dom.children(&frame);
        assert_eq!(beacons.len(), 2);
        assert_eq!(
            dom.get_attribute(&beacons[0], "src").as_deref(),
            Some("https://a.test/1")
        );
        assert_eq!(dom.get_attribute(&beacons[0], "referrerpolicy"), None);
        assert_eq!(
            dom.get_attribute(&beacons[1], "referrerpolicy").as_deref(),
            Some("no-referrer")
        );
        assert!(completion.is_resolved());
        assert_eq!(executor.outstanding(), 0);
    }

    #[test]
    fn test_outstanding_settles_to_zero() {
        let outstanding = Outstanding::new();
        outstanding.enqueue();
        outstanding.enqueue();
        assert_eq!(outstanding.get(), 2);
        assert!(!outstanding.settle());
        assert!(outstanding.clone().settle());
        assert!(outstanding.settle());
        assert_eq!(outstanding.get(), 0);
    }

    #[tokio::test]
    async fn test_completion_waits_for_queued_batches() {
        let dom = Arc::new(MemoryDom::with_body());
        let (executor, completion, _) = executor(&dom);
        executor.context.outstanding.enqueue();
        executor.context.outstanding.enqueue();

        FireDestinations::fire(&executor, DestinationBatch::default()).await;
        assert!(!completion.is_resolved());
        assert_eq!(executor.outstanding(), 1);

        FireDestinations::fire(&executor, DestinationBatch::default()).await;
        assert!(completion.is_resolved());
    }

    #[tokio::test]
    async fn test_empty_batch_still_completes() {
        let dom = Arc::new(MemoryDom::with_body());
        let (executor, completion, _) = executor(&dom);
        FireDestinations::fire(&executor, DestinationBatch::default()).await;
        assert!(completion.is_resolved());
    }
}
