//! FrameProvisioner - waits for the host element and appends the hidden frame

use std::sync::Arc;

use contracts::{ContractError, Dom, NodeHandle, BODY_TAG};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, instrument};

use crate::error::DestinationError;

pub const IFRAME_TAG: &str = "IFRAME";

pub const IFRAME_ATTRS: [(&str, &str); 3] = [
    ("name", "Beacon Destinations iFrame"),
    ("class", "beacon-iframe"),
    ("style", "display: none; width: 0; height: 0;"),
];

/// Memoized provisioning result shared by every waiter
pub type FrameFuture = Shared<BoxFuture<'static, Result<NodeHandle, DestinationError>>>;

/// Creates the hidden frame once the host element exists
pub struct FrameProvisioner<D> {
    dom: Arc<D>,
    host_selector: String,
}

impl<D> FrameProvisioner<D>
where
    D: Dom + Sync + 'static,
{
    /// Provisioner targeting the document body
    pub fn new(dom: Arc<D>) -> Self {
        Self {
            dom,
            host_selector: BODY_TAG.to_string(),
        }
    }

    /// Override the host selector
    pub fn host_selector(mut self, selector: impl Into<String>) -> Self {
        self.host_selector = selector.into();
        self
    }

    /// Build the shared provisioning future
    ///
    /// Nothing happens until the future is first polled; every clone observes
    /// the same frame (or the same failure).
    pub fn provision(self) -> FrameFuture {
        let Self { dom, host_selector } = self;
        async move {
            let hosts = dom
                .await_selector(&host_selector)
                .await
                .map_err(|e| DestinationError::provisioning(e.to_string()))?;
            let host = hosts.first().ok_or_else(|| {
                DestinationError::provisioning(format!("no element matched '{host_selector}'"))
            })?;
            create_frame(dom.as_ref(), host).map_err(|e| DestinationError::provisioning(e.to_string()))
        }
        .boxed()
        .shared()
    }
}

#[instrument(name = "frame_create", skip(dom, host), fields(host = %host))]
fn create_frame<D: Dom>(dom: &D, host: &NodeHandle) -> Result<NodeHandle, ContractError> {
    let frame = dom.create_node(IFRAME_TAG, &IFRAME_ATTRS)?;
    let frame = dom.append_node(host, frame)?;
    observability::record_frame_created();
    debug!(frame = %frame, "Hidden frame appended");
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::MemoryDom;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_frame_created_under_body() {
        let dom = Arc::new(MemoryDom::with_body());
        let frame = FrameProvisioner::new(Arc::clone(&dom))
            .provision()
            .await
            .unwrap();

        assert_eq!(frame.tag(), IFRAME_TAG);
        assert_eq!(dom.parent(&frame), dom.body());
        assert_eq!(dom.get_attribute(&frame, "class").as_deref(), Some("beacon-iframe"));
        assert_eq!(
            dom.get_attribute(&frame, "style").as_deref(),
            Some("display: none; width: 0; height: 0;")
        );
    }

    #[tokio::test]
    async fn test_shared_future_creates_one_frame() {
        let dom = Arc::new(MemoryDom::new());
        let frame = FrameProvisioner::new(Arc::clone(&dom)).provision();

        let waiters: Vec<_> = (0..3).map(|_| tokio::spawn(frame.clone())).collect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(dom.created_count(IFRAME_TAG), 0);

        dom.attach_body();
        let mut frames = Vec::new();
        for waiter in waiters {
            frames.push(waiter.await.unwrap().unwrap());
        }

        assert_eq!(dom.created_count(IFRAME_TAG), 1);
        assert!(frames.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_missing_host_never_resolves() {
        let dom = Arc::new(MemoryDom::new());
        let frame = FrameProvisioner::new(dom).provision();
        assert!(timeout(Duration::from_millis(30), frame).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_host_selector_rejects() {
        let dom = Arc::new(MemoryDom::with_body());
        let err = FrameProvisioner::new(dom)
            .host_selector("div > p")
            .provision()
            .await
            .unwrap_err();
        assert!(matches!(err, DestinationError::Provisioning { .. }));
    }
}
