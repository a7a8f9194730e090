//! # Destinations
//!
//! Deferred delivery of destination batches through a hidden frame.
//!
//! Responsibilities:
//! - Lazily provisioned hidden frame (at most one per pipeline)
//! - `fire` requests queued and delivered once the frame is ready
//! - Frame removed exactly once after the completion signal

pub mod deferred;
pub mod error;
pub mod executor;
pub mod frame;
pub mod pipeline;

pub use deferred::{Deferred, DeferredPromise};
pub use error::DestinationError;
pub use executor::{
    Destination, FireContext, FireDestinations, FireDestinationsFactory, FrameFireExecutor,
    FrameFireExecutorFactory, Outstanding,
};
pub use frame::{FrameFuture, FrameProvisioner, IFRAME_ATTRS, IFRAME_TAG};
pub use pipeline::{DestinationPipeline, PipelineBuilder};
