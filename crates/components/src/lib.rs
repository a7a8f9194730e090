//! # Components
//!
//! Default command set produced by `configure`.
//!
//! - `ComponentRegistry`: name → command lookup
//! - `DefaultInitializer`: wires the destination pipeline and registers
//!   `event`, `applyPersonalization` and `destinationsFired`
//! - `personalization`: content-injection action and flicker control

mod initializer;
pub mod personalization;
mod registry;

pub use initializer::{DefaultInitializer, COMMAND_APPLY_PERSONALIZATION, COMMAND_DESTINATIONS_FIRED, COMMAND_EVENT};
pub use registry::ComponentRegistry;
