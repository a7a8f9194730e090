//! # Dom
//!
//! In-memory document implementing `contracts::Dom`.
//!
//! Used by the harness and by tests to drive the destination pipeline and
//! content-injection commands without a browser.

mod memory;
mod selector;

pub use memory::MemoryDom;
pub use selector::Selector;
