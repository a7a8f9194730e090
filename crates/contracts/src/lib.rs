//! # Contracts
//!
//! Frozen interface contracts shared by every beacon crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Boundaries
//! - `Config` carries raw configure options plus the validators applied to them
//! - `CommandRegistry` / `ComponentInitializer` are produced by `configure`
//! - `Dom` is the document seam used by the destination pipeline and components

mod command;
mod config;
mod destination;
mod dom;
mod error;

pub use command::*;
pub use config::*;
pub use destination::*;
pub use dom::*;
pub use error::*;
