//! Command implementations.

mod run;
mod validate;

pub use run::run_script;
pub use validate::run_validate;
