//! Personalization: content injection with flicker control

pub mod actions;
mod flicker;

pub use flicker::{hide_elements, show_elements, PREHIDING_ATTR};
