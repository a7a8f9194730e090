mod set_html;

pub use set_html::{set_html, ActionSettings, Collect, RenderEvent};
