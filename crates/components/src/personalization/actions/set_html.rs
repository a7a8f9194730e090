//! `setHtml` action - replaces an element's content

use std::sync::Arc;

use contracts::{ContractError, Dom, NodeHandle};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::personalization::show_elements;

/// Receives metadata reported by actions after rendering
pub type Collect = Arc<dyn Fn(Value) + Send + Sync>;

/// What to render
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSettings {
    pub content: String,
    #[serde(default)]
    pub meta: Value,
}

/// Where to render
#[derive(Debug, Clone)]
pub struct RenderEvent {
    pub element: NodeHandle,
    pub prehiding_selector: Option<String>,
}

/// Build the action bound to `dom` and `collect`
pub fn set_html<D>(
    dom: Arc<D>,
    collect: Collect,
) -> impl Fn(&ActionSettings, &RenderEvent) -> Result<(), ContractError>
where
    D: Dom + Sync + 'static,
{
    move |settings, event| {
        // Naive replacement; no sanitizing or diffing
        dom.set_inner_html(&event.element, &settings.content)?;

        if let Some(selector) = &event.prehiding_selector {
            show_elements(dom.as_ref(), selector)?;
        }

        collect(json!({ "meta": { "personalization": settings.meta } }));
        Ok(())
    }
}
