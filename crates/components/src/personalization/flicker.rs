//! Flicker control
//!
//! Elements about to be personalized are hidden with a prehiding `STYLE` node
//! in the head; rendering removes it again.

use contracts::{ContractError, Dom, NodeHandle};

/// Attribute carrying the selector a prehiding style hides
pub const PREHIDING_ATTR: &str = "data-beacon-prehiding";

/// Hide `selector` until `show_elements` is called
///
/// Returns `None` when a prehiding style for `selector` already exists.
pub fn hide_elements<D: Dom>(dom: &D, selector: &str) -> Result<Option<NodeHandle>, ContractError> {
    if !prehiding_styles(dom, selector).is_empty() {
        return Ok(None);
    }

    let head = dom
        .query_selector_all("HEAD")
        .into_iter()
        .next()
        .ok_or_else(|| ContractError::dom("document has no head"))?;

    let style = dom.create_node("STYLE", &[(PREHIDING_ATTR, selector)])?;
    dom.set_inner_html(&style, &format!("{selector} {{ visibility: hidden }}"))?;
    dom.append_node(&head, style).map(Some)
}

/// Remove prehiding styles for `selector`, returning how many were removed
pub fn show_elements<D: Dom>(dom: &D, selector: &str) -> Result<usize, ContractError> {
    let mut removed = 0;
    for style in prehiding_styles(dom, selector) {
        if dom.remove_node(&style)? {
            removed += 1;
        }
    }
    Ok(removed)
}

fn prehiding_styles<D: Dom>(dom: &D, selector: &str) -> Vec<NodeHandle> {
    dom.query_selector_all("STYLE")
        .into_iter()
        .filter(|style| dom.get_attribute(style, PREHIDING_ATTR).as_deref() == Some(selector))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::MemoryDom;

    #[test]
    fn test_hide_then_show() {
        let dom = MemoryDom::with_body();
        let style = hide_elements(&dom, "#hero .title").unwrap().unwrap();
        assert_eq!(
            dom.inner_html(&style).as_deref(),
            Some("#hero .title { visibility: hidden }")
        );
        assert_eq!(dom.parent(&style), dom.head());

        assert_eq!(show_elements(&dom, "#hero .title").unwrap(), 1);
        assert!(!dom.is_attached(&style));
    }

    #[test]
    fn test_hide_is_idempotent() {
        let dom = MemoryDom::with_body();
        assert!(hide_elements(&dom, ".a").unwrap().is_some());
        assert!(hide_elements(&dom, ".a").unwrap().is_none());
        assert!(hide_elements(&dom, ".b").unwrap().is_some());

        assert_eq!(show_elements(&dom, ".a").unwrap(), 1);
        assert_eq!(dom.query_selector_all("STYLE").len(), 1);
    }

    #[test]
    fn test_show_without_hide() {
        let dom = MemoryDom::with_body();
        assert_eq!(show_elements(&dom, ".nothing").unwrap(), 0);
    }
}
