//! Dom trait - document seam
//!
//! Thin wrappers over node creation, insertion and removal plus selector
//! waiting. The only behavioural contract the runtime relies on is that
//! `await_selector` resolves once a matching attached node exists, and may
//! never resolve otherwise.

use std::fmt;

use crate::ContractError;

/// Tag of the document body
pub const BODY_TAG: &str = "BODY";

/// Handle to a document node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    id: u64,
    tag: String,
}

impl NodeHandle {
    pub fn new(id: u64, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into().to_ascii_uppercase(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Upper-cased tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag, self.id)
    }
}

/// Document operations
#[trait_variant::make(Dom: Send)]
pub trait LocalDom {
    /// Wait until at least one attached node matches `selector`
    async fn await_selector(&self, selector: &str) -> Result<Vec<NodeHandle>, ContractError>;

    /// Attached nodes matching `selector`, in document order
    fn query_selector_all(&self, selector: &str) -> Vec<NodeHandle>;

    /// Create a detached node
    fn create_node(&self, tag: &str, attrs: &[(&str, &str)]) -> Result<NodeHandle, ContractError>;

    /// Append `child` to `parent`, returning the child
    fn append_node(&self, parent: &NodeHandle, child: NodeHandle)
        -> Result<NodeHandle, ContractError>;

    /// Detach `node` from its parent
    ///
    /// Returns `false` when the node was already detached.
    fn remove_node(&self, node: &NodeHandle) -> Result<bool, ContractError>;

    fn get_attribute(&self, node: &NodeHandle, name: &str) -> Option<String>;

    fn set_inner_html(&self, node: &NodeHandle, html: &str) -> Result<(), ContractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_tag_is_uppercased() {
        let handle = NodeHandle::new(7, "iframe");
        assert_eq!(handle.tag(), "IFRAME");
        assert_eq!(handle.to_string(), "<IFRAME#7>");
    }
}
