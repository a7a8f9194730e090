//! MemoryDom - in-memory document tree
//!
//! A root `HTML` node with a `HEAD` child. `BODY` is absent until
//! `attach_body` is called (or the document is built `with_body`), which lets
//! callers exercise code that waits for the host element.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, Dom, NodeHandle, BODY_TAG};
use tokio::sync::Notify;
use tracing::{debug, instrument};

use crate::selector::Selector;

const ROOT_ID: u64 = 0;

#[derive(Debug)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<u64>,
    children: Vec<u64>,
    inner_html: String,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            attrs: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            inner_html: String::new(),
        }
    }
}

#[derive(Debug)]
struct Document {
    nodes: HashMap<u64, NodeData>,
    next_id: u64,
    created: HashMap<String, u64>,
    removed: u64,
}

impl Document {
    fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: ROOT_ID + 1,
            created: HashMap::new(),
            removed: 0,
        };
        doc.nodes.insert(ROOT_ID, NodeData::new("HTML"));
        let head = doc.insert("HEAD", &[]);
        doc.link(ROOT_ID, head.id());
        doc
    }

    fn insert(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeHandle {
        let id = self.next_id;
        self.next_id += 1;

        let mut node = NodeData::new(tag);
        for (name, value) in attrs {
            node.attrs.insert(name.to_string(), value.to_string());
        }
        let handle = NodeHandle::new(id, &node.tag);
        *self.created.entry(node.tag.clone()).or_default() += 1;
        self.nodes.insert(id, node);
        handle
    }

    fn node(&self, id: u64) -> Result<&NodeData, ContractError> {
        self.nodes
            .get(&id)
            .ok_or(ContractError::NodeNotFound { node_id: id })
    }

    fn link(&mut self, parent: u64, child: u64) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, child: u64) -> bool {
        let parent = match self.nodes.get_mut(&child).and_then(|n| n.parent.take()) {
            Some(parent) => parent,
            None => return false,
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
        true
    }

    fn is_ancestor(&self, ancestor: u64, mut node: u64) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn is_attached(&self, id: u64) -> bool {
        self.is_ancestor(ROOT_ID, id)
    }

    fn query(&self, selector: &Selector) -> Vec<NodeHandle> {
        let mut found = Vec::new();
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if selector.matches(&node.tag, &node.attrs) {
                found.push(NodeHandle::new(id, &node.tag));
            }
            stack.extend(node.children.iter().rev());
        }
        found
    }
}

/// In-memory document
#[derive(Debug)]
pub struct MemoryDom {
    doc: Mutex<Document>,
    changed: Notify,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Document without a body
    pub fn new() -> Self {
        Self {
            doc: Mutex::new(Document::new()),
            changed: Notify::new(),
        }
    }

    /// Document with a body already attached
    pub fn with_body() -> Self {
        let dom = Self::new();
        dom.attach_body();
        dom
    }

    /// Attach a `BODY` element under the root, waking selector waiters
    pub fn attach_body(&self) -> NodeHandle {
        let handle = {
            let mut doc = self.doc();
            let handle = doc.insert(BODY_TAG, &[]);
            doc.link(ROOT_ID, handle.id());
            handle
        };
        debug!(node = %handle, "Body attached");
        self.changed.notify_waiters();
        handle
    }

    pub fn body(&self) -> Option<NodeHandle> {
        self.query_selector_all(BODY_TAG).into_iter().next()
    }

    pub fn head(&self) -> Option<NodeHandle> {
        self.query_selector_all("HEAD").into_iter().next()
    }

    /// Number of nodes ever created with `tag`
    pub fn created_count(&self, tag: &str) -> u64 {
        self.doc()
            .created
            .get(&tag.to_ascii_uppercase())
            .copied()
            .unwrap_or(0)
    }

    /// Number of successful removals
    pub fn removed_count(&self) -> u64 {
        self.doc().removed
    }

    pub fn is_attached(&self, node: &NodeHandle) -> bool {
        self.doc().is_attached(node.id())
    }

    pub fn parent(&self, node: &NodeHandle) -> Option<NodeHandle> {
        let doc = self.doc();
        let parent = doc.nodes.get(&node.id())?.parent?;
        let data = doc.nodes.get(&parent)?;
        Some(NodeHandle::new(parent, &data.tag))
    }

    pub fn children(&self, node: &NodeHandle) -> Vec<NodeHandle> {
        let doc = self.doc();
        doc.nodes
            .get(&node.id())
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|c| doc.nodes.get(c).map(|d| NodeHandle::new(*c, &d.tag)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn inner_html(&self, node: &NodeHandle) -> Option<String> {
        self.doc()
            .nodes
            .get(&node.id())
            .map(|n| n.inner_html.clone())
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Dom for MemoryDom {
    #[instrument(name = "memory_dom_await_selector", skip(self))]
    async fn await_selector(&self, selector: &str) -> Result<Vec<NodeHandle>, ContractError> {
        let selector = Selector::parse(selector)?;
        loop {
            // Register interest before checking so a concurrent append is not missed
            let notified = self.changed.notified();
            let found = self.doc().query(&selector);
            if !found.is_empty() {
                return Ok(found);
            }
            notified.await;
        }
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeHandle> {
        match Selector::parse(selector) {
            Ok(selector) => self.doc().query(&selector),
            Err(_) => Vec::new(),
        }
    }

    fn create_node(&self, tag: &str, attrs: &[(&str, &str)]) -> Result<NodeHandle, ContractError> {
        if tag.is_empty() {
            return Err(ContractError::dom("tag name cannot be empty"));
        }
        Ok(self.doc().insert(tag, attrs))
    }

    fn append_node(
        &self,
        parent: &NodeHandle,
        child: NodeHandle,
    ) -> Result<NodeHandle, ContractError> {
        {
            let mut doc = self.doc();
            doc.node(parent.id())?;
            doc.node(child.id())?;
            if doc.is_ancestor(child.id(), parent.id()) {
                return Err(ContractError::dom(format!(
                    "cannot append {child} inside itself"
                )));
            }
            doc.unlink(child.id());
            doc.link(parent.id(), child.id());
        }
        self.changed.notify_waiters();
        Ok(child)
    }

    fn remove_node(&self, node: &NodeHandle) -> Result<bool, ContractError> {
        if node.id() == ROOT_ID {
            return Err(ContractError::dom("cannot remove the document root"));
        }
        let mut doc = self.doc();
        doc.node(node.id())?;
        let removed = doc.unlink(node.id());
        if removed {
            doc.removed += 1;
        }
        Ok(removed)
    }

    fn get_attribute(&self, node: &NodeHandle, name: &str) -> Option<String> {
        self.doc()
            .nodes
            .get(&node.id())
            .and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_inner_html(&self, node: &NodeHandle, html: &str) -> Result<(), ContractError> {
        let mut doc = self.doc();
        let data = doc
            .nodes
            .get_mut(&node.id())
            .ok_or(ContractError::NodeNotFound { node_id: node.id() })?;
        data.inner_html = html.to_string();
        Ok(())
    }
}
