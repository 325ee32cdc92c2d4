//! In-memory host tree.
//!
//! `MemoryDocument` behaves like a tiny browser document: nodes are created
//! detached, attached with `append_child`, moved when appended elsewhere.
//! Every mutation is recorded so callers can see exactly what a commit did.

use std::collections::BTreeMap;
use std::fmt;

use slab::Slab;

use crate::host::{HostError, HostTree};
use crate::EventHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId, value: String },
    SetAttribute { node: NodeId, name: String, value: String },
    AddListener { node: NodeId, event: String },
    Append { parent: NodeId, child: NodeId },
    Replace { old: NodeId, new: NodeId },
    Remove { node: NodeId },
}

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        listeners: Vec<(String, EventHandler)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Slab<NodeData>,
    body: NodeId,
    log: Vec<HostOp>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl MemoryDocument {
    /// New document holding a single detached `body` element. Creating the
    /// body is not logged.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let body = NodeId(nodes.insert(NodeData {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                attrs: BTreeMap::new(),
                listeners: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        }));
        Self {
            nodes,
            body,
            log: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn log(&self) -> &[HostOp] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.log)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Element { listeners, .. }) => {
                listeners.iter().filter(|(e, _)| e == event).count()
            }
            _ => 0,
        }
    }

    /// Handlers registered for `event` on `node`, in registration order.
    pub fn listeners(&self, node: NodeId, event: &str) -> Result<Vec<EventHandler>, HostError> {
        let NodeKind::Element { listeners, .. } = &self.get(node)?.kind else {
            return Ok(Vec::new());
        };
        Ok(listeners
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, h)| h.clone())
            .collect())
    }

    /// Serialize `node` and its subtree. Attributes are sorted by name.
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Markup of the children of `node`, concatenated.
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &c in self.children(node) {
            self.write_markup(c, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(t) => out.push_str(&escape(t)),
            NodeKind::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push_str(&format!(" {k}=\"{}\"", escape(v)));
                }
                out.push('>');
                for &c in &data.children {
                    self.write_markup(c, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    fn get(&self, node: NodeId) -> Result<&NodeData, HostError> {
        self.nodes
            .get(node.0)
            .ok_or_else(|| HostError::UnknownNode(node.to_string()))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut NodeData, HostError> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| HostError::UnknownNode(node.to_string()))
    }

    fn detach(&mut self, node: NodeId) -> Result<(), HostError> {
        let Some(parent) = self.get_mut(node)?.parent.take() else {
            return Ok(());
        };
        self.get_mut(parent)?.children.retain(|&c| c != node);
        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cur = Some(of);
        while let Some(n) = cur {
            if n == candidate {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        NodeId(self.nodes.insert(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }))
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl HostTree for MemoryDocument {
    type Node = NodeId;

    fn create_node(&mut self, tag: &str) -> Result<NodeId, HostError> {
        if !valid_tag(tag) {
            return Err(HostError::InvalidTag(tag.to_string()));
        }
        let node = self.insert(NodeKind::Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            listeners: Vec::new(),
        });
        self.log.push(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text_node(&mut self, value: &str) -> Result<NodeId, HostError> {
        let node = self.insert(NodeKind::Text(value.to_string()));
        self.log.push(HostOp::CreateText {
            node,
            value: value.to_string(),
        });
        Ok(node)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), HostError> {
        let data = self.get_mut(*node)?;
        let NodeKind::Element { attrs, .. } = &mut data.kind else {
            return Err(HostError::NotAnElement(node.to_string()));
        };
        attrs.insert(name.to_string(), value.to_string());
        self.log.push(HostOp::SetAttribute {
            node: *node,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        let data = self.get_mut(*node)?;
        let NodeKind::Element { listeners, .. } = &mut data.kind else {
            return Err(HostError::NotAnElement(node.to_string()));
        };
        listeners.push((event.to_string(), handler));
        self.log.push(HostOp::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        let (parent, child) = (*parent, *child);
        if !matches!(self.get(parent)?.kind, NodeKind::Element { .. }) {
            return Err(HostError::NotAnElement(parent.to_string()));
        }
        self.get(child)?;
        if self.is_ancestor(child, parent) {
            return Err(HostError::Cycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        self.detach(child)?;
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        self.log.push(HostOp::Append { parent, child });
        Ok(())
    }

    fn replace_child(&mut self, old: &NodeId, new: &NodeId) -> Result<(), HostError> {
        let (old, new) = (*old, *new);
        self.get(new)?;
        let parent = self
            .get(old)?
            .parent
            .ok_or_else(|| HostError::Detached(old.to_string()))?;
        if self.is_ancestor(new, parent) {
            return Err(HostError::Cycle {
                parent: parent.to_string(),
                child: new.to_string(),
            });
        }
        self.detach(new)?;
        let siblings = &mut self.get_mut(parent)?.children;
        let Some(idx) = siblings.iter().position(|&c| c == old) else {
            return Err(HostError::Detached(old.to_string()));
        };
        siblings[idx] = new;
        self.get_mut(old)?.parent = None;
        self.get_mut(new)?.parent = Some(parent);
        self.log.push(HostOp::Replace { old, new });
        Ok(())
    }

    fn remove_child(&mut self, node: &NodeId) -> Result<(), HostError> {
        let node = *node;
        // Like `ChildNode.remove()`, removing a detached node does nothing.
        if self.get(node)?.parent.is_none() {
            return Ok(());
        }
        self.detach(node)?;
        self.log.push(HostOp::Remove { node });
        Ok(())
    }
}
