use std::fmt;

use thiserror::Error;

use crate::EventHandler;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("invalid tag name `{0}`")]
    InvalidTag(String),
    #[error("unknown host node {0}")]
    UnknownNode(String),
    #[error("host node {0} is not an element")]
    NotAnElement(String),
    #[error("host node {0} has no parent")]
    Detached(String),
    #[error("appending {child} under {parent} would create a cycle")]
    Cycle { parent: String, child: String },
}

/// Mutable rendering target that the commit phase writes to.
///
/// Mirrors the subset of the browser document API the renderer needs.
/// Appending a node that already has a parent moves it.
pub trait HostTree {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError>;
    fn create_text_node(&mut self, value: &str) -> Result<Self::Node, HostError>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;
    fn add_event_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
    /// Put `new` where `old` currently sits and detach `old`.
    fn replace_child(&mut self, old: &Self::Node, new: &Self::Node) -> Result<(), HostError>;
    /// Detach `node` (and its subtree) from its parent.
    fn remove_child(&mut self, node: &Self::Node) -> Result<(), HostError>;
}
