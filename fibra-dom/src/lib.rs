//! Virtual node model for fibra.
//!
//! A [`VNode`] tree is an immutable description of a UI. Trees are cheap to
//! clone (every node is reference counted), so the renderer can hold on to
//! individual subtrees without copying them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub mod construct;
pub mod document;
pub mod host;

pub use construct::{construct, Child, Component, Tag};
pub use document::{HostOp, MemoryDocument, NodeId};
pub use host::{HostError, HostTree};

/// Tag of a fragment. Fragments group children without producing a host node.
pub const FRAGMENT: &str = "";

#[derive(Debug, Clone)]
pub enum VNode {
    Element(Rc<Element>),
    Text(Rc<str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Element,
    Fragment,
}

#[derive(Debug)]
pub struct Element {
    pub kind: ElementKind,
    pub tag: String,
    pub props: Props,
    pub children: Vec<VNode>,
    pub key: Option<Key>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}
impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}
impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}
impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

/// Event delivered to handlers by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
}

/// Shared event callback. Two handlers are never compared for identity.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

#[derive(Debug, Clone)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl PropValue {
    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }

    /// String form used when the value becomes a host attribute.
    /// Handlers have no attribute form.
    pub fn to_attr(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Int(n) => Some(n.to_string()),
            PropValue::Float(x) => Some(x.to_string()),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Handler(_) => None,
        }
    }

    /// Primitive equality: same variant and equal value. Handlers always
    /// match other handlers.
    fn primitive_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(_), PropValue::Handler(_)) => true,
            _ => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}
impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}
impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Int(n)
    }
}
impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Int(n.into())
    }
}
impl From<f64> for PropValue {
    fn from(x: f64) -> Self {
        PropValue::Float(x)
    }
}
impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}
impl From<EventHandler> for PropValue {
    fn from(h: EventHandler) -> Self {
        PropValue::Handler(h)
    }
}
impl From<Key> for PropValue {
    fn from(k: Key) -> Self {
        match k {
            Key::Str(s) => PropValue::Str(s),
            Key::Int(n) => PropValue::Int(n),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Props {
    values: HashMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set(mut self, k: impl Into<String>, v: impl Into<PropValue>) -> Self {
        self.values.insert(k.into(), v.into());
        self
    }

    /// Register `f` for `event`, stored under the `on<event>` prop.
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.set(format!("on{event}"), EventHandler::new(f))
    }

    pub fn key(self, k: impl Into<Key>) -> Self {
        self.set("key", k.into())
    }

    pub fn get(&self, k: &str) -> Option<&PropValue> {
        self.values.get(k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key carried by the `key` prop, if it holds a string or an integer.
    pub fn key_value(&self) -> Option<Key> {
        match self.values.get("key")? {
            PropValue::Str(s) => Some(Key::Str(s.clone())),
            PropValue::Int(n) => Some(Key::Int(*n)),
            _ => None,
        }
    }

    /// Same key set, and every non-`key` value either a handler on both
    /// sides or primitively equal.
    pub fn same_as(&self, other: &Props) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().all(|(k, v)| match other.values.get(k) {
            Some(_) if k == "key" => true,
            Some(w) => v.primitive_eq(w),
            None => false,
        })
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p = p.set(k, v);
        }
        p
    }
}

impl VNode {
    /// Structural equality of this node alone. Children are not compared;
    /// the reconciler discovers changes below by visiting them.
    pub fn equals(&self, other: &VNode) -> bool {
        match (self, other) {
            (VNode::Text(a), VNode::Text(b)) => a == b,
            (VNode::Element(a), VNode::Element(b)) => {
                a.tag == b.tag && a.key == b.key && a.props.same_as(&b.props)
            }
            _ => false,
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, VNode::Element(e) if e.kind == ElementKind::Fragment)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(e) => Some(e),
            VNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(t) => Some(t),
            VNode::Element(_) => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element(e) => &e.children,
            VNode::Text(_) => &[],
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.as_element().and_then(|e| e.key.as_ref())
    }

    /// Number of nodes in this subtree, fragments included.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(VNode::count).sum::<usize>()
    }
}

impl Element {
    pub(crate) fn new(tag: String, props: Props, children: Vec<VNode>) -> Self {
        let kind = if tag == FRAGMENT {
            ElementKind::Fragment
        } else {
            ElementKind::Element
        };
        let key = props.key_value();
        Self {
            kind,
            tag,
            props,
            children,
            key,
        }
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element(Rc::new(Element::new(tag.into(), props.into(), children)))
}

pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(Rc::from(t.into()))
}

pub fn fragment(children: Vec<VNode>) -> VNode {
    h(FRAGMENT, Props::new(), children)
}

impl From<&str> for VNode {
    fn from(t: &str) -> Self {
        text(t)
    }
}
impl From<String> for VNode {
    fn from(t: String) -> Self {
        text(t)
    }
}
