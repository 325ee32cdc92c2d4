use std::fmt;
use std::rc::Rc;

use crate::{Element, Props, VNode};

/// A function from props and children to a tree.
pub type Component = Rc<dyn Fn(&Props, Vec<VNode>) -> VNode>;

#[derive(Clone)]
pub enum Tag {
    Name(String),
    Component(Component),
}

impl Tag {
    pub fn component(f: impl Fn(&Props, Vec<VNode>) -> VNode + 'static) -> Self {
        Tag::Component(Rc::new(f))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(n) => f.debug_tuple("Name").field(n).finish(),
            Tag::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::Name(s.to_string())
    }
}
impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::Name(s)
    }
}
impl From<Component> for Tag {
    fn from(c: Component) -> Self {
        Tag::Component(c)
    }
}

/// One argument of [`construct`]: a single node, or a list spliced in place.
#[derive(Debug, Clone)]
pub enum Child {
    Node(VNode),
    List(Vec<VNode>),
}

impl From<VNode> for Child {
    fn from(v: VNode) -> Self {
        Child::Node(v)
    }
}
impl From<Vec<VNode>> for Child {
    fn from(v: Vec<VNode>) -> Self {
        Child::List(v)
    }
}
impl From<&str> for Child {
    fn from(t: &str) -> Self {
        Child::Node(t.into())
    }
}
impl From<String> for Child {
    fn from(t: String) -> Self {
        Child::Node(t.into())
    }
}

/// Flatten children one level deep.
pub fn flatten(children: Vec<Child>) -> Vec<VNode> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Child::Node(v) => out.push(v),
            Child::List(vs) => out.extend(vs),
        }
    }
    out
}

/// Build a node from a tag, its props and its children.
///
/// Components are called right away and their output is returned unchanged,
/// so they never show up in the tree themselves.
pub fn construct(tag: impl Into<Tag>, props: impl Into<Props>, children: Vec<Child>) -> VNode {
    let props = props.into();
    let children = flatten(children);
    match tag.into() {
        Tag::Component(component) => component(&props, children),
        Tag::Name(name) => VNode::Element(Rc::new(Element::new(name, props, children))),
    }
}
