use std::fmt;
use std::ops::{Index, IndexMut};

use fibra_dom::VNode;
use slab::Slab;

/// Index of a fiber inside a [`FiberArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(usize);

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Unit of work over one position of the tree.
///
/// `alternate` points at the fiber that held the same position in the last
/// committed tree. `host` is filled in during commit; fragments never get one.
#[derive(Debug)]
pub struct Fiber<N> {
    pub vnode: VNode,
    pub alternate: Option<FiberId>,
    pub host: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub committed: bool,
}

impl<N> Fiber<N> {
    pub fn new(vnode: VNode, parent: Option<FiberId>, alternate: Option<FiberId>) -> Self {
        Self {
            vnode,
            alternate,
            host: None,
            parent,
            child: None,
            sibling: None,
            committed: false,
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.vnode.is_fragment()
    }
}

/// Storage for every live fiber, current and in-flight trees alike.
#[derive(Debug)]
pub struct FiberArena<N> {
    fibers: Slab<Fiber<N>>,
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> FiberArena<N> {
    pub fn new() -> Self {
        Self { fibers: Slab::new() }
    }

    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        FiberId(self.fibers.insert(fiber))
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Next unit after `id` in a depth-first pre-order walk of the tree
    /// rooted at `root`: the first child, else the closest sibling of `id` or
    /// one of its ancestors. `None` once the walk is complete.
    pub fn next_unit(&self, id: FiberId, root: FiberId) -> Option<FiberId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut cur = id;
        while cur != root {
            if let Some(sibling) = self[cur].sibling {
                return Some(sibling);
            }
            cur = self[cur].parent?;
        }
        None
    }

    pub fn preorder(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut cur = Some(root);
        while let Some(id) = cur {
            out.push(id);
            cur = self.next_unit(id, root);
        }
        out
    }

    /// Nearest ancestor that is not a fragment. `None` means the mount point.
    pub fn host_parent(&self, id: FiberId) -> Option<FiberId> {
        let mut cur = self[id].parent;
        while let Some(p) = cur {
            if !self[p].is_fragment() {
                return Some(p);
            }
            cur = self[p].parent;
        }
        None
    }

    /// Free the tree rooted at `root`. Returns how many fibers were dropped.
    pub fn remove_tree(&mut self, root: FiberId) -> usize {
        let mut removed = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(fiber) = self.fibers.try_remove(id.0) else {
                continue;
            };
            removed += 1;
            stack.extend(fiber.child);
            if id != root {
                stack.extend(fiber.sibling);
            }
        }
        removed
    }

    /// Forget the previous tree: after commit nothing points back at it.
    pub fn clear_alternates(&mut self, root: FiberId) {
        for id in self.preorder(root) {
            self[id].alternate = None;
        }
    }
}

impl<N> Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id.0]
    }
}

impl<N> IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id.0]
    }
}
