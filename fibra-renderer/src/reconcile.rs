use tracing::trace;

use crate::fiber::{Fiber, FiberArena, FiberId};

/// Create the child fibers of `id`, one per child node, in order.
///
/// Children are paired with the previous tree purely by position: the i-th
/// new child takes the i-th child of the parent's alternate. Keys play no
/// part, so a reordered list shows up as a series of changed positions.
/// Children past the end of the old list get no alternate.
pub fn reconcile<N>(arena: &mut FiberArena<N>, id: FiberId) {
    let vnode = arena[id].vnode.clone();
    let mut old = arena[id].alternate.and_then(|a| arena[a].child);
    let mut prev: Option<FiberId> = None;
    for child in vnode.children() {
        let new = arena.insert(Fiber::new(child.clone(), Some(id), old));
        match prev {
            None => arena[id].child = Some(new),
            Some(p) => arena[p].sibling = Some(new),
        }
        prev = Some(new);
        old = old.and_then(|o| arena[o].sibling);
    }
    trace!(fiber = %id, children = vnode.children().len(), "reconciled");
}
