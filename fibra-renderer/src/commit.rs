//! Commit phase.
//!
//! [`plan`] reads a fully reconciled tree next to the last committed one and
//! returns the host mutations needed to move from one to the other, without
//! touching anything. [`apply`] then performs them in order.

use std::collections::{HashMap, HashSet};

use fibra_dom::HostTree;
use tracing::trace;

use crate::create::create_host_node;
use crate::error::RenderError;
use crate::fiber::{FiberArena, FiberId};

/// Where a node gets appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Mount,
    Fiber(FiberId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Create a fresh host node for the fiber.
    Create { fiber: FiberId },
    /// Take over the host node of `from`. `in_place` means the node already
    /// sits under the right parent and needs no host operation.
    Adopt { fiber: FiberId, from: FiberId, in_place: bool },
    Append { parent: Container, child: FiberId },
    /// Swap the fiber's new node in where `old`'s node sits.
    Substitute { old: FiberId, fiber: FiberId },
    /// Detach a node of the previous tree, subtree included.
    Remove { fiber: FiberId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub created: usize,
    pub adopted: usize,
    pub appended: usize,
    pub replaced: usize,
    pub removed: usize,
}

impl CommitStats {
    /// Host operations performed, node creation included.
    pub fn host_ops(&self) -> usize {
        self.created + self.appended + self.replaced + self.removed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Fragment,
    Created,
    Adopted,
    Substituted,
}

/// Mutations that turn the host tree of `previous` into that of `root`.
///
/// Per fiber, in pre-order: a fragment gets nothing; a fiber equal to its
/// alternate adopts the alternate's node; a changed fiber gets a new node,
/// swapped in place when its host parent is unchanged; everything else is
/// created and appended. The root is attached to the mount point last.
///
/// Appends go to the end of their container, so once a container has taken
/// one, every later node in it is appended too, reused nodes included. That
/// keeps host children in tree order.
///
/// Old nodes nobody took over are removed at the end, but only where their
/// old container is still in the document.
pub fn plan<N>(arena: &FiberArena<N>, root: FiberId, previous: Option<FiberId>) -> Vec<Mutation> {
    let mut out = Vec::new();
    let mut decisions: HashMap<FiberId, Decision> = HashMap::new();
    let mut claimed: HashSet<FiberId> = HashSet::new();
    let mut adopted: HashSet<FiberId> = HashSet::new();
    let mut appended: HashSet<Container> = HashSet::new();
    let mut root_attach = None;

    for id in arena.preorder(root) {
        let fiber = &arena[id];
        if fiber.is_fragment() {
            decisions.insert(id, Decision::Fragment);
            continue;
        }
        let parent = arena.host_parent(id);
        let container = parent.map_or(Container::Mount, Container::Fiber);
        // Fragment alternates (and failed earlier commits) leave nothing to reuse.
        let alt = fiber.alternate.filter(|&a| arena[a].host.is_some());
        let in_place = !appended.contains(&container)
            && alt.is_some_and(|a| same_container(arena, &decisions, parent, arena.host_parent(a)));

        let (decision, attach) = match alt {
            Some(a) if fiber.vnode.equals(&arena[a].vnode) => {
                claimed.insert(a);
                adopted.insert(a);
                out.push(Mutation::Adopt { fiber: id, from: a, in_place });
                let attach = (!in_place).then_some(Mutation::Append { parent: container, child: id });
                (Decision::Adopted, attach)
            }
            Some(a) if in_place => {
                claimed.insert(a);
                out.push(Mutation::Create { fiber: id });
                (Decision::Substituted, Some(Mutation::Substitute { old: a, fiber: id }))
            }
            _ => {
                out.push(Mutation::Create { fiber: id });
                (Decision::Created, Some(Mutation::Append { parent: container, child: id }))
            }
        };
        decisions.insert(id, decision);
        match attach {
            Some(m) if id == root => root_attach = Some(m),
            Some(m) => {
                if let Mutation::Append { parent, .. } = m {
                    appended.insert(parent);
                }
                out.push(m);
            }
            None => {}
        }
    }
    out.extend(root_attach);

    if let Some(prev) = previous {
        sweep(arena, prev, &claimed, &adopted, &mut out);
    }
    out
}

/// Whether a new fiber under `new_parent` shares its host parent node with
/// an old fiber under `old_parent`.
fn same_container<N>(
    arena: &FiberArena<N>,
    decisions: &HashMap<FiberId, Decision>,
    new_parent: Option<FiberId>,
    old_parent: Option<FiberId>,
) -> bool {
    match (new_parent, old_parent) {
        (None, None) => true,
        (Some(p), Some(q)) => {
            decisions.get(&p) == Some(&Decision::Adopted) && arena[p].alternate == Some(q)
        }
        _ => false,
    }
}

/// Emit removals for old host nodes that were not taken over and still hang
/// in a live container. Fragments pass liveness through to their children.
fn sweep<N>(
    arena: &FiberArena<N>,
    prev_root: FiberId,
    claimed: &HashSet<FiberId>,
    adopted: &HashSet<FiberId>,
    out: &mut Vec<Mutation>,
) {
    let mut stack = vec![(prev_root, true)];
    while let Some((id, live)) = stack.pop() {
        let fiber = &arena[id];
        if id != prev_root {
            stack.extend(fiber.sibling.map(|s| (s, live)));
        }
        let child_live = if fiber.is_fragment() {
            live
        } else if claimed.contains(&id) {
            adopted.contains(&id)
        } else {
            if live && fiber.host.is_some() {
                out.push(Mutation::Remove { fiber: id });
            }
            false
        };
        stack.extend(fiber.child.map(|c| (c, child_live)));
    }
}

fn host_node<N: Clone>(arena: &FiberArena<N>, id: FiberId) -> Result<N, RenderError> {
    arena[id].host.clone().ok_or(RenderError::MissingHostNode(id))
}

/// Perform `mutations` against `host`.
///
/// Stops at the first failure; whatever was applied before stays applied.
pub fn apply<H: HostTree>(
    arena: &mut FiberArena<H::Node>,
    host: &mut H,
    mount_point: &H::Node,
    mutations: &[Mutation],
) -> Result<CommitStats, RenderError> {
    let mut stats = CommitStats::default();
    for m in mutations {
        trace!(mutation = ?m, "apply");
        match *m {
            Mutation::Create { fiber } => {
                let node = create_host_node(host, &arena[fiber].vnode)?;
                arena[fiber].host = Some(node);
                stats.created += 1;
            }
            Mutation::Adopt { fiber, from, in_place } => {
                let node = host_node(arena, from)?;
                let f = &mut arena[fiber];
                f.host = Some(node);
                f.committed = in_place;
                stats.adopted += 1;
            }
            Mutation::Append { parent, child } => {
                let parent = match parent {
                    Container::Mount => mount_point.clone(),
                    Container::Fiber(p) => host_node(arena, p)?,
                };
                host.append_child(&parent, &host_node(arena, child)?)?;
                arena[child].committed = true;
                stats.appended += 1;
            }
            Mutation::Substitute { old, fiber } => {
                host.replace_child(&host_node(arena, old)?, &host_node(arena, fiber)?)?;
                arena[fiber].committed = true;
                stats.replaced += 1;
            }
            Mutation::Remove { fiber } => {
                host.remove_child(&host_node(arena, fiber)?)?;
                stats.removed += 1;
            }
        }
    }
    Ok(stats)
}
