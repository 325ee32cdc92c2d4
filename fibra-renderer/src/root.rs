use std::cell::RefCell;
use std::rc::Rc;

use fibra_core::{Runtime, Scheduler, SchedulerConfig, Task};
use fibra_dom::{construct, Child, HostTree, MemoryDocument, NodeId, Props, Tag, VNode};
use tracing::{debug, error, trace, warn};

use crate::commit::{apply, plan, CommitStats};
use crate::error::RenderError;
use crate::fiber::{Fiber, FiberArena, FiberId};
use crate::reconcile::reconcile;

/// What `render` does while a previous render has not committed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Drop the in-flight tree and start over with the new one.
    #[default]
    Restart,
    /// Refuse the new tree with [`RenderError::Busy`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderConfig {
    pub overlap: OverlapPolicy,
    pub scheduler: SchedulerConfig,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }
}

/// Render state of one mount point.
///
/// Holds the last committed tree, at most one tree in flight and the
/// traversal position inside it.
pub struct FiberRoot<H: HostTree> {
    host: H,
    mount_point: H::Node,
    arena: FiberArena<H::Node>,
    current: Option<FiberId>,
    wip: Option<FiberId>,
    next_unit: Option<FiberId>,
    overlap: OverlapPolicy,
    last_commit: Option<CommitStats>,
    commits: u64,
}

impl<H: HostTree> FiberRoot<H> {
    pub fn new(host: H, mount_point: H::Node, overlap: OverlapPolicy) -> Self {
        Self {
            host,
            mount_point,
            arena: FiberArena::new(),
            current: None,
            wip: None,
            next_unit: None,
            overlap,
            last_commit: None,
            commits: 0,
        }
    }

    /// Queue `tree` for rendering. Work happens later, unit by unit.
    pub fn render(&mut self, tree: VNode) -> Result<(), RenderError> {
        if let Some(wip) = self.wip {
            match self.overlap {
                OverlapPolicy::Reject => return Err(RenderError::Busy),
                OverlapPolicy::Restart => {
                    let dropped = self.arena.remove_tree(wip);
                    warn!(dropped, "render restarted before the previous one committed");
                }
            }
        }
        let root = self.arena.insert(Fiber::new(tree, None, self.current));
        self.wip = Some(root);
        self.next_unit = Some(root);
        debug!(fiber = %root, "render queued");
        Ok(())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn mount_point(&self) -> &H::Node {
        &self.mount_point
    }

    pub fn arena(&self) -> &FiberArena<H::Node> {
        &self.arena
    }

    /// Root of the last committed tree.
    pub fn current(&self) -> Option<FiberId> {
        self.current
    }

    /// Host node of the last committed root, if it has one.
    pub fn root_node(&self) -> Option<&H::Node> {
        self.arena.get(self.current?)?.host.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.wip.is_none()
    }

    pub fn last_commit(&self) -> Option<CommitStats> {
        self.last_commit
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }

    fn commit(&mut self, root: FiberId) -> Result<(), RenderError> {
        let mutations = plan(&self.arena, root, self.current);
        match apply(&mut self.arena, &mut self.host, &self.mount_point, &mutations) {
            Ok(stats) => {
                if let Some(old) = self.current.replace(root) {
                    self.arena.remove_tree(old);
                }
                self.arena.clear_alternates(root);
                self.commits += 1;
                self.last_commit = Some(stats);
                debug!(
                    created = stats.created,
                    adopted = stats.adopted,
                    replaced = stats.replaced,
                    removed = stats.removed,
                    "commit"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "commit failed, host tree may be partially updated");
                self.arena.remove_tree(root);
                Err(e)
            }
        }
    }
}

impl<H: HostTree> Task for FiberRoot<H> {
    type Error = RenderError;

    fn has_pending_work(&self) -> bool {
        self.next_unit.is_some()
    }

    fn perform_unit(&mut self) -> Result<(), RenderError> {
        let (Some(unit), Some(root)) = (self.next_unit, self.wip) else {
            return Ok(());
        };
        reconcile(&mut self.arena, unit);
        self.next_unit = self.arena.next_unit(unit, root);
        if self.next_unit.is_none() {
            trace!(fiber = %root, "traversal complete");
            self.wip = None;
            self.commit(root)?;
        }
        Ok(())
    }
}

/// Handle to a mounted tree: its render state plus the work loop driving it.
pub struct Renderer<H: HostTree + 'static> {
    root: Rc<RefCell<FiberRoot<H>>>,
    scheduler: Scheduler,
}

impl<H: HostTree + 'static> Renderer<H> {
    /// Take ownership of `host` and start the work loop on `runtime`.
    /// Nothing is rendered until [`render`](Self::render) is called.
    pub fn mount(host: H, mount_point: H::Node, runtime: Rc<dyn Runtime>, config: RenderConfig) -> Self {
        let root = Rc::new(RefCell::new(FiberRoot::new(host, mount_point, config.overlap)));
        let scheduler = Scheduler::start(Rc::clone(&root), runtime, config.scheduler);
        Self { root, scheduler }
    }

    /// Queue `tree`; it is committed once the work loop gets through it.
    pub fn render(&self, tree: VNode) -> Result<(), RenderError> {
        self.root.borrow_mut().render(tree)
    }

    /// Call `component` with `props` and `children` and render the result.
    pub fn render_component(
        &self,
        component: impl Into<Tag>,
        props: impl Into<Props>,
        children: Vec<Child>,
    ) -> Result<(), RenderError> {
        self.render(construct(component, props, children))
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(self.root.borrow().host())
    }

    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.root.borrow_mut().host_mut())
    }

    pub fn with_root<R>(&self, f: impl FnOnce(&FiberRoot<H>) -> R) -> R {
        f(&self.root.borrow())
    }

    pub fn root_node(&self) -> Option<H::Node> {
        self.root.borrow().root_node().cloned()
    }

    pub fn is_idle(&self) -> bool {
        self.root.borrow().is_idle()
    }

    pub fn last_commit(&self) -> Option<CommitStats> {
        self.root.borrow().last_commit()
    }

    pub fn scheduler(&self) -> Scheduler {
        self.scheduler
    }
}

impl Renderer<MemoryDocument> {
    /// Fire `event` on `node`. Handlers run after the document is released,
    /// so they are free to call [`render`](Self::render).
    pub fn dispatch(&self, node: NodeId, event: &str) -> Result<usize, RenderError> {
        let handlers = self.root.borrow().host().listeners(node, event)?;
        let ev = fibra_dom::Event {
            name: event.to_string(),
        };
        for handler in &handlers {
            handler.call(&ev);
        }
        Ok(handlers.len())
    }
}

/// Mount `tree` at `mount_point` with the default configuration.
pub fn render<H: HostTree + 'static>(
    tree: VNode,
    mount_point: H::Node,
    host: H,
    runtime: Rc<dyn Runtime>,
) -> Result<Renderer<H>, RenderError> {
    let renderer = Renderer::mount(host, mount_point, runtime, RenderConfig::default());
    renderer.render(tree)?;
    Ok(renderer)
}
