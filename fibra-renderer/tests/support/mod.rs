#![allow(dead_code)]

use std::rc::Rc;

use fibra_core::{ManualRuntime, UnitBudget};
use fibra_dom::{HostOp, MemoryDocument, NodeId, VNode};
use fibra_renderer::{RenderConfig, Renderer};

/// A renderer mounted on a fresh document body, pumped by hand.
pub struct Harness {
    pub runtime: Rc<ManualRuntime>,
    pub renderer: Renderer<MemoryDocument>,
    pub body: NodeId,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ManualRuntime::new(), RenderConfig::default())
    }

    pub fn with_config(runtime: ManualRuntime, config: RenderConfig) -> Self {
        let doc = MemoryDocument::new();
        let body = doc.body();
        let runtime = Rc::new(runtime);
        let renderer = Renderer::mount(doc, body, runtime.clone(), config);
        Self { runtime, renderer, body }
    }

    /// Render `tree` to completion and return the host operations it caused.
    pub fn render(&self, tree: VNode) -> Vec<HostOp> {
        self.renderer.with_host_mut(|d| d.take_log());
        self.renderer.render(tree).unwrap();
        self.flush();
        self.renderer.with_host_mut(|d| d.take_log())
    }

    pub fn flush(&self) {
        while !self.renderer.is_idle() {
            self.runtime.run_idle_slice(&UnitBudget::new(1000)).unwrap();
        }
    }

    pub fn markup(&self) -> String {
        self.renderer.with_host(|d| d.inner_markup(self.body))
    }

    pub fn root_node(&self) -> NodeId {
        self.renderer.root_node().expect("committed root")
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.renderer.with_host(|d| d.children(node).to_vec())
    }
}

pub fn count(ops: &[HostOp], pred: impl Fn(&HostOp) -> bool) -> usize {
    ops.iter().filter(|op| pred(op)).count()
}
