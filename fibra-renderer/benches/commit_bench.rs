use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fibra_core::{ManualRuntime, UnitBudget};
use fibra_dom::{h, text, MemoryDocument, Props, VNode};
use fibra_renderer::{RenderConfig, Renderer};

fn build_rows(count: usize, generation: usize) -> VNode {
    let mut children = Vec::with_capacity(count);
    for i in 0..count {
        let class = if i % 2 == 0 { "even" } else { "odd" };
        // Every tenth row changes between generations.
        let label = if i % 10 == 0 { format!("row {i} gen {generation}") } else { format!("row {i}") };
        children.push(h("li", Props::new().set("class", class), vec![text(label)]));
    }
    h("ul", (), children)
}

fn pump(runtime: &ManualRuntime, renderer: &Renderer<MemoryDocument>) {
    while !renderer.is_idle() {
        runtime.run_idle_slice(&UnitBudget::new(64)).expect("slice");
    }
}

fn bench_rerender(c: &mut Criterion) {
    let mut group = c.benchmark_group("rerender_rows");
    group.sample_size(20);
    for &count in &[50usize, 200usize, 500usize] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let doc = MemoryDocument::new();
            let body = doc.body();
            let runtime = Rc::new(ManualRuntime::new());
            let renderer = Renderer::mount(doc, body, runtime.clone(), RenderConfig::default());
            let mut generation = 0;
            b.iter(|| {
                generation += 1;
                renderer.render(build_rows(count, generation)).expect("render");
                pump(&runtime, &renderer);
                renderer.with_host_mut(|d| d.take_log());
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().without_plots();
    targets = bench_rerender
}
criterion_main!(benches);
