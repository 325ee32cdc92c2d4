mod support;

use std::cell::Cell;
use std::rc::Rc;

use fibra_core::{ManualRuntime, ScheduleMode, SchedulerConfig, UnitBudget};
use fibra_dom::{h, text, HostError, MemoryDocument, Props, Tag, VNode, FRAGMENT};
use fibra_renderer::{render, OverlapPolicy, RenderConfig, RenderError};
use support::Harness;

fn list(items: &[&str]) -> VNode {
    h("ul", (), items.iter().map(|s| h("li", (), vec![text(*s)])).collect())
}

#[test]
fn render_returns_before_any_host_work() {
    let t = Harness::new();
    t.renderer.render(list(&["a", "b"])).unwrap();
    assert!(!t.renderer.is_idle());
    assert!(t.renderer.with_host(|d| d.log().is_empty()));
}

#[test]
fn traversal_spans_slices_and_commits_once() {
    let t = Harness::new();
    // ul, li, a, li, b: five units.
    t.renderer.render(list(&["a", "b"])).unwrap();

    t.runtime.run_idle_slice(&UnitBudget::new(2)).unwrap();
    assert!(!t.renderer.is_idle());
    assert_eq!(t.markup(), "");
    t.runtime.run_idle_slice(&UnitBudget::new(2)).unwrap();
    assert_eq!(t.markup(), "");

    // The commit runs inside the slice that finishes the walk.
    t.runtime.run_idle_slice(&UnitBudget::new(2)).unwrap();
    assert!(t.renderer.is_idle());
    assert_eq!(t.markup(), "<ul><li>a</li><li>b</li></ul>");
    assert_eq!(t.renderer.with_root(|r| r.commits()), 1);
}

#[test]
fn timer_fallback_commits_in_one_callback() {
    let t = Harness::with_config(ManualRuntime::without_idle(), RenderConfig::default());
    assert!(!t.renderer.scheduler().uses_idle());
    t.renderer.render(list(&["a", "b", "c"])).unwrap();
    t.runtime.run_timer().unwrap();
    assert!(t.renderer.is_idle());
    assert_eq!(t.markup(), "<ul><li>a</li><li>b</li><li>c</li></ul>");
    assert_eq!(t.runtime.pending_timers(), 1);
}

#[test]
fn forced_timer_mode_ignores_idle_support() {
    let config = RenderConfig::new().scheduler(SchedulerConfig::new().mode(ScheduleMode::Timer));
    let t = Harness::with_config(ManualRuntime::new(), config);
    assert_eq!(t.runtime.pending_idle(), 0);
    assert_eq!(t.runtime.pending_timers(), 1);
}

#[test]
fn overlapping_render_restarts_with_latest_tree() {
    let t = Harness::new();
    t.renderer.render(list(&["a", "b", "c"])).unwrap();
    t.runtime.run_idle_slice(&UnitBudget::new(2)).unwrap();

    t.renderer.render(list(&["x"])).unwrap();
    t.flush();
    assert_eq!(t.markup(), "<ul><li>x</li></ul>");
    assert_eq!(t.renderer.with_root(|r| r.commits()), 1);
    // The abandoned tree's fibers are gone.
    assert_eq!(t.renderer.with_root(|r| r.arena().len()), 3);
}

#[test]
fn overlapping_render_can_be_rejected() {
    let config = RenderConfig::new().overlap(OverlapPolicy::Reject);
    let t = Harness::with_config(ManualRuntime::new(), config);
    t.renderer.render(list(&["a"])).unwrap();
    let err = t.renderer.render(list(&["b"])).unwrap_err();
    assert!(matches!(err, RenderError::Busy));
    t.flush();
    assert_eq!(t.markup(), "<ul><li>a</li></ul>");
    // Once committed, the next render is accepted.
    t.renderer.render(list(&["b"])).unwrap();
}

#[test]
fn failed_commit_keeps_previous_tree_as_baseline() {
    let t = Harness::new();
    t.render(list(&["a"]));
    let baseline = t.renderer.with_root(|r| r.current());
    assert!(baseline.is_some());

    t.renderer
        .render(h("ul", (), vec![h("li", (), vec![text("a")]), h("bad tag", (), vec![])]))
        .unwrap();
    let err = t.runtime.run_idle_slice(&UnitBudget::new(100)).unwrap_err();
    let render_err = err.downcast_ref::<RenderError>().unwrap();
    assert!(matches!(render_err, RenderError::Host(HostError::InvalidTag(tag)) if tag == "bad tag"));
    assert!(t.renderer.is_idle());
    assert_eq!(t.renderer.with_root(|r| r.commits()), 1);
    assert_eq!(t.renderer.with_root(|r| r.current()), baseline);

    // The loop is still alive and diffs against the last good tree.
    assert_eq!(t.runtime.pending_idle(), 1);
    let ops = t.render(list(&["a"]));
    assert!(ops.is_empty());
}

#[test]
fn click_handler_drives_rerender() {
    let t = Harness::new();
    let count = Rc::new(Cell::new(0));
    let view = |n: i32, count: &Rc<Cell<i32>>| {
        let count = count.clone();
        h(
            FRAGMENT,
            (),
            vec![
                h("button", Props::new().on("Click", move |_| count.set(count.get() + 1)), vec![text("Click me")]),
                h("p", (), vec![text(format!("Count: {n}"))]),
            ],
        )
    };
    t.render(view(0, &count));
    let button = t.children(t.body)[0];

    assert_eq!(t.renderer.dispatch(button, "click").unwrap(), 1);
    assert_eq!(count.get(), 1);
    t.render(view(count.get(), &count));
    assert_eq!(t.markup(), "<button>Click me</button><p>Count: 1</p>");
    // The button survived the re-render, listener included.
    assert_eq!(t.children(t.body)[0], button);
    assert_eq!(t.renderer.dispatch(button, "click").unwrap(), 1);
    assert_eq!(count.get(), 2);
}

#[test]
fn components_render_their_output() {
    let t = Harness::new();
    let greeting = Tag::component(|props, children| {
        let name = props.get("name").and_then(|v| v.to_attr()).unwrap_or_default();
        h("div", (), vec![vec![text(format!("Hello, {name}"))], children].concat())
    });
    t.renderer
        .render_component(greeting, Props::new().set("name", "fibra"), vec!["!".into()])
        .unwrap();
    t.flush();
    assert_eq!(t.markup(), "<div>Hello, fibra!</div>");
}

#[test]
fn free_render_mounts_and_queues() {
    let doc = MemoryDocument::new();
    let body = doc.body();
    let runtime = Rc::new(ManualRuntime::new());
    let renderer = render(list(&["a"]), body, doc, runtime.clone()).unwrap();
    assert_eq!(renderer.with_root(|r| *r.mount_point()), body);
    assert_eq!(renderer.with_root(|r| r.current()), None);
    runtime.run_idle_slice(&UnitBudget::new(100)).unwrap();
    assert!(renderer.is_idle());
    assert_eq!(renderer.with_host(|d| d.inner_markup(body)), "<ul><li>a</li></ul>");
}
