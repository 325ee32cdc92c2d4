use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use fibra_core::{InstantDeadline, ManualRuntime};
use fibra_dom::{h, text, MemoryDocument, Props, Tag, VNode, FRAGMENT};
use fibra_renderer::{RenderConfig, Renderer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct State {
    count: Cell<i32>,
    dirty: Cell<bool>,
}

fn app(state: Rc<State>) -> Tag {
    Tag::component(move |_, _| {
        let n = state.count.get();
        let on_click = {
            let state = state.clone();
            move |_: &fibra_dom::Event| {
                state.count.set(state.count.get() + 1);
                state.dirty.set(true);
            }
        };
        h(
            FRAGMENT,
            (),
            vec![
                h("button", Props::new().on("Click", on_click), vec![text("Click me")]),
                h("p", (), vec![text(format!("Count: {n}"))]),
            ],
        )
    })
}

fn view(state: &Rc<State>) -> VNode {
    fibra_dom::construct(app(state.clone()), (), vec![])
}

fn slice_budget() -> Result<Duration> {
    match std::env::var("FIBRA_SLICE_MS") {
        Ok(ms) => {
            let ms: u64 = ms.parse().with_context(|| format!("FIBRA_SLICE_MS={ms} is not a number"))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(Duration::from_millis(16)),
    }
}

fn pump(runtime: &ManualRuntime, renderer: &Renderer<MemoryDocument>, budget: Duration) -> Result<()> {
    while !renderer.is_idle() {
        runtime.run_idle_slice(&InstantDeadline::after(budget))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let budget = slice_budget()?;
    let doc = MemoryDocument::new();
    let body = doc.body();
    let runtime = Rc::new(ManualRuntime::new());
    let renderer = Renderer::mount(doc, body, runtime.clone(), RenderConfig::default());

    let state = Rc::new(State::default());
    renderer.render(view(&state))?;
    pump(&runtime, &renderer, budget)?;
    println!("{}", renderer.with_host(|d| d.inner_markup(body)));

    for _ in 0..3 {
        let button = renderer
            .with_host(|d| d.children(body).first().copied())
            .context("button was not mounted")?;
        renderer.dispatch(button, "click")?;
        if state.dirty.replace(false) {
            renderer.render(view(&state))?;
            pump(&runtime, &renderer, budget)?;
        }
        if let Some(stats) = renderer.last_commit() {
            info!(replaced = stats.replaced, adopted = stats.adopted, "re-rendered");
        }
        println!("{}", renderer.with_host(|d| d.inner_markup(body)));
    }
    Ok(())
}
