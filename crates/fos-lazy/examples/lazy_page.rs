//! Example: lazily activating a long page while it scrolls
//!
//! Run with `RUST_LOG=fos_lazy=debug` to see the loader's own logging.

use std::collections::HashMap;

use fos_dom::{DOMRect, Features, NodeId, RootMargin, Selector};
use fos_lazy::{Callbacks, LazyLoadOptions, LazyLoader, Target};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Gallery</title></head>
<body>
    <h1>Gallery</h1>
    <img lazy-load data-lazy-src="photos/1.jpg" data-lazy-alt="Harbour">
    <img lazy-load data-lazy-src="photos/2.jpg" data-lazy-alt="Lighthouse">
    <img lazy-load data-lazy-src="photos/3.jpg" data-lazy-srcset="photos/3@2x.jpg 2x">
    <div lazy-load data-lazy-class="card visible" data-lazy-style="opacity: 1;">Caption</div>
    <video lazy-load data-lazy-poster="clips/tide.jpg" data-lazy-src="clips/tide.mp4"></video>
</body>
</html>
"#;

const VIEWPORT_HEIGHT: f64 = 600.0;
const BLOCK_HEIGHT: f64 = 400.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut doc = fos_html::parse(PAGE)?;
    let blocks: Vec<NodeId> = doc.query_selector_all(&Selector::parse("[lazy-load]")?).iter().collect();
    println!("Page has {} lazy elements", blocks.len());

    let callbacks = Callbacks::new()
        .on_load(|_, result| {
            println!(
                "  load  {:?} {}",
                result.element,
                result.attr.as_deref().unwrap_or("-")
            );
        })
        .on_call(|_, result| {
            println!(
                "  call  {:?} ratio={:.2}",
                result.element,
                result.intersection_ratio.unwrap_or_default()
            );
        })
        .on_error(|state, _| println!("  error {}", state.msg));

    // Start fetching one block before it scrolls in
    let options = LazyLoadOptions::default().with_root_margin(RootMargin::parse("0px 0px 200px 0px")?);
    let mut loader = LazyLoader::new(&mut doc, Target::Document, options, callbacks, &Features::detect());

    let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, VIEWPORT_HEIGHT);
    for (frame, scroll) in [0.0, 300.0, 900.0, 1500.0].into_iter().enumerate() {
        println!("Frame {} (scrollY = {})", frame, scroll);
        let rects: HashMap<NodeId, DOMRect> = blocks
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, DOMRect::from_xywh(0.0, i as f64 * BLOCK_HEIGHT - scroll, 800.0, BLOCK_HEIGHT)))
            .collect();
        loader.update(&mut doc, viewport, &rects, frame as f64 * 16.0);
    }

    let remaining = loader.observer().map(|o| o.observed_count()).unwrap_or_default();
    println!("Still observing {} elements", remaining);
    Ok(())
}
