//! Integration tests - markup to loaded attributes
//!
//! Pages are authored as HTML, laid out by hand with rects, and driven
//! frame by frame through `LazyLoader::update`.

use std::collections::HashMap;

use fos_dom::{DOMRect, Document, Features, NodeId, NodeList, RootMargin, Selector};
use fos_lazy::{
    Callbacks, LOADED_ATTR, LazyLoadListener, LazyLoadOptions, LazyLoadResult, LazyLoadState, LazyLoader, Lifecycle,
    StateCode, Target, UNLOADED_ATTR,
};

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<(StateCode, LazyLoadResult)>,
}

impl Recorder {
    fn codes(&self) -> Vec<StateCode> {
        self.events.iter().map(|(code, _)| *code).collect()
    }

    fn count(&self, code: StateCode) -> usize {
        self.events.iter().filter(|(c, _)| *c == code).count()
    }

    fn of(&self, code: StateCode) -> Vec<&LazyLoadResult> {
        self.events.iter().filter(|(c, _)| *c == code).map(|(_, r)| r).collect()
    }
}

impl LazyLoadListener for Recorder {
    fn load(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        self.events.push((state.code, result.clone()));
    }
    fn call(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        self.events.push((state.code, result.clone()));
    }
    fn error(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        self.events.push((state.code, result.clone()));
    }
}

fn viewport() -> DOMRect {
    DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0)
}

fn parse(html: &str) -> Document {
    fos_html::parse(html).unwrap()
}

fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
    doc.query_selector_all(&Selector::parse(selector).unwrap()).iter().collect()
}

fn lifecycle(doc: &Document, id: NodeId) -> Lifecycle {
    Lifecycle::of(doc.tree().element(id).unwrap())
}

/// Stack elements vertically, 200px tall each, starting at `top`
fn stacked(ids: &[NodeId], top: f64) -> HashMap<NodeId, DOMRect> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (*id, DOMRect::from_xywh(0.0, top + 200.0 * i as f64, 300.0, 200.0)))
        .collect()
}

const SCENARIO: &str = r#"<div id="card" lazy-load data-lazy-src="a.png" data-lazy-class="ready"></div>"#;

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_half_visible_element_loads() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());

    // Half of the card below the fold: ratio 0.5
    let rects = HashMap::from([(card, DOMRect::from_xywh(0.0, 500.0, 100.0, 200.0))]);
    loader.update(&mut doc, viewport(), &rects, 0.0);

    let tree = doc.tree();
    assert_eq!(tree.get_attribute(card, "src"), Some("a.png"));
    assert!(tree.class_list(card).contains("ready"));
    assert!(tree.has_attribute(card, LOADED_ATTR));
    assert!(!tree.has_attribute(card, UNLOADED_ATTR));

    let rec = loader.listener();
    assert_eq!(rec.codes(), vec![StateCode::Load, StateCode::Load, StateCode::Call]);
    let loads = rec.of(StateCode::Load);
    assert_eq!(loads[0].attr.as_deref(), Some("src"));
    assert_eq!(loads[1].attr.as_deref(), Some("class"));
    assert_eq!(loads[0].intersection_ratio, Some(0.5));
    assert_eq!(loads[0].is_intersecting, Some(true));
    assert_eq!(loads[0].element, Some(card));

    let calls = rec.of(StateCode::Call);
    assert_eq!(calls[0].attr, None);
    assert_eq!(calls[0].intersection_ratio, Some(0.5));
}

#[test]
fn test_without_observer_loads_immediately() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let loader = LazyLoader::new(
        &mut doc,
        Target::Document,
        LazyLoadOptions::default(),
        Recorder::default(),
        &Features::without_intersection_observer(),
    );

    assert_eq!(doc.tree().get_attribute(card, "src"), Some("a.png"));
    assert_eq!(lifecycle(&doc, card), Lifecycle::Loaded);

    let rec = loader.listener();
    assert_eq!(rec.codes(), vec![StateCode::NotSupport, StateCode::Load, StateCode::Load]);
    for load in rec.of(StateCode::Load) {
        assert_eq!(load.is_intersecting, None);
        assert_eq!(load.intersection_ratio, None);
    }
}

// ============================================================================
// LIFECYCLE AND IDEMPOTENCE
// ============================================================================

#[test]
fn test_lifecycle_progression() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), (), &Features::detect());

    assert_eq!(lifecycle(&doc, card), Lifecycle::Unregistered);
    loader.advance(&mut doc);
    assert_eq!(lifecycle(&doc, card), Lifecycle::Unloaded);

    // Offscreen: evaluated but not loaded
    let offscreen = HashMap::from([(card, DOMRect::from_xywh(0.0, 5000.0, 100.0, 100.0))]);
    loader.update(&mut doc, viewport(), &offscreen, 0.0);
    assert_eq!(lifecycle(&doc, card), Lifecycle::Unloaded);
    assert!(!doc.tree().has_attribute(card, "src"));

    let onscreen = HashMap::from([(card, DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0))]);
    loader.update(&mut doc, viewport(), &onscreen, 16.0);
    assert_eq!(lifecycle(&doc, card), Lifecycle::Loaded);
}

#[test]
fn test_repeated_visibility_loads_once() {
    let mut doc = parse(r#"<img id="pic" lazy-load data-lazy-src="p.png" data-lazy-style="opacity: 1;">"#);
    let pic = doc.get_element_by_id("pic").unwrap();
    let options = LazyLoadOptions::default().with_disposable(false);
    let mut loader = LazyLoader::new(&mut doc, Target::Document, options, Recorder::default(), &Features::detect());

    // In, out, in again
    let positions = [0.0, 5000.0, 0.0, 5000.0, 100.0];
    for (frame, y) in positions.iter().enumerate() {
        let rects = HashMap::from([(pic, DOMRect::from_xywh(0.0, *y, 100.0, 100.0))]);
        loader.update(&mut doc, viewport(), &rects, frame as f64 * 16.0);
    }

    let rec = loader.listener();
    assert_eq!(rec.count(StateCode::Load), 2, "one per staged attribute");
    assert_eq!(rec.count(StateCode::Call), positions.len());
    assert_eq!(doc.tree().get_attribute(pic, "style"), Some("opacity: 1;"));
}

#[test]
fn test_disposable_stops_reporting() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());

    for (frame, y) in [0.0, 5000.0, 0.0].iter().enumerate() {
        let rects = HashMap::from([(card, DOMRect::from_xywh(0.0, *y, 100.0, 100.0))]);
        loader.update(&mut doc, viewport(), &rects, frame as f64);
    }

    assert_eq!(loader.listener().count(StateCode::Call), 1);
    assert_eq!(loader.observer().map(|o| o.observed_count()), Some(0));
}

#[test]
fn test_entries_after_unobserve_are_dropped() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());
    loader.advance(&mut doc);

    // Host-computed batch reporting the same target twice
    let entry = fos_dom::IntersectionObserverEntry {
        target: card,
        bounding_client_rect: DOMRect::from_xywh(0.0, 0.0, 10.0, 10.0),
        intersection_rect: DOMRect::from_xywh(0.0, 0.0, 10.0, 10.0),
        root_bounds: Some(viewport()),
        intersection_ratio: 1.0,
        is_intersecting: true,
        time: 0.0,
    };
    loader.handle_entries(&mut doc, &[entry.clone(), entry]);

    let rec = loader.listener();
    assert_eq!(rec.count(StateCode::Call), 1);
    assert_eq!(rec.count(StateCode::Load), 2);
}

#[test]
fn test_zero_ratio_evaluates_without_loading() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let mut loader = LazyLoader::new(
        &mut doc,
        Target::Document,
        LazyLoadOptions::default().with_threshold(vec![0.0]),
        Recorder::default(),
        &Features::detect(),
    );

    // Touching the bottom edge of the viewport
    let rects = HashMap::from([(card, DOMRect::from_xywh(0.0, 600.0, 100.0, 100.0))]);
    loader.update(&mut doc, viewport(), &rects, 0.0);

    let rec = loader.listener();
    assert_eq!(rec.codes(), vec![StateCode::Call]);
    assert_eq!(rec.events[0].1.is_intersecting, Some(true));
    assert_eq!(rec.events[0].1.intersection_ratio, Some(0.0));
    assert_eq!(lifecycle(&doc, card), Lifecycle::Unloaded);
}

// ============================================================================
// SELECTION
// ============================================================================

#[test]
fn test_only_visible_elements_load() {
    let mut doc = parse(
        r#"
        <img lazy-load data-lazy-src="0.png">
        <img lazy-load data-lazy-src="1.png">
        <img lazy-load data-lazy-src="2.png">
        <img lazy-load data-lazy-src="3.png">
        <img lazy-load data-lazy-src="4.png">
        "#,
    );
    let imgs = select(&doc, "img");
    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());

    // 0..=2 overlap the 600px viewport, 3 starts exactly at its edge
    loader.update(&mut doc, viewport(), &stacked(&imgs, 0.0), 0.0);

    let loaded: Vec<bool> = imgs.iter().map(|id| doc.tree().has_attribute(*id, "src")).collect();
    assert_eq!(loaded, vec![true, true, true, false, false]);
    assert_eq!(loader.listener().count(StateCode::Call), 5);
}

#[test]
fn test_long_page_loads_as_it_scrolls() {
    let count = 3000;
    let html: String = (0..count)
        .map(|i| format!(r#"<img lazy-load data-lazy-src="{}.png">"#, i))
        .collect();
    let mut doc = parse(&html);
    let imgs = select(&doc, "img");
    assert_eq!(imgs.len(), count);

    let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());
    assert_eq!(loader.advance(&mut doc), count);

    // First screen: three blocks overlap the viewport
    loader.update(&mut doc, viewport(), &stacked(&imgs, 0.0), 0.0);
    assert_eq!(loader.observer().map(|o| o.observed_count()), Some(count - 3));
    assert_eq!(loader.listener().count(StateCode::Call), count);

    // Jump to the end of the page
    let bottom = -200.0 * (count as f64 - 3.0);
    loader.update(&mut doc, viewport(), &stacked(&imgs, bottom), 16.0);
    assert_eq!(loader.observer().map(|o| o.observed_count()), Some(count - 6));

    let loaded = imgs.iter().filter(|id| lifecycle(&doc, **id) == Lifecycle::Loaded).count();
    assert_eq!(loaded, 6);
    assert_eq!(doc.tree().get_attribute(imgs[count - 1], "src"), Some("2999.png"));
}

#[test]
fn test_container_target() {
    let mut doc = parse(
        r#"
        <section id="gallery">
            <img lazy-load data-lazy-src="in.png">
        </section>
        <img id="outside" lazy-load data-lazy-src="out.png">
        "#,
    );
    let gallery = doc.get_element_by_id("gallery").unwrap();
    let outside = doc.get_element_by_id("outside").unwrap();
    let loader = LazyLoader::new(
        &mut doc,
        Target::Element(gallery),
        LazyLoadOptions::default(),
        (),
        &Features::without_intersection_observer(),
    );

    assert_eq!(loader.managed().length(), 1);
    assert!(!doc.tree().has_attribute(outside, "src"));
    assert_eq!(select(&doc, "[src='in.png']").len(), 1);
}

#[test]
fn test_empty_container_reports_error_once() {
    let mut doc = parse(r#"<section id="empty"><p>No lazy content</p></section>"#);
    let empty = doc.get_element_by_id("empty").unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Element(empty), LazyLoadOptions::default(), Recorder::default(), &Features::detect());

    loader.update(&mut doc, viewport(), &HashMap::new(), 0.0);

    let rec = loader.listener();
    assert_eq!(rec.codes(), vec![StateCode::ErrorElement]);
    assert_eq!(rec.events[0].1, LazyLoadResult::empty());
    assert!(!loader.is_native());
}

#[test]
fn test_non_element_target_reports_error() {
    let mut doc = parse(SCENARIO);
    let text = doc.tree_mut().create_text("stray");
    let loader = LazyLoader::new(&mut doc, Target::Element(text), LazyLoadOptions::default(), Recorder::default(), &Features::detect());

    assert_eq!(loader.listener().codes(), vec![StateCode::ErrorElement]);
    assert!(loader.managed().is_empty());
}

#[test]
fn test_explicit_collection_is_not_filtered() {
    let mut doc = parse(r#"<img id="plain" data-lazy-alt="late alt">"#);
    let plain = doc.get_element_by_id("plain").unwrap();
    let loader = LazyLoader::new(
        &mut doc,
        Target::Nodes(NodeList::from_vec(vec![plain])),
        LazyLoadOptions::default(),
        (),
        &Features::without_intersection_observer(),
    );

    assert_eq!(loader.managed().as_slice(), &[plain]);
    assert_eq!(doc.tree().get_attribute(plain, "alt"), Some("late alt"));
}

#[test]
fn test_already_loaded_elements_are_not_rescanned() {
    let mut doc = parse(SCENARIO);
    let first = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), (), &Features::without_intersection_observer());
    assert_eq!(first.managed().length(), 1);

    let second = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), Recorder::default(), &Features::detect());
    assert_eq!(second.listener().codes(), vec![StateCode::ErrorElement]);
}

#[test]
fn test_loaded_before_registration_is_skipped() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let body = doc.body();
    let mut native = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), (), &Features::detect());
    // A second loader on the eager path gets there first
    LazyLoader::new(&mut doc, Target::Element(body), LazyLoadOptions::default(), (), &Features::without_intersection_observer());

    assert_eq!(native.advance(&mut doc), 0);
    assert!(!doc.tree().has_attribute(card, UNLOADED_ATTR));
    assert_eq!(lifecycle(&doc, card), Lifecycle::Loaded);
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_root_margin_preloads_below_fold() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let options = LazyLoadOptions::default().with_root_margin(RootMargin::parse("0px 0px 300px 0px").unwrap());
    let mut loader = LazyLoader::new(&mut doc, Target::Document, options, (), &Features::detect());

    let rects = HashMap::from([(card, DOMRect::from_xywh(0.0, 800.0, 100.0, 100.0))]);
    loader.update(&mut doc, viewport(), &rects, 0.0);

    assert_eq!(lifecycle(&doc, card), Lifecycle::Loaded);
}

#[test]
fn test_custom_root_element() {
    let mut doc = parse(
        r#"
        <div id="scroller">
            <img id="pic" lazy-load data-lazy-src="p.png">
        </div>
        "#,
    );
    let scroller = doc.get_element_by_id("scroller").unwrap();
    let pic = doc.get_element_by_id("pic").unwrap();
    let options = LazyLoadOptions::default().with_root(scroller);
    let mut loader = LazyLoader::new(&mut doc, Target::Element(scroller), options, (), &Features::detect());

    // Inside the viewport but outside the scroller's box
    let mut rects = HashMap::from([
        (scroller, DOMRect::from_xywh(0.0, 0.0, 300.0, 300.0)),
        (pic, DOMRect::from_xywh(0.0, 400.0, 100.0, 100.0)),
    ]);
    loader.update(&mut doc, viewport(), &rects, 0.0);
    assert_eq!(lifecycle(&doc, pic), Lifecycle::Unloaded);

    // Scrolled into the scroller
    rects.insert(pic, DOMRect::from_xywh(0.0, 250.0, 100.0, 100.0));
    loader.update(&mut doc, viewport(), &rects, 16.0);
    assert_eq!(lifecycle(&doc, pic), Lifecycle::Loaded);
}

#[test]
fn test_threshold_list_from_json() {
    let mut doc = parse(SCENARIO);
    let card = doc.get_element_by_id("card").unwrap();
    let options = LazyLoadOptions::from_json(r#"{ "threshold": [0.0, 0.5] }"#).unwrap();
    let mut loader = LazyLoader::new(&mut doc, Target::Document, options, Recorder::default(), &Features::detect());

    // 25% visible: below the 0.5 threshold, but any positive ratio loads
    let rects = HashMap::from([(card, DOMRect::from_xywh(0.0, 550.0, 100.0, 200.0))]);
    loader.update(&mut doc, viewport(), &rects, 0.0);

    assert_eq!(lifecycle(&doc, card), Lifecycle::Loaded);
    assert_eq!(loader.listener().of(StateCode::Call)[0].intersection_ratio, Some(0.25));
}

// ============================================================================
// RESOURCES AND CALLBACK STYLES
// ============================================================================

#[test]
fn test_broken_resource_is_removed() {
    let mut doc = parse(r#"<img id="pic" lazy-load data-lazy-src="missing.png" data-lazy-alt="alt text">"#);
    let pic = doc.get_element_by_id("pic").unwrap();
    LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), (), &Features::without_intersection_observer());

    assert!(doc.tree_mut().dispatch_resource_error(pic));

    let tree = doc.tree();
    assert!(!tree.has_attribute(pic, "src"));
    assert_eq!(tree.get_attribute(pic, "alt"), Some("alt text"));
    assert_eq!(lifecycle(&doc, pic), Lifecycle::Loaded);
}

#[test]
fn test_closure_callbacks() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let attrs = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&attrs);
    let callbacks = Callbacks::new().on_load(move |_, result| {
        sink.borrow_mut().push(result.attr.clone().unwrap_or_default());
    });

    let mut doc = parse(SCENARIO);
    LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), callbacks, &Features::without_intersection_observer());

    assert_eq!(*attrs.borrow(), vec!["src".to_string(), "class".to_string()]);
}

#[test]
fn test_borrowed_listener() {
    let mut rec = Recorder::default();
    let mut doc = parse(SCENARIO);
    LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), &mut rec, &Features::without_intersection_observer());

    assert_eq!(rec.count(StateCode::Load), 2);
}
