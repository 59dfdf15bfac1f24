//! fOS Lazy - deferred activation of DOM elements
//!
//! Elements marked with `lazy-load` keep their real attributes in
//! `data-lazy-*` staging attributes until they scroll into view. A
//! [`LazyLoader`] watches them with an IntersectionObserver and, on first
//! visibility, moves every staged value onto its real attribute exactly once.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use fos_dom::{DOMRect, Document, Features};
//! use fos_lazy::{LazyLoadOptions, LazyLoader, Target};
//!
//! let mut doc = Document::default();
//! let img = doc.tree.create_element("img");
//! doc.tree.append_child(doc.body(), img);
//! doc.tree.set_attribute(img, "lazy-load", "").unwrap();
//! doc.tree.set_attribute(img, "data-lazy-src", "photo.png").unwrap();
//!
//! let mut loader = LazyLoader::new(&mut doc, Target::Document, LazyLoadOptions::default(), (), &Features::detect());
//!
//! let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);
//! let rects = HashMap::from([(img, DOMRect::from_xywh(0.0, 100.0, 200.0, 200.0))]);
//! loader.update(&mut doc, viewport, &rects, 0.0);
//!
//! assert_eq!(doc.tree.get_attribute(img, "src"), Some("photo.png"));
//! ```

mod listener;
mod loader;
mod materializer;
mod options;
mod selector;
mod state;

pub use listener::{Callbacks, LazyLoadListener};
pub use loader::LazyLoader;
pub use materializer::{
    RESOURCE_ATTRIBUTES, STAGING_PREFIX, StagedAttribute, TargetAttribute, materialize, staging_attributes,
};
pub use options::{DEFAULT_THRESHOLD, LazyLoadOptions};
pub use selector::{ResolveError, Target, eligible_selector, resolve};
pub use state::{LazyLoadResult, LazyLoadState, Lifecycle, StateCode, make_result};

/// Marks an element as eligible for lazy activation
pub const MARKER_ATTR: &str = "lazy-load";
/// Set when an element is registered with the observer
pub const UNLOADED_ATTR: &str = "lazy-load-unloaded";
/// Set once staged attributes have been applied
pub const LOADED_ATTR: &str = "lazy-load-loaded";
