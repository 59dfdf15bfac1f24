//! Lazy loader
//!
//! Picks the observation strategy once, at construction:
//!
//! - With IntersectionObserver, managed elements are queued and registered
//!   on the next host turn (`advance`). Visibility entries then drive
//!   materialization and `call` notifications.
//! - Without it, `error(NOTSUPPORT)` fires and every element is loaded
//!   immediately, so content never stays hidden.

use std::collections::HashMap;

use fos_dom::{DOMRect, Document, Features, IntersectionObserver, IntersectionObserverEntry, NodeId, NodeList};

use crate::selector::{self, Target};
use crate::{LOADED_ATTR, LazyLoadListener, LazyLoadOptions, LazyLoadResult, LazyLoadState, UNLOADED_ATTR};
use crate::{make_result, materialize};

/// Defers loading of marked elements until they become visible
#[derive(Debug)]
pub struct LazyLoader<L: LazyLoadListener = ()> {
    options: LazyLoadOptions,
    listener: L,
    managed: NodeList,
    /// `None` on the eager path, or when nothing was resolved
    observer: Option<IntersectionObserver>,
    pending: Vec<NodeId>,
}

impl<L: LazyLoadListener> LazyLoader<L> {
    /// Resolve `target` and start managing it.
    ///
    /// Never fails: problems are reported through `listener.error` and the
    /// loader continues with whatever it could resolve.
    pub fn new(
        document: &mut Document,
        target: Target,
        options: LazyLoadOptions,
        listener: L,
        features: &Features,
    ) -> Self {
        let mut loader = Self {
            options,
            listener,
            managed: NodeList::new(),
            observer: None,
            pending: Vec::new(),
        };

        match selector::resolve(document, &target) {
            Ok(elements) => loader.managed = elements,
            Err(err) => {
                tracing::warn!("Lazy loader has nothing to manage: {}", err);
                loader.listener.error(&LazyLoadState::ERROR_ELEMENT, &LazyLoadResult::empty());
                return loader;
            }
        }

        if features.intersection_observer {
            loader.start_observing();
        } else {
            loader.load_all(document);
        }
        loader
    }

    fn start_observing(&mut self) {
        let observer = IntersectionObserver::new(self.options.observer_options());
        tracing::debug!(
            "IntersectionObserver {} managing {} elements",
            observer.id(),
            self.managed.length()
        );
        self.observer = Some(observer);
        self.pending = self.managed.iter().collect();
    }

    fn load_all(&mut self, document: &mut Document) {
        tracing::debug!("IntersectionObserver unavailable, loading {} elements now", self.managed.length());
        self.listener.error(&LazyLoadState::NOT_SUPPORT, &LazyLoadResult::empty());

        for element in self.managed.iter() {
            materialize(document.tree_mut(), element, None, None, self.options.is_disposable, &mut self.listener);
        }
    }

    /// Run queued registrations: mark each element unloaded and observe it.
    ///
    /// Returns how many elements were registered.
    pub fn advance(&mut self, document: &mut Document) -> usize {
        let Some(observer) = self.observer.as_mut() else {
            return 0;
        };

        let mut registered = 0;
        for element in std::mem::take(&mut self.pending) {
            let tree = document.tree_mut();
            if tree.has_attribute(element, LOADED_ATTR) {
                tracing::trace!("{} already loaded, not registering", element);
                continue;
            }
            if let Err(err) = tree.set_attribute(element, UNLOADED_ATTR, "") {
                tracing::warn!("Cannot register {}: {}", element, err);
                continue;
            }
            observer.observe(element);
            registered += 1;
        }
        registered
    }

    /// One frame: registrations, intersection check, then dispatch.
    pub fn update(
        &mut self,
        document: &mut Document,
        viewport: DOMRect,
        element_rects: &HashMap<NodeId, DOMRect>,
        time: f64,
    ) {
        self.advance(document);

        let entries = match self.observer.as_mut() {
            Some(observer) => {
                observer.check_intersections(viewport, element_rects, time);
                observer.take_entries()
            }
            None => return,
        };
        self.handle_entries(document, &entries);
    }

    /// Observer callback: load visible targets, report every entry.
    ///
    /// Entries for targets the observer no longer watches are dropped.
    pub fn handle_entries(&mut self, document: &mut Document, entries: &[IntersectionObserverEntry]) {
        for entry in entries {
            let Some(observer) = self.observer.as_mut() else {
                return;
            };
            if !observer.is_observing(entry.target) {
                tracing::trace!("Dropping entry for unobserved {}", entry.target);
                continue;
            }

            if entry.intersection_ratio > 0.0 {
                materialize(
                    document.tree_mut(),
                    entry.target,
                    Some(entry),
                    Some(observer),
                    self.options.is_disposable,
                    &mut self.listener,
                );
            }

            self.listener
                .call(&LazyLoadState::CALL, &make_result(Some(entry.target), None, Some(entry)));
        }
    }

    /// Stop observing everything and drop queued registrations
    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
        self.pending.clear();
    }

    /// Elements resolved at construction
    pub fn managed(&self) -> &NodeList {
        &self.managed
    }

    pub fn options(&self) -> &LazyLoadOptions {
        &self.options
    }

    /// Whether the IntersectionObserver path is in use
    pub fn is_native(&self) -> bool {
        self.observer.is_some()
    }

    /// Registrations waiting for the next `advance`
    pub fn pending_registrations(&self) -> &[NodeId] {
        &self.pending
    }

    pub fn observer(&self) -> Option<&IntersectionObserver> {
        self.observer.as_ref()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }
}
