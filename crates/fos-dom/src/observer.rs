//! Intersection Observer API
//!
//! Observe element visibility relative to the viewport or a root element.
//! Layout hands in element rects each frame; the observer turns them into
//! entries whenever a target crosses a threshold.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{DOMRect, NodeId, RootMargin};

/// Intersection observer options
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverOptions {
    /// Root element (None = viewport)
    pub root: Option<NodeId>,
    /// Root margin
    pub root_margin: RootMargin,
    /// Thresholds to trigger callback
    pub threshold: Vec<f64>,
}

impl Default for IntersectionObserverOptions {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: RootMargin::default(),
            threshold: vec![0.0],
        }
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverEntry {
    pub target: NodeId,
    pub bounding_client_rect: DOMRect,
    pub intersection_rect: DOMRect,
    pub root_bounds: Option<DOMRect>,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
    pub time: f64,
}

/// Last reported state of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reported {
    threshold_index: usize,
    is_intersecting: bool,
}

/// A live registration; `reported` is `None` until the first evaluation
#[derive(Debug, Clone, Copy)]
struct Registration {
    seq: u64,
    reported: Option<Reported>,
}

/// Intersection observer
#[derive(Debug)]
pub struct IntersectionObserver {
    id: u64,
    options: IntersectionObserverOptions,
    observed: HashMap<NodeId, Registration>,
    // Registration order. Slots whose seq no longer matches `observed` are stale.
    order: Vec<(NodeId, u64)>,
    next_seq: u64,
    pending_entries: Vec<(u64, IntersectionObserverEntry)>,
}

static NEXT_INTERSECTION_ID: AtomicU64 = AtomicU64::new(1);

impl IntersectionObserver {
    pub fn new(mut options: IntersectionObserverOptions) -> Self {
        options.threshold = sanitize_thresholds(&options.threshold);
        Self {
            id: NEXT_INTERSECTION_ID.fetch_add(1, Ordering::Relaxed),
            options,
            observed: HashMap::new(),
            order: Vec::new(),
            next_seq: 0,
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.options.root
    }

    pub fn root_margin(&self) -> &RootMargin {
        &self.options.root_margin
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.options.threshold
    }

    /// Observe an element. Observing twice is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        if self.observed.contains_key(&target) {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.observed.insert(target, Registration { seq, reported: None });
        self.order.push((target, seq));
    }

    /// Stop observing. Entries queued for `target` are dropped.
    pub fn unobserve(&mut self, target: NodeId) {
        if self.observed.remove(&target).is_some() && self.order.len() > 2 * self.observed.len() + 64 {
            self.compact();
        }
    }

    /// Disconnect all
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.order.clear();
        self.pending_entries.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    fn is_live(&self, target: NodeId, seq: u64) -> bool {
        self.observed.get(&target).is_some_and(|r| r.seq == seq)
    }

    fn compact(&mut self) {
        let observed = &self.observed;
        self.order
            .retain(|(id, seq)| observed.get(id).is_some_and(|r| r.seq == *seq));
    }

    /// Index of the first threshold above `ratio`
    fn threshold_index(&self, ratio: f64) -> usize {
        self.options.threshold.iter().take_while(|&&t| t <= ratio).count()
    }

    /// Check intersections against the current layout
    pub fn check_intersections(
        &mut self,
        viewport: DOMRect,
        element_rects: &HashMap<NodeId, DOMRect>,
        time: f64,
    ) {
        let root_rect = match self.options.root {
            Some(root) => match element_rects.get(&root) {
                Some(rect) => *rect,
                None => {
                    tracing::trace!("Observer {} root {} has no layout box", self.id, root);
                    return;
                }
            },
            None => viewport,
        };
        let root_bounds = root_rect.expand(&self.options.root_margin);

        self.compact();
        for index in 0..self.order.len() {
            let (node, seq) = self.order[index];
            let Some(rect) = element_rects.get(&node) else {
                continue;
            };

            let intersection = rect.intersection(&root_bounds);
            let is_intersecting = intersection.is_some();
            let ratio = match intersection {
                Some(hit) if rect.area() > 0.0 => hit.area() / rect.area(),
                Some(_) => 1.0,
                None => 0.0,
            };

            let now = Reported {
                threshold_index: self.threshold_index(ratio),
                is_intersecting,
            };
            let Some(registration) = self.observed.get_mut(&node) else {
                continue;
            };
            if registration.reported == Some(now) {
                continue;
            }
            registration.reported = Some(now);

            self.pending_entries.push((
                seq,
                IntersectionObserverEntry {
                    target: node,
                    bounding_client_rect: *rect,
                    intersection_rect: intersection.unwrap_or_default(),
                    root_bounds: Some(root_bounds),
                    intersection_ratio: ratio,
                    is_intersecting,
                    time,
                },
            ));
        }
    }

    /// Take pending entries
    pub fn take_entries(&mut self) -> Vec<IntersectionObserverEntry> {
        let pending = std::mem::take(&mut self.pending_entries);
        pending
            .into_iter()
            .filter(|(seq, entry)| self.is_live(entry.target, *seq))
            .map(|(_, entry)| entry)
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_entries
            .iter()
            .any(|(seq, entry)| self.is_live(entry.target, *seq))
    }
}

fn sanitize_thresholds(raw: &[f64]) -> Vec<f64> {
    let mut thresholds: Vec<f64> = raw
        .iter()
        .filter(|t| t.is_finite())
        .map(|t| t.clamp(0.0, 1.0))
        .collect();
    if thresholds.len() != raw.len() || raw.iter().any(|t| !(0.0..=1.0).contains(t)) {
        tracing::warn!("Intersection thresholds {:?} sanitized to [0, 1]", raw);
    }
    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup();
    if thresholds.is_empty() {
        thresholds.push(0.0);
    }
    thresholds
}
