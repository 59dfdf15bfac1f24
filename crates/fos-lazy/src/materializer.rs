//! Attribute materialization
//!
//! Moves `data-lazy-*` values onto the attributes they stand in for, once
//! per element. The scan over staging attributes is pure; `materialize`
//! applies the result and flips the lifecycle markers.

use fos_dom::{DomTree, ElementData, IntersectionObserver, IntersectionObserverEntry, NodeId};

use crate::{LOADED_ATTR, LazyLoadListener, LazyLoadState, UNLOADED_ATTR, make_result};

/// Prefix of staging attributes (`data-lazy-src` stages `src`)
pub const STAGING_PREFIX: &str = "data-lazy-";

/// Attributes that reference a fetchable resource
pub const RESOURCE_ATTRIBUTES: [&str; 3] = ["src", "srcset", "poster"];

/// How a staged value lands on its real attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAttribute {
    /// Tokens are added to the class list
    Class,
    /// Appended to the inline style string
    Style,
    /// Set, with a one-shot error handler that removes it again
    Resource(String),
    /// Set as-is
    Other(String),
}

impl TargetAttribute {
    pub fn classify(name: &str) -> Self {
        match name {
            "class" => Self::Class,
            "style" => Self::Style,
            _ if RESOURCE_ATTRIBUTES.contains(&name) => Self::Resource(name.to_string()),
            _ => Self::Other(name.to_string()),
        }
    }

    /// Real attribute name
    pub fn name(&self) -> &str {
        match self {
            Self::Class => "class",
            Self::Style => "style",
            Self::Resource(name) | Self::Other(name) => name,
        }
    }
}

/// One staging attribute found on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttribute {
    /// Staging attribute name, e.g. `data-lazy-src`
    pub name: String,
    pub target: TargetAttribute,
    pub value: String,
}

/// Staging attributes of an element, in attribute order.
///
/// Names that do not follow `data-lazy-<attribute>` are skipped.
pub fn staging_attributes(elem: &ElementData) -> Vec<StagedAttribute> {
    elem.attrs
        .iter()
        .filter_map(|attr| {
            let target = attr.name.strip_prefix(STAGING_PREFIX)?;
            if target.is_empty() {
                return None;
            }
            Some(StagedAttribute {
                name: attr.name.clone(),
                target: TargetAttribute::classify(target),
                value: attr.value.clone(),
            })
        })
        .collect()
}

fn apply(elem: &mut ElementData, staged: &StagedAttribute, resources: &mut Vec<String>) {
    match &staged.target {
        TargetAttribute::Class => {
            let tokens: Vec<&str> = staged.value.split_whitespace().collect();
            elem.add_classes(&tokens);
        }
        TargetAttribute::Style => {
            let style = format!("{}{}", elem.get_attr("style").unwrap_or(""), staged.value);
            elem.set_attr("style", &style);
        }
        TargetAttribute::Resource(name) => {
            resources.push(name.clone());
            let installed = resources.clone();
            elem.set_onerror(Box::new(move |e: &mut ElementData| {
                for name in &installed {
                    e.remove_attr(name);
                }
            }));
            elem.set_attr(name, &staged.value);
        }
        TargetAttribute::Other(name) => elem.set_attr(name, &staged.value),
    }
}

/// Apply every staged attribute of `element` and mark it loaded.
///
/// Fires `load` once per applied attribute. Already-loaded elements and
/// non-elements are left alone. When `is_disposable` is set the element is
/// removed from `observer` after all side effects. Returns whether anything
/// was done.
pub fn materialize<L: LazyLoadListener + ?Sized>(
    tree: &mut DomTree,
    element: NodeId,
    entry: Option<&IntersectionObserverEntry>,
    observer: Option<&mut IntersectionObserver>,
    is_disposable: bool,
    listener: &mut L,
) -> bool {
    let Some(elem) = tree.element_mut(element) else {
        tracing::warn!("Skipping lazy-load on non-element {}", element);
        return false;
    };
    if elem.has_attr(LOADED_ATTR) {
        return false;
    }

    let staged = staging_attributes(elem);
    let mut resources = Vec::new();
    for attr in &staged {
        apply(elem, attr, &mut resources);
        tracing::trace!("{}: {} -> {}", element, attr.name, attr.target.name());
        listener.load(
            &LazyLoadState::LOAD,
            &make_result(Some(element), Some(attr.target.name()), entry),
        );
    }

    elem.remove_attr(UNLOADED_ATTR);
    elem.set_attr(LOADED_ATTR, "");
    tracing::debug!("Loaded {} ({} staged attributes)", element, staged.len());

    if is_disposable {
        if let Some(observer) = observer {
            observer.unobserve(element);
        }
    }
    true
}
