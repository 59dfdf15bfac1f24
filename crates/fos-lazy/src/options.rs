//! Construction-time options

use fos_dom::{IntersectionObserverOptions, NodeId, RootMargin};
use serde::{Deserialize, Deserializer};

/// Ratio at which elements are considered visible by default
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// Lazy-load options. Immutable once handed to a loader.
///
/// Deserializes from the camelCase keys scripts use:
///
/// ```
/// use fos_lazy::LazyLoadOptions;
///
/// let options = LazyLoadOptions::from_json(r#"{ "rootMargin": "200px", "threshold": 0.5 }"#).unwrap();
/// assert_eq!(options.threshold, vec![0.5]);
/// assert!(options.is_disposable);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LazyLoadOptions {
    /// Visibility boundary element (None = viewport)
    pub root: Option<NodeId>,
    /// Grows or shrinks the boundary before ratios are computed
    pub root_margin: RootMargin,
    /// Ratios at which visibility is evaluated
    #[serde(deserialize_with = "one_or_many")]
    pub threshold: Vec<f64>,
    /// Stop observing an element once it has loaded
    pub is_disposable: bool,
}

impl LazyLoadOptions {
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn with_threshold(mut self, threshold: impl Into<Vec<f64>>) -> Self {
        self.threshold = threshold.into();
        self
    }

    pub fn with_disposable(mut self, is_disposable: bool) -> Self {
        self.is_disposable = is_disposable;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Observer configuration derived from these options
    pub fn observer_options(&self) -> IntersectionObserverOptions {
        IntersectionObserverOptions {
            root: self.root,
            root_margin: self.root_margin,
            threshold: self.threshold.clone(),
        }
    }
}

impl Default for LazyLoadOptions {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: RootMargin::default(),
            threshold: vec![DEFAULT_THRESHOLD],
            is_disposable: true,
        }
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(f64),
        Many(Vec<f64>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(t) => vec![t],
        OneOrMany::Many(ts) => ts,
    })
}
