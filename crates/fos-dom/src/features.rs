//! Feature probe
//!
//! Host capabilities that scripts and embedders test for before use.

/// Runtime feature flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// `IntersectionObserver` is available
    pub intersection_observer: bool,
}

impl Features {
    /// Capabilities this engine provides
    pub fn detect() -> Self {
        Self {
            intersection_observer: true,
        }
    }

    /// A host without IntersectionObserver (older engines, restricted embeds)
    pub fn without_intersection_observer() -> Self {
        Self {
            intersection_observer: false,
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::detect()
    }
}
