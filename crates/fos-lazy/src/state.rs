//! Outcome states and callback payloads

use fos_dom::{ElementData, IntersectionObserverEntry, NodeId};
use serde::{Serialize, Serializer};

use crate::{LOADED_ATTR, UNLOADED_ATTR};

/// Outcome codes reported to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateCode {
    /// IntersectionObserver is missing; everything was loaded eagerly
    NotSupport = 0,
    /// No manageable elements were resolved
    ErrorElement = 1,
    /// One staged attribute was applied
    Load = 2,
    /// One visibility evaluation happened
    Call = 3,
}

impl StateCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Upper-case name (`NOTSUPPORT`, `ERRORELEMENT`, `LOAD`, `CALL`)
    pub fn name(self) -> &'static str {
        match self {
            Self::NotSupport => "NOTSUPPORT",
            Self::ErrorElement => "ERRORELEMENT",
            Self::Load => "LOAD",
            Self::Call => "CALL",
        }
    }
}

impl Serialize for StateCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Code plus human readable message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LazyLoadState {
    pub code: StateCode,
    pub msg: &'static str,
}

impl LazyLoadState {
    pub const NOT_SUPPORT: Self = Self {
        code: StateCode::NotSupport,
        msg: "IntersectionObserver not supported",
    };
    pub const ERROR_ELEMENT: Self = Self {
        code: StateCode::ErrorElement,
        msg: "no lazy-load elements",
    };
    pub const LOAD: Self = Self {
        code: StateCode::Load,
        msg: "lazy-load attribute loaded",
    };
    pub const CALL: Self = Self {
        code: StateCode::Call,
        msg: "lazy-load visibility changed",
    };

    /// Fixed state for a code
    pub const fn of(code: StateCode) -> Self {
        match code {
            StateCode::NotSupport => Self::NOT_SUPPORT,
            StateCode::ErrorElement => Self::ERROR_ELEMENT,
            StateCode::Load => Self::LOAD,
            StateCode::Call => Self::CALL,
        }
    }
}

/// Payload handed to listeners alongside a state.
///
/// The intersection fields are `None` when no visibility event is involved
/// (eager loading, setup errors).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyLoadResult {
    pub element: Option<NodeId>,
    pub attr: Option<String>,
    pub is_intersecting: Option<bool>,
    pub intersection_ratio: Option<f64>,
}

impl LazyLoadResult {
    /// Result with no context, used for setup errors
    pub fn empty() -> Self {
        Self::default()
    }
}

pub fn make_result(
    element: Option<NodeId>,
    attr: Option<&str>,
    entry: Option<&IntersectionObserverEntry>,
) -> LazyLoadResult {
    LazyLoadResult {
        element,
        attr: attr.map(str::to_string),
        is_intersecting: entry.map(|e| e.is_intersecting),
        intersection_ratio: entry.map(|e| e.intersection_ratio),
    }
}

/// Where an element is in its one-way lifecycle, read from its markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Managed but not yet registered with an observer
    Unregistered,
    /// Registered, waiting to become visible
    Unloaded,
    /// Staged attributes applied
    Loaded,
}

impl Lifecycle {
    pub fn of(elem: &ElementData) -> Self {
        if elem.has_attr(LOADED_ATTR) {
            Self::Loaded
        } else if elem.has_attr(UNLOADED_ATTR) {
            Self::Unloaded
        } else {
            Self::Unregistered
        }
    }
}
