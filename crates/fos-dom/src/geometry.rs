//! Geometry APIs
//!
//! DOMRect and the CSS-margin-shaped root margin used by observers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomError;

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Get intersection rect.
    ///
    /// Rects sharing only an edge intersect with zero area, as they do for
    /// IntersectionObserver.
    pub fn intersection(&self, other: &DOMRect) -> Option<DOMRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < x || bottom < y {
            return None;
        }
        Some(DOMRect::from_xywh(x, y, right - x, bottom - y))
    }

    /// Grow (or shrink, for negative lengths) the rect by a margin
    pub fn expand(&self, margin: &RootMargin) -> DOMRect {
        let top = margin.top.resolve(self.height);
        let right = margin.right.resolve(self.width);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);

        DOMRect::from_xywh(
            self.x - left,
            self.y - top,
            (self.width + left + right).max(0.0),
            (self.height + top + bottom).max(0.0),
        )
    }
}

/// Single margin length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl MarginLength {
    /// Resolve against the root dimension on the same axis
    pub fn resolve(&self, basis: f64) -> f64 {
        match *self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl Default for MarginLength {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{}px", v),
            Self::Percent(v) => write!(f, "{}%", v),
        }
    }
}

impl FromStr for MarginLength {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomError::InvalidRootMargin(s.to_string());
        let (number, unit): (&str, fn(f64) -> Self) = if let Some(n) = s.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Self::Percent)
        } else if s == "0" {
            (s, Self::Px)
        } else {
            return Err(invalid());
        };
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(unit(value))
    }
}

/// Root margin, in CSS margin order (top, right, bottom, left)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    /// Same length on all four sides
    pub fn uniform(length: MarginLength) -> Self {
        Self { top: length, right: length, bottom: length, left: length }
    }

    /// Parse 1-4 space separated lengths (`"0px"`, `"10px 20%"`)
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let lengths = input
            .split_whitespace()
            .map(|part| part.parse::<MarginLength>().map_err(|_| DomError::InvalidRootMargin(input.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        match lengths.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [v, h] => Ok(Self { top: *v, right: *h, bottom: *v, left: *h }),
            [t, h, b] => Ok(Self { top: *t, right: *h, bottom: *b, left: *h }),
            [t, r, b, l] => Ok(Self { top: *t, right: *r, bottom: *b, left: *l }),
            _ => Err(DomError::InvalidRootMargin(input.to_string())),
        }
    }
}

impl FromStr for RootMargin {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RootMargin {
    type Error = DomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
