//! Element Query
//!
//! Compound selectors for `querySelectorAll`: tag, `*`, `#id`, `.class`,
//! `[attr]`, `[attr=value]` and `:not(...)`, comma-separated into groups.
//! Combinators are not supported.

use crate::{DomError, ElementData, NodeId};

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
    Not(Box<SimpleSelector>),
}

impl SimpleSelector {
    /// Check a single element against this selector
    pub fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => elem.tag.eq_ignore_ascii_case(tag),
            Self::Id(id) => elem.get_attr("id") == Some(id.as_str()),
            Self::Class(class) => elem.class_list().contains(class),
            Self::Attribute { name, value: None } => elem.has_attr(name),
            Self::Attribute { name, value: Some(v) } => elem.get_attr(name) == Some(v.as_str()),
            Self::Not(inner) => !inner.matches(elem),
        }
    }
}

/// Parsed selector group
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Vec<SimpleSelector>>,
}

impl Selector {
    /// Parse a selector group such as `[lazy-load]:not([lazy-load-loaded])`
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let alternatives = input
            .split(',')
            .map(|part| parse_compound(part.trim()).map_err(|_| DomError::InvalidSelector(input.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Selector made of a single compound, e.g. `[a]:not([b])`
    pub fn compound(parts: Vec<SimpleSelector>) -> Self {
        Self { alternatives: vec![parts] }
    }

    /// Check if the element matches any alternative
    pub fn matches(&self, elem: &ElementData) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.iter().all(|simple| simple.matches(elem)))
    }
}

impl std::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_compound(input: &str) -> Result<Vec<SimpleSelector>, DomError> {
    if input.is_empty() {
        return Err(DomError::InvalidSelector(input.to_string()));
    }
    let mut parts = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let (simple, tail) = parse_simple(rest)?;
        parts.push(simple);
        rest = tail;
    }
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    input.split_at(end)
}

fn parse_simple(input: &str) -> Result<(SimpleSelector, &str), DomError> {
    let invalid = || DomError::InvalidSelector(input.to_string());
    let first = input.chars().next().ok_or_else(invalid)?;

    match first {
        '*' => Ok((SimpleSelector::Universal, &input[1..])),
        '#' | '.' => {
            let (name, tail) = take_ident(&input[1..]);
            if name.is_empty() {
                return Err(invalid());
            }
            let simple = if first == '#' {
                SimpleSelector::Id(name.to_string())
            } else {
                SimpleSelector::Class(name.to_string())
            };
            Ok((simple, tail))
        }
        '[' => {
            let end = input.find(']').ok_or_else(invalid)?;
            let inner = input[1..end].trim();
            let (name, value) = match inner.split_once('=') {
                Some((n, v)) => {
                    let v = v.trim().trim_matches(|c: char| c == '"' || c == '\'');
                    (n.trim(), Some(v.to_string()))
                }
                None => (inner, None),
            };
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(invalid());
            }
            let simple = SimpleSelector::Attribute {
                name: name.to_ascii_lowercase(),
                value,
            };
            Ok((simple, &input[end + 1..]))
        }
        ':' => {
            let body = input.strip_prefix(":not(").ok_or_else(invalid)?;
            let end = body.find(')').ok_or_else(invalid)?;
            let (inner, leftover) = parse_simple(body[..end].trim())?;
            if !leftover.trim().is_empty() {
                return Err(invalid());
            }
            Ok((SimpleSelector::Not(Box::new(inner)), &body[end + 1..]))
        }
        c if is_ident_char(c) => {
            let (tag, tail) = take_ident(input);
            Ok((SimpleSelector::Tag(tag.to_ascii_lowercase()), tail))
        }
        _ => Err(invalid()),
    }
}

/// Static node list, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<NodeId>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl FromIterator<NodeId> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl IntoIterator for NodeList {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
