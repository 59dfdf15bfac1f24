//! DOMTokenList (classList)
//!
//! Token list view over an element's `class` attribute.

/// DOMTokenList for managing space-separated tokens (e.g., classList)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        list.add(&s.split_whitespace().collect::<Vec<_>>());
        list
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s). Empty tokens and tokens containing whitespace are skipped.
    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            if token.is_empty() || token.contains(char::is_whitespace) {
                continue;
            }
            if !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    /// Remove token(s)
    pub fn remove(&mut self, tokens: &[&str]) {
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
