//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, producing `fos-dom` documents.

mod parser;

pub use fos_dom::Document;
pub use parser::HtmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),
}
