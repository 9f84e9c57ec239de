//! Sipa HTML Parser
//!
//! HTML5 parser built on html5ever. Produces `sipa_dom` documents and
//! detached fragments for component templates.

mod parser;

pub use parser::HtmlParser;

use sipa_dom::{Document, DomError, Fragment};

/// Parse a full HTML document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// Parse template markup into a detached fragment
pub fn parse_fragment(markup: &str) -> Result<Fragment, HtmlError> {
    HtmlParser::new().parse_fragment(markup)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("could not read markup: {0}")]
    Read(#[from] std::io::Error),

    #[error("fragment parser produced no root element")]
    MissingRoot,

    #[error(transparent)]
    Dom(#[from] DomError),
}
