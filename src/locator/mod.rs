//! Locator derivation
//!
//! Two pure tree walks over a [`DomNode`]: [`css_path`] and [`xpath`].
//! [`Locator`] bundles both and is the JSON payload sent for every pick.

pub mod css;
pub mod resolve;
pub mod xpath;

pub use css::css_path;
pub use resolve::{LocatedElement, locate_picked, resolve_css, resolve_xpath};
pub use xpath::xpath;

use crate::dom::DomNode;
use crate::error::{InspectorError, Result};
use serde::{Deserialize, Serialize};

/// The two locators derived for one picked element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// CSS selector path, segments joined by `" > "`
    pub css: String,

    /// XPath expression
    pub xpath: String,
}

impl Locator {
    /// Create a locator from already derived strings
    pub fn new(css: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            xpath: xpath.into(),
        }
    }

    /// Derive both locators for `element`
    pub fn derive<N: DomNode>(element: &N) -> Result<Self> {
        let css = css_path(element);
        let xpath = xpath(element).ok_or_else(|| InspectorError::XPathUnresolved {
            tag: element.tag_name().to_lowercase(),
        })?;
        Ok(Self { css, xpath })
    }

    /// Wire form: a single JSON object with `css` and `xpath`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
