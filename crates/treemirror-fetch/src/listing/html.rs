use scraper::{ElementRef, Html, Selector};

use super::{ListingProvider, MarkedEntry};
use crate::error::{FetchError, Result};

/// Marker elements inside the listing table of a Gitea-style tree view.
pub const DEFAULT_SELECTOR: &str = "tbody [class*=\"octicon-file\"]";

/// Class prefix identifying which class of a marker element is the marker.
pub const DEFAULT_MARKER_PREFIX: &str = "octicon-";

/// Listing provider for HTML tree pages.
///
/// Every element matching the selector is a marker; its marker value is the
/// first class starting with the marker prefix, and its reference is the
/// `href` of the next sibling element.
#[derive(Debug)]
pub struct HtmlListing {
    selector: Selector,
    marker_prefix: String,
}

impl HtmlListing {
    pub fn new() -> Result<Self> { Self::with_selector(DEFAULT_SELECTOR, DEFAULT_MARKER_PREFIX) }

    pub fn with_selector(selector: &str, marker_prefix: impl Into<String>) -> Result<Self> {
        let parsed = Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            selector: parsed,
            marker_prefix: marker_prefix.into(),
        })
    }

    fn marker_of(&self, element: &ElementRef<'_>) -> String {
        let value = element.value();
        value
            .classes()
            .find(|c| c.starts_with(&self.marker_prefix))
            .or_else(|| value.attr("class"))
            .unwrap_or_default()
            .to_string()
    }
}

impl ListingProvider for HtmlListing {
    fn parse(&self, document: &str) -> Vec<MarkedEntry> {
        let html = Html::parse_document(document);
        html.select(&self.selector)
            .map(|element| {
                let reference = element
                    .next_siblings()
                    .find_map(ElementRef::wrap)
                    .and_then(|sibling| sibling.value().attr("href"))
                    .map(str::to_string);
                MarkedEntry {
                    marker: self.marker_of(&element),
                    reference,
                }
            })
            .collect()
    }
}
