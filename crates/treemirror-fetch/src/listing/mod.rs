//! Listing entries and the provider boundary.
//!
//! A provider turns a fetched listing document into an ordered sequence of
//! [`MarkedEntry`] values: a structural marker plus the reference carried by
//! the element right after it. Classification into [`ListingEntry`] happens
//! here, so no markup library is needed outside the provider.

#[cfg(feature = "html")]
pub mod html;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};
use crate::remote::RemoteRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// An entry as it appears in the listing, before classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedEntry {
    pub marker: String,
    pub reference: Option<String>,
}

impl MarkedEntry {
    pub fn new(marker: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            reference: Some(reference.into()),
        }
    }
}

/// A classified child of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub kind: EntryKind,
    pub reference: RemoteRef,
}

/// The marker values that identify directories and files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub directory: String,
    pub file: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            directory: "octicon-file-directory-fill".to_string(),
            file: "octicon-file".to_string(),
        }
    }
}

impl Markers {
    pub fn kind_of(&self, marker: &str) -> Option<EntryKind> {
        if marker == self.directory {
            Some(EntryKind::Directory)
        } else if marker == self.file {
            Some(EntryKind::File)
        } else {
            None
        }
    }

    /// Classify `entry`, resolving its reference against `parent`'s base.
    pub fn classify(&self, parent: &RemoteRef, entry: MarkedEntry) -> Result<ListingEntry> {
        let kind = self
            .kind_of(&entry.marker)
            .ok_or_else(|| FetchError::UnknownEntryKind {
                marker: entry.marker.clone(),
            })?;

        let reference = entry
            .reference
            .ok_or(FetchError::MissingReference {
                marker: entry.marker,
            })?;

        Ok(ListingEntry {
            kind,
            reference: parent.with_path(reference),
        })
    }
}

/// Parses a fetched listing document into marked entries, in document order.
pub trait ListingProvider: Send + Sync + 'static {
    fn parse(&self, document: &str) -> Vec<MarkedEntry>;
}

impl<P: ListingProvider + ?Sized> ListingProvider for Box<P> {
    fn parse(&self, document: &str) -> Vec<MarkedEntry> { (**self).parse(document) }
}
