//! Build-time list of assets that must be present after install.
//!
//! Entries are bumped (usually with a `?v=` query suffix) whenever the
//! underlying content changes, so a new install re-fetches them and the
//! previous generation's store becomes garbage at the next activation.

use url::Url;

use crate::{Error, Request};

/// Ordered, de-duplicated list of resolved asset URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: Vec<Url>,
}

impl AssetManifest {
    /// Resolve raw entries against the site origin.
    ///
    /// Root-relative entries are joined onto `origin`; absolute entries are
    /// kept as-is. Later duplicates are dropped.
    pub fn resolve<S: AsRef<str>>(origin: &Url, raw: &[S]) -> Result<Self, Error> {
        let mut entries: Vec<Url> = Vec::with_capacity(raw.len());
        for entry in raw {
            let request = Request::parse("GET", entry.as_ref(), Some(origin))?;
            if !crate::uri::is_http(request.url()) {
                return Err(Error::InvalidUrl(format!("manifest entry is not http(s): {}", entry.as_ref())));
            }
            if !entries.contains(request.url()) {
                entries.push(request.url().clone());
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self) -> &[Url] {
        &self.entries
    }

    /// GET requests for every entry, in manifest order.
    pub fn requests(&self) -> impl Iterator<Item = Request> + '_ {
        self.entries.iter().cloned().map(Request::get)
    }
}
