//! # Source URLs
//!
//! Reference links the backend returns alongside answers.
//!
//! `SourceSet` keeps them unique in first-seen order. It is never edited in
//! place from the outside: `merged()` returns a new set and the caller swaps
//! it in whole.
//!
//! The whitelist is the build-time list from `assets/sources.txt` (see
//! `build.rs`) plus any extras from config.

mod embedded {
    include!(concat!(env!("OUT_DIR"), "/embedded_sources.rs"));
}

/// URLs compiled into the binary from `assets/sources.txt`.
pub fn embedded_sources() -> &'static [&'static str] {
    embedded::EMBEDDED_SOURCES
}

/// Ordered set of source URLs with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    urls: Vec<String>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `urls`, keeping the first occurrence of each.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new().merged(urls)
    }

    /// Returns a new set with `urls` appended after the existing entries.
    /// Blank entries and entries already present are skipped.
    pub fn merged<I, S>(&self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.urls.clone();
        for url in urls {
            let url = url.as_ref().trim();
            if url.is_empty() || next.iter().any(|existing| existing == url) {
                continue;
            }
            next.push(url.to_string());
        }
        Self { urls: next }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url.trim())
    }
}

/// Filters a backend listing against the whitelist.
///
/// Entries not on the whitelist are dropped. If nothing survives, the whole
/// whitelist is returned instead. An empty whitelist means no filtering.
pub fn apply_whitelist(listing: &[String], whitelist: &[String]) -> Vec<String> {
    if whitelist.is_empty() {
        return SourceSet::from_urls(listing).urls;
    }

    let allowed = SourceSet::from_urls(whitelist);
    let kept = SourceSet::from_urls(listing.iter().filter(|url| allowed.contains(url)));

    if kept.is_empty() {
        allowed.urls
    } else {
        kept.urls
    }
}
