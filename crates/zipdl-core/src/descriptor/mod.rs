//! File descriptors: the ordered `{name, url}` list a download is built from.
//!
//! Descriptors are validated up front (non-empty archive path, absolute
//! http/https URL) so a bad entry fails the download before any request is
//! issued or any file is created.

mod manifest;
mod sanitize;

pub use manifest::load_manifest;
pub use sanitize::normalize_entry_name;

use crate::error::ZipStreamError;
use serde::{Deserialize, Serialize};

/// One file to place in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path of the entry inside the archive.
    #[serde(alias = "filename")]
    pub name: String,
    /// Fetchable http/https URL of the file's content.
    #[serde(rename = "url")]
    pub source_location: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, source_location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_location: source_location.into(),
        }
    }

    /// Parses a CLI-style `NAME=URL` pair. The split happens at the first `=`,
    /// so query strings in the URL are preserved.
    pub fn parse_pair(s: &str) -> Result<Self, String> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=URL, got {s:?}"))?;
        if name.trim().is_empty() {
            return Err(format!("missing entry name in {s:?}"));
        }
        Ok(Self::new(name.trim(), url.trim()))
    }
}

/// Validates every descriptor and returns copies with normalized entry names.
/// The first invalid descriptor (by position) is reported.
pub fn prepare_descriptors(
    descriptors: Vec<FileDescriptor>,
) -> Result<Vec<FileDescriptor>, ZipStreamError> {
    descriptors
        .into_iter()
        .enumerate()
        .map(|(index, d)| prepare_one(index, d))
        .collect()
}

fn prepare_one(index: usize, d: FileDescriptor) -> Result<FileDescriptor, ZipStreamError> {
    let invalid = |reason: String| ZipStreamError::InvalidDescriptor { index, reason };

    let name = normalize_entry_name(&d.name);
    if name.is_empty() {
        return Err(invalid(format!("entry name {:?} is empty", d.name)));
    }
    if name != d.name {
        tracing::debug!(original = %d.name, normalized = %name, "normalized entry name");
    }

    let parsed = url::Url::parse(&d.source_location)
        .map_err(|e| invalid(format!("invalid URL {:?}: {}", d.source_location, e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported URL scheme {other:?}"))),
    }

    Ok(FileDescriptor {
        name,
        source_location: d.source_location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_splits_at_first_equals() {
        let d = FileDescriptor::parse_pair("a.txt=https://x/a?sig=abc").unwrap();
        assert_eq!(d.name, "a.txt");
        assert_eq!(d.source_location, "https://x/a?sig=abc");
    }

    #[test]
    fn parse_pair_rejects_missing_parts() {
        assert!(FileDescriptor::parse_pair("https://x/a").is_err());
        assert!(FileDescriptor::parse_pair("=https://x/a").is_err());
    }

    #[test]
    fn prepare_keeps_order_and_normalizes() {
        let out = prepare_descriptors(vec![
            FileDescriptor::new("b.txt", "https://x/b"),
            FileDescriptor::new("/dir\\a.txt", "http://x/a"),
        ])
        .unwrap();
        assert_eq!(out[0].name, "b.txt");
        assert_eq!(out[1].name, "dir/a.txt");
        assert_eq!(out[1].source_location, "http://x/a");
    }

    #[test]
    fn prepare_rejects_empty_name() {
        let err = prepare_descriptors(vec![
            FileDescriptor::new("ok.txt", "https://x/ok"),
            FileDescriptor::new(" / ", "https://x/a"),
        ])
        .unwrap_err();
        assert!(matches!(err, ZipStreamError::InvalidDescriptor { index: 1, .. }));
    }

    #[test]
    fn prepare_rejects_non_http_urls() {
        let err = prepare_descriptors(vec![FileDescriptor::new("a", "ftp://x/a")]).unwrap_err();
        assert!(matches!(err, ZipStreamError::InvalidDescriptor { index: 0, .. }));
        let err = prepare_descriptors(vec![FileDescriptor::new("a", "not a url")]).unwrap_err();
        assert!(matches!(err, ZipStreamError::InvalidDescriptor { index: 0, .. }));
    }

    #[test]
    fn prepare_empty_list_is_ok() {
        assert!(prepare_descriptors(Vec::new()).unwrap().is_empty());
    }
}
