//! On-disk cache of generated WSDL documents
//!
//! One file per `(service, endpoint)`: `{cache_dir}/{name}.{sha256(endpoint)}.wsdl`.
//! Writes land in a temporary file in the same directory and are renamed
//! into place, so readers see either the old or the new document. Concurrent
//! writers are not coordinated; the last rename wins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::Result;

/// A single cached document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsdlCache {
    path: PathBuf,
    debug: bool,
}

impl WsdlCache {
    /// Cache entry for `name` served at `endpoint` (`None` for definition-only documents).
    ///
    /// In debug mode an entry is only fresh while it is newer than the
    /// resource it was generated from.
    pub fn new(cache_dir: &Path, name: &str, endpoint: Option<&str>, debug: bool) -> Self {
        Self { path: cache_dir.join(cache_file_name(name, endpoint)), debug }
    }

    /// Location of the cached document.
    pub fn path(&self) -> &Path { &self.path }

    /// Whether the cached document can be served as is.
    pub fn is_fresh(&self, resource: &Path) -> bool {
        let Some(cached) = modified(&self.path) else {
            return false;
        };
        if !self.debug {
            return true;
        }
        match modified(resource) {
            Some(source) => cached >= source,
            None => false,
        }
    }

    /// Atomically replace the cached document.
    pub fn write(&self, content: &str) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), "wrote wsdl cache");
        Ok(())
    }

    /// Read the cached document.
    pub fn read(&self) -> Result<String> { Ok(fs::read_to_string(&self.path)?) }
}

/// `{name}.{hex(sha256(endpoint or ""))}.wsdl`
pub fn cache_file_name(name: &str, endpoint: Option<&str>) -> String {
    let digest = Sha256::digest(endpoint.unwrap_or("").as_bytes());
    format!("{}.{}.wsdl", name, hex::encode(digest))
}

fn modified(path: &Path) -> Option<SystemTime> { fs::metadata(path).and_then(|m| m.modified()).ok() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_file_name() {
        // sha256 of the empty string
        assert_eq!(
            cache_file_name("Calc", None),
            "Calc.e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.wsdl"
        );
        assert_eq!(cache_file_name("Calc", Some("")), cache_file_name("Calc", None));
        assert_ne!(cache_file_name("Calc", Some("http://a")), cache_file_name("Calc", Some("http://b")));
    }

    #[test]
    fn test_write_then_fresh() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let resource = dir.path().join("calc.json");
        fs::write(&resource, "{}").expect("write resource");

        let cache = WsdlCache::new(&dir.path().join("cache"), "Calc", Some("http://a"), false);
        assert!(!cache.is_fresh(&resource));

        cache.write("<definitions/>").expect("write cache");
        assert!(cache.is_fresh(&resource));
        assert_eq!(cache.read().expect("read cache"), "<definitions/>");

        cache.write("<definitions name=\"v2\"/>").expect("rewrite cache");
        assert_eq!(cache.read().expect("read cache"), "<definitions name=\"v2\"/>");
    }

    #[test]
    fn test_debug_requires_existing_resource() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let cache = WsdlCache::new(dir.path(), "Calc", None, true);
        cache.write("<definitions/>").expect("write cache");

        assert!(!cache.is_fresh(&dir.path().join("missing.json")));
        assert!(WsdlCache::new(dir.path(), "Calc", None, false).is_fresh(Path::new("missing.json")));
    }
}
