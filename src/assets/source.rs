use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{BoardError, BoardResult};

/// Resolves an image URL to encoded bytes.
///
/// Implementations are called concurrently from the loader's worker pool.
pub trait ImageSource: Send + Sync {
    /// Fetch the encoded bytes behind `url`.
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>>;
}

/// Reads images from a directory; URLs are paths relative to `root`.
#[derive(Clone, Debug)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>> {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(BoardError::from)
    }
}

/// Normalize and validate root-relative image paths.
///
/// The result uses `/` separators and drops `.` segments. Absolute paths and parent traversals
/// (`..`) are rejected.
pub fn normalize_rel_path(source: &str) -> BoardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(BoardError::asset("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(BoardError::asset("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BoardError::asset("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BoardError::asset("image path must contain a file name"));
    }
    Ok(out.join("/"))
}

/// In-memory source keyed by exact URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageSource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), bytes);
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| BoardError::asset(format!("no image registered for '{url}'")))
    }
}

/// Fetches `http(s)` URLs anonymously: no cookie store, no credentials.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpImageSource {
    pub fn new(timeout: std::time::Duration) -> BoardResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {url}"))?;
        let bytes = resp
            .bytes()
            .with_context(|| format!("read body of {url}"))?;
        Ok(bytes.to_vec())
    }
}

/// Dispatches on URL scheme: `http://`/`https://` go over the network, everything else is read
/// from the filesystem root.
#[derive(Clone, Debug)]
pub struct AutoImageSource {
    fs: FsImageSource,
    #[cfg(feature = "http")]
    http: HttpImageSource,
}

impl AutoImageSource {
    pub fn new(root: impl Into<PathBuf>) -> BoardResult<Self> {
        Ok(Self {
            fs: FsImageSource::new(root),
            #[cfg(feature = "http")]
            http: HttpImageSource::new(std::time::Duration::from_secs(30))?,
        })
    }
}

impl ImageSource for AutoImageSource {
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>> {
        let is_remote = url.starts_with("http://") || url.starts_with("https://");
        if !is_remote {
            return self.fs.fetch(url);
        }
        #[cfg(feature = "http")]
        {
            self.http.fetch(url)
        }
        #[cfg(not(feature = "http"))]
        {
            Err(BoardError::asset(format!(
                "'{url}' needs the `http` feature to be fetched"
            )))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
