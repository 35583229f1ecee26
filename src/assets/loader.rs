use std::collections::HashMap;

use rayon::prelude::*;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::source::ImageSource;
use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::Fnv1a64;
use crate::model::board::Domain;

/// `(domain id, position in the domain's sort order)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey {
    pub domain_id: String,
    pub index: usize,
}

impl ImageKey {
    pub fn new(domain_id: impl Into<String>, index: usize) -> Self {
        Self {
            domain_id: domain_id.into(),
            index,
        }
    }
}

/// Decoded bitmaps by [`ImageKey`]. Missing entries mean "draw a placeholder".
#[derive(Clone, Debug, Default)]
pub struct ImageTable {
    images: HashMap<ImageKey, PreparedImage>,
}

impl ImageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ImageKey, image: PreparedImage) {
        self.images.insert(key, image);
    }

    pub fn get(&self, domain_id: &str, index: usize) -> Option<&PreparedImage> {
        self.images.get(&ImageKey::new(domain_id, index))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Order-independent identity of the table contents.
    pub fn fingerprint(&self) -> u64 {
        let mut keys: Vec<&ImageKey> = self.images.keys().collect();
        keys.sort();
        let mut hasher = Fnv1a64::new_default();
        for key in keys {
            hasher.write_str(&key.domain_id);
            hasher.write_u64(key.index as u64);
            if let Some(img) = self.images.get(key) {
                hasher.write_u64(img.fingerprint);
            }
        }
        hasher.finish()
    }
}

/// One image that could not be fetched or decoded.
#[derive(Clone, Debug)]
pub struct LoadFailure {
    pub key: ImageKey,
    pub url: String,
    pub reason: String,
}

/// Outcome of a full load: everything that decoded, plus what did not.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub table: ImageTable,
    pub failures: Vec<LoadFailure>,
    pub requested: usize,
}

/// Loader worker configuration.
#[derive(Clone, Debug, Default)]
pub struct LoaderOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Fetch and decode every image referenced by `domains` concurrently, then join.
///
/// Individual failures are logged and reported, never returned as `Err`; the only error is a
/// worker pool that cannot be built.
#[tracing::instrument(skip_all, fields(domains = domains.len()))]
pub fn load_images(
    domains: &[Domain],
    source: &dyn ImageSource,
    opts: &LoaderOpts,
) -> BoardResult<LoadReport> {
    let jobs: Vec<(ImageKey, &str)> = domains
        .iter()
        .flat_map(|d| {
            d.ordered_images()
                .into_iter()
                .enumerate()
                .map(move |(idx, img)| (ImageKey::new(d.id.clone(), idx), img.url.as_str()))
        })
        .collect();

    let pool = build_thread_pool(opts.threads)?;
    let results: Vec<(ImageKey, &str, BoardResult<PreparedImage>)> = pool.install(|| {
        jobs.into_par_iter()
            .map(|(key, url)| {
                let res = source.fetch(url).and_then(|bytes| decode_image(&bytes));
                (key, url, res)
            })
            .collect()
    });

    let mut report = LoadReport {
        requested: results.len(),
        ..LoadReport::default()
    };
    for (key, url, res) in results {
        match res {
            Ok(img) => report.table.insert(key, img),
            Err(e) => {
                let label = domains
                    .iter()
                    .find(|d| d.id == key.domain_id)
                    .map(Domain::label)
                    .unwrap_or(&key.domain_id);
                tracing::warn!(domain = label, index = key.index, url, error = %e, "failed to load image");
                report.failures.push(LoadFailure {
                    key,
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        loaded = report.table.len(),
        failed = report.failures.len(),
        "image load joined"
    );
    Ok(report)
}

fn build_thread_pool(threads: Option<usize>) -> BoardResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(BoardError::validation("loader threads must be > 0"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BoardError::asset(format!("failed to build loader thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
