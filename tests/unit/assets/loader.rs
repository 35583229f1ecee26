use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::source::MemoryImageSource;

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct CountingSource {
    inner: MemoryImageSource,
    calls: AtomicUsize,
}

impl ImageSource for CountingSource {
    fn fetch(&self, url: &str) -> BoardResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url)
    }
}

#[test]
fn every_image_is_attempted_and_failures_are_reported() {
    let domains = vec![
        Domain::new("career", "#ff0000")
            .with_image("mem://career/0")
            .with_image("mem://career/missing"),
        Domain::new("health", "#00ff00").with_image("mem://health/garbage"),
        Domain::new("family", "#0000ff"),
    ];
    let source = CountingSource {
        inner: MemoryImageSource::new()
            .with("mem://career/0", png([255, 0, 0, 255]))
            .with("mem://health/garbage", b"nope".to_vec()),
        calls: AtomicUsize::new(0),
    };

    let report = load_images(&domains, &source, &LoaderOpts { threads: Some(2) }).unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(report.requested, 3);
    assert_eq!(report.table.len(), 1);
    assert!(report.table.get("career", 0).is_some());
    assert!(report.table.get("career", 1).is_none());
    assert!(report.table.get("health", 0).is_none());

    let mut failed: Vec<(String, usize)> = report
        .failures
        .iter()
        .map(|f| (f.key.domain_id.clone(), f.key.index))
        .collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![("career".to_string(), 1), ("health".to_string(), 0)]
    );
}

#[test]
fn images_are_keyed_by_sort_order_position() {
    let mut d = Domain::new("career", "#ff0000");
    d.images = vec![
        crate::model::board::DomainImage::new("mem://second", 2),
        crate::model::board::DomainImage::new("mem://first", 1),
    ];
    let source = MemoryImageSource::new()
        .with("mem://first", png([1, 1, 1, 255]))
        .with("mem://second", png([2, 2, 2, 255]));

    let report = load_images(&[d], &source, &LoaderOpts::default()).unwrap();
    assert_eq!(
        report.table.get("career", 0).unwrap().premul.get_pixel(0, 0).0,
        [1, 1, 1, 255]
    );
    assert_eq!(
        report.table.get("career", 1).unwrap().premul.get_pixel(0, 0).0,
        [2, 2, 2, 255]
    );
}

#[test]
fn zero_threads_is_rejected() {
    let err = load_images(&[], &MemoryImageSource::new(), &LoaderOpts { threads: Some(0) });
    assert!(err.is_err());
}

#[test]
fn table_fingerprint_ignores_insertion_order() {
    let a = decode_image(&png([1, 2, 3, 255])).unwrap();
    let b = decode_image(&png([4, 5, 6, 255])).unwrap();

    let mut t1 = ImageTable::new();
    t1.insert(ImageKey::new("x", 0), a.clone());
    t1.insert(ImageKey::new("y", 0), b.clone());
    let mut t2 = ImageTable::new();
    t2.insert(ImageKey::new("y", 0), b);
    t2.insert(ImageKey::new("x", 0), a);
    assert_eq!(t1.fingerprint(), t2.fingerprint());
    assert_ne!(t1.fingerprint(), ImageTable::new().fingerprint());
}
