//! JPEG thumbnails for the map popups and the gallery sidebar.

use crate::adapters::exif_reader;
use crate::domain::model::OutputFile;
use crate::domain::ports::Storage;
use crate::domain::THUMBS_DIR;
use crate::utils::error::{catch_panic, PhotoMapError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Bounding box edge in pixels; aspect ratio is kept.
    pub size: u32,
    pub quality: u8,
    pub workers: usize,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            size: 256,
            quality: 85,
            workers: 4,
        }
    }
}

/// Result of a thumbnail pass: where each photo's thumbnail lives, plus the newly
/// rendered files that still have to be written.
#[derive(Debug, Default)]
pub struct ThumbnailSet {
    pub mapping: HashMap<PathBuf, String>,
    pub rendered: Vec<OutputFile>,
    pub reused: usize,
    pub failed: usize,
}

/// `<stem>_<12 hex chars of the path hash>.jpg`; the hash keeps equal stems from
/// different folders apart.
pub fn thumbnail_name(src: &Path) -> String {
    let hash = blake3::hash(src.to_string_lossy().as_bytes()).to_hex();
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    format!("{}_{}.jpg", stem, &hash.as_str()[..12])
}

pub fn thumbnail_rel_path(src: &Path) -> String {
    format!("{}/{}", THUMBS_DIR, thumbnail_name(src))
}

/// Decodes `src`, shrinks it into the bounding box, turns it upright and encodes a JPEG.
pub fn render_thumbnail(src: &Path, options: &ThumbnailOptions) -> Result<Vec<u8>> {
    let image = ImageReader::open(src)?.with_guessed_format()?.decode()?;

    let image = if image.width() > options.size || image.height() > options.size {
        image.resize(options.size, options.size, FilterType::Lanczos3)
    } else {
        image
    };

    let image = match exif_reader::read_orientation(src) {
        Some(orientation) => apply_orientation(image, orientation),
        None => image,
    };

    let rgb = image.to_rgb8();
    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, options.quality);
        encoder.encode_image(&rgb)?;
    }
    Ok(bytes)
}

/// Rotates/flips pixels so that an image tagged with EXIF orientation `1..=8` displays upright.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Renders thumbnails for `paths` on blocking workers, at most `options.workers` at a time.
///
/// Thumbnails already present in `storage` are reused. Files that cannot be decoded
/// are left out of the mapping.
pub async fn make_thumbnails<S: Storage>(
    storage: &S,
    paths: Vec<PathBuf>,
    options: ThumbnailOptions,
) -> Result<ThumbnailSet> {
    make_thumbnails_with(storage, paths, options, render_thumbnail).await
}

async fn make_thumbnails_with<S, F>(
    storage: &S,
    paths: Vec<PathBuf>,
    options: ThumbnailOptions,
    render: F,
) -> Result<ThumbnailSet>
where
    S: Storage,
    F: Fn(&Path, &ThumbnailOptions) -> Result<Vec<u8>> + Copy + Send + 'static,
{
    let mut set = ThumbnailSet::default();
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut tasks = JoinSet::new();

    for path in paths {
        let rel = thumbnail_rel_path(&path);
        if storage.exists(&rel).await {
            set.mapping.insert(path, rel);
            set.reused += 1;
            continue;
        }

        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| PhotoMapError::processing(e.to_string()))?;
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let rendered = catch_panic(|| render(&path, &options)).and_then(|r| r);
            (path, rel, rendered)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (path, rel, rendered) = match joined {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!("Thumbnail task did not complete: {}", e);
                set.failed += 1;
                continue;
            }
        };
        match rendered {
            Ok(bytes) => {
                set.rendered.push(OutputFile::new(rel.clone(), bytes));
                set.mapping.insert(path, rel);
            }
            Err(e) => {
                tracing::debug!("No thumbnail for {}: {}", path.display(), e);
                set.failed += 1;
            }
        }
    }

    // Deterministic write order.
    set.rendered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    tracing::debug!(
        "Thumbnails: {} rendered, {} reused, {} failed",
        set.rendered.len(),
        set.reused,
        set.failed
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::exif_reader::fixtures::{jpeg_with_exif, sydney_tiff};
    use crate::config::LocalStorage;
    use image::{GenericImageView, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_thumbnail_name_is_stable_and_path_dependent() {
        let a = thumbnail_name(Path::new("img/2019/IMG_0001.JPG"));
        let b = thumbnail_name(Path::new("img/2020/IMG_0001.JPG"));

        assert!(a.starts_with("IMG_0001_"));
        assert!(a.ends_with(".jpg"));
        assert_eq!(a.len(), "IMG_0001_".len() + 12 + ".jpg".len());
        assert_ne!(a, b);
        assert_eq!(a, thumbnail_name(Path::new("img/2019/IMG_0001.JPG")));
        assert_eq!(
            thumbnail_rel_path(Path::new("img/2019/IMG_0001.JPG")),
            format!("thumbs/{}", a)
        );
    }

    #[test]
    fn test_render_keeps_aspect_ratio() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("wide.png");
        RgbImage::new(800, 400).save(&src).unwrap();

        let bytes = render_thumbnail(&src, &ThumbnailOptions::default()).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!(thumb.dimensions(), (256, 128));
    }

    #[test]
    fn test_render_does_not_upscale() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("small.png");
        RgbImage::new(40, 30).save(&src).unwrap();

        let bytes = render_thumbnail(&src, &ThumbnailOptions::default()).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!(thumb.dimensions(), (40, 30));
    }

    #[test]
    fn test_apply_orientation_swaps_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(20, 10));
        assert_eq!(apply_orientation(image.clone(), 6).dimensions(), (10, 20));
        assert_eq!(apply_orientation(image.clone(), 3).dimensions(), (20, 10));
        assert_eq!(apply_orientation(image, 1).dimensions(), (20, 10));
    }

    #[test]
    fn test_render_honours_exif_orientation() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("portrait.jpg");
        std::fs::write(&src, jpeg_with_exif(40, 20, &sydney_tiff(6))).unwrap();

        let bytes = render_thumbnail(&src, &ThumbnailOptions::default()).unwrap();
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!(thumb.dimensions(), (20, 40));
    }

    #[tokio::test]
    async fn test_make_thumbnails_reuses_and_skips() {
        let photos = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let storage = LocalStorage::new(out.path());

        let good = photos.path().join("good.png");
        RgbImage::new(300, 300).save(&good).unwrap();
        let cached = photos.path().join("cached.png");
        RgbImage::new(300, 300).save(&cached).unwrap();
        let broken = photos.path().join("broken.jpg");
        std::fs::write(&broken, b"nope").unwrap();

        storage
            .write_file(&thumbnail_rel_path(&cached), b"cached-bytes")
            .await
            .unwrap();

        let set = make_thumbnails(
            &storage,
            vec![good.clone(), cached.clone(), broken.clone()],
            ThumbnailOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(set.reused, 1);
        assert_eq!(set.failed, 1);
        assert_eq!(set.rendered.len(), 1);
        assert_eq!(set.rendered[0].relative_path, thumbnail_rel_path(&good));
        assert!(set.mapping.contains_key(&good));
        assert!(set.mapping.contains_key(&cached));
        assert!(!set.mapping.contains_key(&broken));
    }

    #[tokio::test]
    async fn test_panicking_decoder_only_fails_that_photo() {
        let photos = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let storage = LocalStorage::new(out.path());

        let fine = photos.path().join("fine.png");
        RgbImage::new(64, 64).save(&fine).unwrap();
        let cursed = photos.path().join("cursed.png");
        RgbImage::new(64, 64).save(&cursed).unwrap();

        fn render(src: &Path, options: &ThumbnailOptions) -> Result<Vec<u8>> {
            if src.ends_with("cursed.png") {
                panic!("decoder blew up");
            }
            render_thumbnail(src, options)
        }

        let set = make_thumbnails_with(
            &storage,
            vec![fine.clone(), cursed.clone()],
            ThumbnailOptions::default(),
            render,
        )
        .await
        .unwrap();

        assert_eq!(set.failed, 1);
        assert_eq!(set.rendered.len(), 1);
        assert!(set.mapping.contains_key(&fine));
        assert!(!set.mapping.contains_key(&cursed));
    }
}
