use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists photo files under `images_dir`.
///
/// Matching is on the lowercased extension including its dot, so `.JPG` matches `.jpg`.
/// Results are sorted by path; `limit == 0` means no limit.
pub fn scan_images(
    images_dir: &Path,
    allowed_exts: &[String],
    recurse: bool,
    limit: usize,
) -> Vec<PathBuf> {
    let allowed: Vec<String> = allowed_exts.iter().map(|e| e.to_lowercase()).collect();
    let max_depth = if recurse { usize::MAX } else { 1 };

    let matches = WalkDir::new(images_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_allowed_extension(path, &allowed));

    if limit > 0 {
        matches.take(limit).collect()
    } else {
        matches.collect()
    }
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .is_some_and(|ext| allowed.contains(&ext))
}
