use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;

use crate::image_utils::SourceFile;

pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "tif", "ico",
];

pub fn is_supported_image(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ref ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    )
}

pub fn collect_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(anyhow!("{} does not exist", root.display()));
    }
    if !root.is_dir() {
        return Err(anyhow!("{} is not a directory", root.display()));
    }

    let mut files = Vec::new();
    if recursive {
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_supported_image(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(root).with_context(|| format!("Unable to read directory {}", root.display()))? {
            let entry = entry.with_context(|| format!("Unable to read entry in {}", root.display()))?;
            let path = entry.path();
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Turn command line paths into one batch. Files are taken as given, in order;
/// directories contribute their supported images sorted by name.
pub fn collect_sources(paths: &[PathBuf], recursive: bool) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            sources.extend(collect_images(path, recursive)?.into_iter().map(SourceFile::from_path));
        } else if path.exists() {
            sources.push(SourceFile::from_path(path.clone()));
        } else {
            return Err(anyhow!("{} does not exist", path.display()));
        }
    }
    Ok(sources)
}
