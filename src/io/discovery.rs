// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Clip discovery.
//!
//! Walks the clip root recursively and keeps files whose extension is in
//! the accepted set. The result is sorted so page numbers stay stable
//! between runs.

use crate::error::AnnotatorError;
use crate::models::page::ClipRef;
use std::path::Path;
use walkdir::WalkDir;

/// Normalize an extension for comparison: no leading dot, lowercase.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Find every clip under `root` with one of `extensions`.
pub fn find_clips(root: &Path, extensions: &[String]) -> Result<Vec<ClipRef>, AnnotatorError> {
    let wanted: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();

    let mut clips: Vec<ClipRef> = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| wanted.contains(&ext.to_ascii_lowercase()))
                .unwrap_or(false)
        })
        .map(|entry| ClipRef::new(entry.into_path()))
        .collect();

    if clips.is_empty() {
        return Err(AnnotatorError::Discovery {
            root: root.to_path_buf(),
            extensions: wanted,
        });
    }

    clips.sort_by(|a, b| a.path().cmp(b.path()));
    log::info!("Found {} clips under {}", clips.len(), root.display());
    Ok(clips)
}
