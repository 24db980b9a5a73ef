// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session and annotation serialization.
//!
//! This module reads and writes the session status file, the label
//! vocabulary and the annotation list. Vocabulary and annotations may be
//! YAML or JSON, chosen by file extension; the status file is always JSON.

use crate::error::AnnotatorError;
use crate::models::label::{LabelSet, LabelSpec};
use crate::models::page::Page;
use crate::models::status::SessionStatus;
use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One labeled clip in the annotation file.
///
/// `video` is relative to the clip root, so the file stays valid however
/// the root is spelled on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub video: PathBuf,
    pub label: String,
}

/// Outcome of re-applying saved annotations.
#[derive(Debug, Default)]
pub struct Restored {
    pub applied: usize,
    /// Records whose clip was not discovered this run, kept for re-export.
    pub unmatched: Vec<AnnotationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => bail!("Unsupported file extension: {:?}", extension),
    }
}

/// Fail early on a file whose extension selects no known format.
pub fn ensure_supported(path: &Path) -> Result<()> {
    format_of(path).map(|_| ())
}

fn render<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<String> {
    let text = match format_of(path)? {
        Format::Yaml => serde_yaml::to_string(data)?,
        Format::Json => serde_json::to_string_pretty(data)?,
    };
    Ok(text)
}

fn import<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let data = match format_of(path)? {
        Format::Yaml => serde_yaml::from_str(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    };
    Ok(data)
}

/// Write the session status as JSON.
pub fn save_status(status: &SessionStatus, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(status)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read the session status, or `None` when no status file exists.
pub fn load_status(path: &Path) -> Result<Option<SessionStatus>> {
    if !path.is_file() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let status = serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(status))
}

/// Read a label vocabulary file.
pub fn import_labels(path: &Path) -> Result<Vec<LabelSpec>> {
    import(path).with_context(|| format!("loading label vocabulary {}", path.display()))
}

/// Clip path as stored in the annotation file.
fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Collect one record per labeled cell across all pages, in page order,
/// followed by the `carried` records from earlier runs.
pub fn collect_annotations(pages: &[Page], root: &Path, carried: &[AnnotationRecord]) -> Vec<AnnotationRecord> {
    pages
        .iter()
        .flat_map(|page| page.cells())
        .filter_map(|(_, cell)| {
            cell.label.as_ref().map(|label| AnnotationRecord {
                video: relative_to(cell.clip.path(), root).to_path_buf(),
                label: label.clone(),
            })
        })
        .chain(carried.iter().cloned())
        .collect()
}

/// Path of the backup copy kept next to an annotation file.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Write annotations, first copying any existing file to its backup path.
///
/// Nothing on disk changes if the records cannot be encoded.
pub fn export_annotations(records: &[AnnotationRecord], path: &Path) -> Result<()> {
    let text = render(records, path)?;
    if path.is_file() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup).with_context(|| format!("backing up to {}", backup.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read annotations, or an empty list when the file does not exist yet.
pub fn import_annotations(path: &Path) -> Result<Vec<AnnotationRecord>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    import(path)
}

/// Re-apply saved labels to the cells holding the same clips under `root`.
///
/// Every record must name a label from `labels`. Records for clips that
/// were not discovered this run are returned so they can be written back.
pub fn apply_annotations(
    pages: &mut [Page],
    root: &Path,
    records: &[AnnotationRecord],
    labels: &LabelSet,
) -> Result<Restored, AnnotatorError> {
    let mut wanted: HashMap<&Path, &AnnotationRecord> = HashMap::with_capacity(records.len());
    for record in records {
        labels.get(&record.label)?;
        wanted.insert(record.video.as_path(), record);
    }

    let mut restored = Restored::default();
    for cell in pages.iter_mut().flat_map(|page| page.cells_mut()) {
        if let Some(record) = wanted.remove(relative_to(cell.clip.path(), root)) {
            cell.label = Some(record.label.clone());
            restored.applied += 1;
        }
    }

    // Keep file order for whatever was not found
    for record in records {
        if wanted.remove(record.video.as_path()).is_some() {
            log::warn!("Keeping annotation for missing clip {}", record.video.display());
            restored.unmatched.push(record.clone());
        }
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::{GridDims, GridIndex};
    use crate::models::page::{build_pages, ClipRef};

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mosaic_annotator_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_status_roundtrip() {
        let path = scratch("status.json");
        save_status(&SessionStatus::now(3), &path).unwrap();
        let restored = load_status(&path).unwrap().unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(restored.page, 3);
    }

    #[test]
    fn test_missing_status_is_none() {
        assert!(load_status(&scratch("never_written.json")).unwrap().is_none());
    }

    fn record(video: &str, label: &str) -> AnnotationRecord {
        AnnotationRecord {
            video: PathBuf::from(video),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_annotations_written_with_backup() {
        let root = Path::new("clips");
        let clips: Vec<ClipRef> = (0..5).map(|i| ClipRef::new(root.join(format!("v{}.mp4", i)))).collect();
        let mut pages = build_pages(&clips, GridDims::new(2, 2).unwrap());
        pages[0].cell_mut(GridIndex::new(1, 0)).unwrap().label = Some("sitting".to_string());
        pages[1].cell_mut(GridIndex::new(0, 0)).unwrap().label = Some("walking".to_string());

        let path = scratch("annotations.yaml");
        std::fs::write(&path, "[]").unwrap();
        let records = collect_annotations(&pages, root, &[]);
        export_annotations(&records, &path).unwrap();

        let backup = std::fs::read_to_string(backup_path(&path)).unwrap();
        let restored = import_annotations(&path).unwrap();
        std::fs::remove_file(&path).ok();
        std::fs::remove_file(backup_path(&path)).ok();

        assert_eq!(backup, "[]");
        assert_eq!(restored, vec![record("v2.mp4", "sitting"), record("v4.mp4", "walking")]);
    }

    #[test]
    fn test_apply_annotations_restores_labels() {
        let clips: Vec<ClipRef> = (0..3).map(|i| ClipRef::new(format!("v{}.mp4", i))).collect();
        let mut pages = build_pages(&clips, GridDims::new(2, 1).unwrap());
        let labels = LabelSet::default_vocabulary().unwrap();
        let records = vec![record("v2.mp4", "walking"), record("gone.mp4", "sitting")];

        let restored = apply_annotations(&mut pages, Path::new(""), &records, &labels).unwrap();
        assert_eq!(restored.applied, 1);
        assert_eq!(restored.unmatched, vec![record("gone.mp4", "sitting")]);
        assert_eq!(pages[1].cell(GridIndex::new(0, 0)).unwrap().label.as_deref(), Some("walking"));
        assert_eq!(pages[0].labeled(), 0);

        let bad = vec![record("v0.mp4", "dancing")];
        assert_eq!(
            apply_annotations(&mut pages, Path::new(""), &bad, &labels).unwrap_err(),
            AnnotatorError::UnknownLabel("dancing".to_string())
        );
    }

    #[test]
    fn test_root_spelling_does_not_lose_labels() {
        let labels = LabelSet::default_vocabulary().unwrap();
        let dims = GridDims::new(2, 1).unwrap();

        let first_root = Path::new("clips");
        let mut first = build_pages(&[ClipRef::new(first_root.join("a.mp4"))], dims);
        first[0].cell_mut(GridIndex::new(0, 0)).unwrap().label = Some("walking".to_string());
        let saved = collect_annotations(&first, first_root, &[]);
        assert_eq!(saved, vec![record("a.mp4", "walking")]);

        let second_root = Path::new("./clips");
        let mut second = build_pages(&[ClipRef::new(second_root.join("a.mp4"))], dims);
        let restored = apply_annotations(&mut second, second_root, &saved, &labels).unwrap();
        assert_eq!(restored.applied, 1);
        assert_eq!(collect_annotations(&second, second_root, &restored.unmatched), saved);
    }

    #[test]
    fn test_unmatched_records_are_written_back() {
        let labels = LabelSet::default_vocabulary().unwrap();
        let root = Path::new("clips");
        let mut pages = build_pages(&[ClipRef::new(root.join("a.mp4"))], GridDims::new(1, 1).unwrap());
        let saved = vec![record("elsewhere/b.mp4", "standing")];

        let restored = apply_annotations(&mut pages, root, &saved, &labels).unwrap();
        assert_eq!(restored.applied, 0);
        pages[0].cell_mut(GridIndex::new(0, 0)).unwrap().label = Some("sitting".to_string());

        assert_eq!(
            collect_annotations(&pages, root, &restored.unmatched),
            vec![record("a.mp4", "sitting"), record("elsewhere/b.mp4", "standing")]
        );
    }

    #[test]
    fn test_unsupported_extension_leaves_files_alone() {
        let path = scratch("annotations.csv");
        std::fs::write(&path, "keep").unwrap();
        let result = export_annotations(&[record("a.mp4", "walking")], &path);
        let kept = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        assert_eq!(kept, "keep");
        assert!(!backup_path(&path).exists());
        assert!(ensure_supported(&path).is_err());
        assert!(ensure_supported(Path::new("labels.yml")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_clip_path_is_rejected_not_mangled() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = scratch("non_utf8.json");
        std::fs::write(&path, "[]").unwrap();
        let video = PathBuf::from(OsStr::from_bytes(b"clip_\xff.mp4"));
        let result = export_annotations(
            &[AnnotationRecord {
                video,
                label: "walking".to_string(),
            }],
            &path,
        );
        let kept = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        assert_eq!(kept, "[]");
        assert!(!backup_path(&path).exists());
    }
}
