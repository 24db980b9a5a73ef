// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error kinds raised by the annotator core.

use crate::models::grid::GridIndex;
use std::path::PathBuf;

/// Errors produced while discovering, loading, labeling or navigating clips.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatorError {
    /// No clip matched the extension filter under the root.
    Discovery { root: PathBuf, extensions: Vec<String> },
    /// A clip could not be decoded or disagrees with the page's shape.
    Decode { clip: PathBuf, reason: String },
    /// A label name is not part of the configured vocabulary.
    UnknownLabel(String),
    /// Navigation to a page outside `[0, page_count)`.
    PageRange { requested: i64, page_count: usize },
    /// The grid slot holds no clip (trailing cell of the last page).
    EmptyCell(GridIndex),
    InvalidGrid(String),
    Vocabulary(String),
    Persist { path: PathBuf, reason: String },
}

impl std::fmt::Display for AnnotatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotatorError::Discovery { root, extensions } => write!(
                f,
                "No clips with extensions [{}] found under {}",
                extensions.join(", "),
                root.display()
            ),
            AnnotatorError::Decode { clip, reason } => {
                write!(f, "Failed to decode {}: {}", clip.display(), reason)
            }
            AnnotatorError::UnknownLabel(name) => write!(f, "Unknown label: '{}'", name),
            AnnotatorError::PageRange { requested, page_count } => write!(
                f,
                "Page {} is out of range (0..{})",
                requested, page_count
            ),
            AnnotatorError::EmptyCell(index) => {
                write!(f, "No clip at row {}, column {}", index.row, index.col)
            }
            AnnotatorError::InvalidGrid(reason) => write!(f, "Invalid grid: {}", reason),
            AnnotatorError::Vocabulary(reason) => write!(f, "Invalid label vocabulary: {}", reason),
            AnnotatorError::Persist { path, reason } => {
                write!(f, "Failed to persist {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for AnnotatorError {}
