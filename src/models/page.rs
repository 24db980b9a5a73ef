// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Paged clip layout.
//!
//! The discovered clip list is cut into fixed-size pages once at startup.
//! Each page is a `ny x nx` grid; the last page may leave trailing slots
//! empty.

use super::grid::{GridDims, GridIndex};
use crate::error::AnnotatorError;
use std::path::{Path, PathBuf};

/// A clip file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipRef(PathBuf);

impl ClipRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ClipRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One occupied grid slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub clip: ClipRef,
    pub label: Option<String>,
}

/// A grid of cells. Absent slots are `None`.
#[derive(Debug, Clone)]
pub struct Page {
    dims: GridDims,
    cells: Vec<Option<Cell>>,
}

impl Page {
    fn new(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![None; dims.slots()],
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    fn slot(&self, index: GridIndex) -> Option<usize> {
        self.dims
            .contains(index)
            .then(|| index.row * self.dims.nx + index.col)
    }

    pub fn cell(&self, index: GridIndex) -> Option<&Cell> {
        self.slot(index).and_then(|slot| self.cells[slot].as_ref())
    }

    pub fn cell_mut(&mut self, index: GridIndex) -> Result<&mut Cell, AnnotatorError> {
        self.slot(index)
            .and_then(|slot| self.cells[slot].as_mut())
            .ok_or(AnnotatorError::EmptyCell(index))
    }

    /// Occupied cells with their positions, in fill order.
    pub fn cells(&self) -> impl Iterator<Item = (GridIndex, &Cell)> + '_ {
        self.dims
            .indices()
            .zip(self.cells.iter())
            .filter_map(|(index, cell)| cell.as_ref().map(|c| (index, c)))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn labeled(&self) -> usize {
        self.cells().filter(|(_, c)| c.label.is_some()).count()
    }
}

/// Assign every clip, in order, to a `(page, row, col)` slot.
pub fn build_pages(clips: &[ClipRef], dims: GridDims) -> Vec<Page> {
    clips
        .chunks(dims.slots())
        .map(|chunk| {
            let mut page = Page::new(dims);
            for (slot, clip) in chunk.iter().enumerate() {
                page.cells[slot] = Some(Cell {
                    clip: clip.clone(),
                    label: None,
                });
            }
            page
        })
        .collect()
}
