// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Grid dimensions and cell addressing.
//!
//! Every component that needs to know where a clip sits on a page goes
//! through [`GridIndex`], so page layout, mosaic placement and click
//! resolution all agree on the same row-major convention.

use crate::error::AnnotatorError;
use serde::{Deserialize, Serialize};

/// Position of a cell on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Number of columns (`nx`) and rows (`ny`) on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub nx: usize,
    pub ny: usize,
}

impl GridDims {
    /// Create grid dimensions, rejecting empty grids.
    pub fn new(nx: usize, ny: usize) -> Result<Self, AnnotatorError> {
        if nx == 0 || ny == 0 {
            return Err(AnnotatorError::InvalidGrid(format!(
                "grid must be at least 1x1, got {}x{}",
                nx, ny
            )));
        }
        Ok(Self { nx, ny })
    }

    /// Derive the grid from an approximate visible clip count and a display
    /// aspect ratio: `ny = floor(sqrt(n / ratio))`, `nx = floor(sqrt(n * ratio))`.
    pub fn from_target(approx_count: f64, ratio: f64) -> Result<Self, AnnotatorError> {
        if !(approx_count.is_finite() && approx_count > 0.0 && ratio.is_finite() && ratio > 0.0) {
            return Err(AnnotatorError::InvalidGrid(format!(
                "count {} and ratio {} must be positive",
                approx_count, ratio
            )));
        }
        let ny = (approx_count / ratio).sqrt().floor() as usize;
        let nx = (approx_count * ratio).sqrt().floor() as usize;
        Self::new(nx, ny)
    }

    /// Number of slots on one page.
    pub fn slots(&self) -> usize {
        self.nx * self.ny
    }

    /// Index of the `slot`-th cell when filling row by row, column fastest.
    pub fn index_of_slot(&self, slot: usize) -> GridIndex {
        GridIndex::new(slot / self.nx, slot % self.nx)
    }

    pub fn contains(&self, index: GridIndex) -> bool {
        index.row < self.ny && index.col < self.nx
    }

    /// All cell positions in fill order.
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> + '_ {
        (0..self.slots()).map(move |slot| self.index_of_slot(slot))
    }
}
