// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between normalized canvas coordinates, mosaic pixel
//! coordinates and grid cells.

use crate::models::grid::{GridDims, GridIndex};

/// A point in mosaic pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Convert normalized coordinates (0.0 to 1.0) to mosaic pixel coordinates.
pub fn denormalize_coordinates(rel_x: f64, rel_y: f64, width: u32, height: u32) -> Point {
    Point::new(rel_x * width as f64, rel_y * height as f64)
}

/// Resolve a click in mosaic pixel space to the grid cell under it.
///
/// Coordinates on or past the mosaic edges are clamped to the outermost cell.
pub fn cell_from_click(x: f64, y: f64, mosaic_width: u32, mosaic_height: u32, dims: GridDims) -> GridIndex {
    GridIndex::new(
        axis_cell(y, mosaic_height, dims.ny),
        axis_cell(x, mosaic_width, dims.nx),
    )
}

fn axis_cell(pos: f64, extent: u32, cells: usize) -> usize {
    if extent == 0 || !pos.is_finite() || pos <= 0.0 {
        return 0;
    }
    let cell = (pos / extent as f64 * cells as f64).floor() as usize;
    cell.min(cells - 1)
}

/// Top-left and bottom-right corners of a cell for frames of `frame_width` x `frame_height`.
pub fn cell_bounds(index: GridIndex, frame_width: u32, frame_height: u32) -> (Point, Point) {
    let (w, h) = (frame_width as f64, frame_height as f64);
    (
        Point::new(index.col as f64 * w, index.row as f64 * h),
        Point::new((index.col + 1) as f64 * w, (index.row + 1) as f64 * h),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims::new(13, 7).unwrap()
    }

    #[test]
    fn test_origin_is_first_cell() {
        assert_eq!(cell_from_click(0.0, 0.0, 1664, 896, dims()), GridIndex::new(0, 0));
    }

    #[test]
    fn test_cell_origin_resolves_to_that_cell() {
        let (fw, fh) = (128, 128);
        for index in dims().indices() {
            let (tl, _) = cell_bounds(index, fw, fh);
            assert_eq!(cell_from_click(tl.x, tl.y, 13 * fw, 7 * fh, dims()), index);
        }
    }

    #[test]
    fn test_edges_are_clamped() {
        assert_eq!(cell_from_click(1664.0, 896.0, 1664, 896, dims()), GridIndex::new(6, 12));
        assert_eq!(cell_from_click(-5.0, 5000.0, 1664, 896, dims()), GridIndex::new(6, 0));
        assert_eq!(cell_from_click(10.0, 10.0, 0, 0, dims()), GridIndex::new(0, 0));
    }

    #[test]
    fn test_monotonic_in_both_axes() {
        let mut last = GridIndex::new(0, 0);
        for step in 0..=900 {
            let y = step as f64;
            let index = cell_from_click(y * 1.8, y, 1664, 896, dims());
            assert!(index.row >= last.row);
            assert!(index.col >= last.col);
            assert_eq!(index, cell_from_click(y * 1.8, y, 1664, 896, dims()));
            last = index;
        }
    }

    #[test]
    fn test_denormalize_corners() {
        let br = denormalize_coordinates(1.0, 1.0, 1920, 1080);
        assert_eq!(br, Point::new(1920.0, 1080.0));
        let (tl, br) = cell_bounds(GridIndex::new(1, 2), 64, 48);
        assert_eq!(tl, Point::new(128.0, 48.0));
        assert_eq!(br, Point::new(192.0, 96.0));
    }
}
