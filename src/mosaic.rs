// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mosaic construction.
//!
//! Builds the composite frame sequence for one page: every clip's frame `t`
//! is copied into its cell of composite frame `t`. Absent cells stay black.
//!
//! Composites are held as 8-bit luma, one byte per pixel. The `[0, 1]`
//! three-channel view and the display bytes are derived per frame.

use crate::error::AnnotatorError;
use crate::io::media::FrameSource;
use crate::models::grid::GridDims;
use crate::models::page::Page;
use image::{imageops, GrayImage, Rgb, Rgb32FImage};

/// Composite frames for one page.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub page: usize,
    pub dims: GridDims,
    pub frame_width: u32,
    pub frame_height: u32,
    frames: Vec<GrayImage>,
}

impl Mosaic {
    pub fn width(&self) -> u32 {
        self.frame_width * self.dims.nx as u32
    }

    pub fn height(&self) -> u32 {
        self.frame_height * self.dims.ny as u32
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn luma(&self, t: usize) -> Option<&GrayImage> {
        self.frames.get(t)
    }

    /// Frame `t` normalized to `[0, 1]` and broadcast to three channels.
    pub fn frame(&self, t: usize) -> Option<Rgb32FImage> {
        self.luma(t).map(|f| {
            Rgb32FImage::from_fn(f.width(), f.height(), |x, y| {
                let v = f.get_pixel(x, y)[0] as f32 / 255.0;
                Rgb([v, v, v])
            })
        })
    }

    /// 8-bit RGB bytes of frame `t`, row-major, for upload to the display.
    pub fn frame_rgb8(&self, t: usize) -> Option<Vec<u8>> {
        self.luma(t)
            .map(|f| f.as_raw().iter().flat_map(|&v| [v, v, v]).collect())
    }
}

/// Decode every clip on `page` and lay the frames out on the grid.
///
/// All clips must share the frame count and size of the first clip on the
/// page; a mismatch fails the whole page.
pub fn build_mosaic(page_index: usize, page: &Page, source: &dyn FrameSource) -> Result<Mosaic, AnnotatorError> {
    let dims = page.dims();
    let mut shape: Option<(u32, u32, usize)> = None;
    let mut frames: Vec<GrayImage> = Vec::new();

    for (index, cell) in page.cells() {
        log::debug!("Loading {} into row {}, column {}", cell.clip, index.row, index.col);
        let clip = source.read_clip(&cell.clip)?;

        let (w, h, count) = *shape.get_or_insert((clip.width, clip.height, clip.frame_count()));
        if (clip.width, clip.height) != (w, h) {
            return Err(AnnotatorError::Decode {
                clip: cell.clip.path().to_path_buf(),
                reason: format!("frames are {}x{}, page expects {}x{}", clip.width, clip.height, w, h),
            });
        }
        if clip.frame_count() != count {
            return Err(AnnotatorError::Decode {
                clip: cell.clip.path().to_path_buf(),
                reason: format!("{} frames, page expects {}", clip.frame_count(), count),
            });
        }

        if frames.is_empty() {
            frames = vec![GrayImage::new(w * dims.nx as u32, h * dims.ny as u32); count];
        }

        let (x0, y0) = (index.col as u32 * w, index.row as u32 * h);
        for (composite, frame) in frames.iter_mut().zip(&clip.frames) {
            imageops::replace(composite, frame, x0 as i64, y0 as i64);
        }
    }

    let (frame_width, frame_height, _) = shape.ok_or_else(|| AnnotatorError::Decode {
        clip: Default::default(),
        reason: format!("page {} has no clips", page_index),
    })?;

    Ok(Mosaic {
        page: page_index,
        dims,
        frame_width,
        frame_height,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::ClipFrames;
    use crate::models::grid::GridIndex;
    use crate::models::page::{build_pages, ClipRef};
    use std::collections::HashMap;

    /// In-memory clips: each pixel encodes (clip id, frame index).
    struct SyntheticSource {
        clips: HashMap<ClipRef, ClipFrames>,
    }

    impl SyntheticSource {
        fn uniform(ids: &[u8], frames: usize, w: u32, h: u32) -> Self {
            let clips = ids
                .iter()
                .map(|&id| {
                    let clip = ClipRef::new(format!("clip{}.gif", id));
                    let data = (0..frames)
                        .map(|t| GrayImage::from_fn(w, h, |x, _| image::Luma([id * 10 + t as u8 + x as u8])))
                        .collect();
                    let frames = ClipFrames::new(&clip, data).unwrap();
                    (clip, frames)
                })
                .collect();
            Self { clips }
        }
    }

    impl FrameSource for SyntheticSource {
        fn read_clip(&self, clip: &ClipRef) -> Result<ClipFrames, AnnotatorError> {
            self.clips.get(clip).cloned().ok_or_else(|| AnnotatorError::Decode {
                clip: clip.path().to_path_buf(),
                reason: "missing".to_string(),
            })
        }
    }

    fn refs(ids: &[u8]) -> Vec<ClipRef> {
        ids.iter().map(|id| ClipRef::new(format!("clip{}.gif", id))).collect()
    }

    #[test]
    fn test_blocks_match_cells() {
        let ids: Vec<u8> = (0..5).collect();
        let source = SyntheticSource::uniform(&ids, 4, 3, 2);
        let dims = GridDims::new(3, 2).unwrap();
        let pages = build_pages(&refs(&ids), dims);

        let mosaic = build_mosaic(0, &pages[0], &source).unwrap();
        assert_eq!((mosaic.width(), mosaic.height(), mosaic.frame_count()), (9, 4, 4));

        for t in 0..4 {
            let composite = mosaic.frame(t).unwrap();
            for (index, cell) in pages[0].cells() {
                let clip = &source.clips[&cell.clip].frames[t];
                for (x, y, p) in clip.enumerate_pixels() {
                    let expected = p[0] as f32 / 255.0;
                    let got = composite.get_pixel(index.col as u32 * 3 + x, index.row as u32 * 2 + y);
                    assert_eq!(got.0, [expected; 3]);
                }
            }
            // Absent sixth cell stays black
            assert_eq!(composite.get_pixel(8, 3).0, [0.0; 3]);
        }
    }

    #[test]
    fn test_placement_follows_grid_index() {
        let ids: Vec<u8> = (0..6).collect();
        let source = SyntheticSource::uniform(&ids, 1, 1, 1);
        let pages = build_pages(&refs(&ids), GridDims::new(3, 2).unwrap());
        let mosaic = build_mosaic(0, &pages[0], &source).unwrap();

        // Clip 3 is the first cell of the second row
        assert_eq!(pages[0].cell(GridIndex::new(1, 0)).unwrap().clip, ClipRef::new("clip3.gif"));
        let v = mosaic.frame(0).unwrap().get_pixel(0, 1)[0];
        assert!((v - 30.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_count_mismatch_fails_page() {
        let mut source = SyntheticSource::uniform(&[0, 1], 4, 2, 2);
        let short = SyntheticSource::uniform(&[1], 3, 2, 2);
        source.clips.extend(short.clips);

        let pages = build_pages(&refs(&[0, 1]), GridDims::new(2, 1).unwrap());
        let err = build_mosaic(0, &pages[0], &source).unwrap_err();
        assert!(matches!(err, AnnotatorError::Decode { ref clip, .. } if clip.ends_with("clip1.gif")));
    }

    #[test]
    fn test_size_mismatch_fails_page() {
        let mut source = SyntheticSource::uniform(&[0], 2, 2, 2);
        source.clips.extend(SyntheticSource::uniform(&[1], 2, 3, 2).clips);
        let pages = build_pages(&refs(&[0, 1]), GridDims::new(2, 1).unwrap());
        assert!(build_mosaic(0, &pages[0], &source).is_err());
    }

    #[test]
    fn test_rgb8_conversion() {
        let source = SyntheticSource::uniform(&[25], 1, 1, 1);
        let pages = build_pages(&refs(&[25]), GridDims::new(1, 1).unwrap());
        let mosaic = build_mosaic(0, &pages[0], &source).unwrap();
        assert_eq!(mosaic.frame_rgb8(0).unwrap(), vec![250, 250, 250]);
        assert!(mosaic.frame_rgb8(1).is_none());
    }

    #[test]
    fn test_composites_are_one_byte_per_pixel() {
        let ids: Vec<u8> = (0..4).collect();
        let source = SyntheticSource::uniform(&ids, 3, 4, 2);
        let pages = build_pages(&refs(&ids), GridDims::new(2, 2).unwrap());
        let mosaic = build_mosaic(0, &pages[0], &source).unwrap();

        let luma = mosaic.luma(2).unwrap();
        assert_eq!(luma.as_raw().len(), (mosaic.width() * mosaic.height()) as usize);

        // Normalized and display views agree with the stored bytes
        let normalized = mosaic.frame(2).unwrap();
        let rgb8 = mosaic.frame_rgb8(2).unwrap();
        for (x, y, p) in luma.enumerate_pixels() {
            assert_eq!(normalized.get_pixel(x, y).0, [p[0] as f32 / 255.0; 3]);
            let at = ((y * mosaic.width() + x) * 3) as usize;
            assert_eq!(&rgb8[at..at + 3], &[p[0]; 3]);
        }
    }
}
