// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! This module decodes clip files into grayscale frame sequences. Animated
//! GIFs are always supported; other containers go through OpenCV when the
//! `video-opencv` feature is enabled.

use crate::error::AnnotatorError;
use crate::models::page::ClipRef;
use image::GrayImage;

/// All frames of one clip, every frame the same size.
#[derive(Debug, Clone)]
pub struct ClipFrames {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<GrayImage>,
}

impl ClipFrames {
    /// Wrap decoded frames, checking they are non-empty and uniformly sized.
    pub fn new(clip: &ClipRef, frames: Vec<GrayImage>) -> Result<Self, AnnotatorError> {
        let first = frames.first().ok_or_else(|| decode_error(clip, "clip has no frames"))?;
        let (width, height) = first.dimensions();
        if let Some((i, odd)) = frames.iter().enumerate().find(|(_, f)| f.dimensions() != (width, height)) {
            return Err(decode_error(
                clip,
                format!(
                    "frame {} is {}x{}, expected {}x{}",
                    i,
                    odd.width(),
                    odd.height(),
                    width,
                    height
                ),
            ));
        }
        Ok(Self { width, height, frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Anything that can turn a clip reference into frames.
pub trait FrameSource: Send + Sync {
    fn read_clip(&self, clip: &ClipRef) -> Result<ClipFrames, AnnotatorError>;
}

/// Frame source that picks a decoder from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaDecoder;

impl FrameSource for MediaDecoder {
    fn read_clip(&self, clip: &ClipRef) -> Result<ClipFrames, AnnotatorError> {
        let extension = clip
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        let frames = match extension.as_deref() {
            Some("gif") => read_gif(clip)?,
            _ => read_video(clip)?,
        };
        log::debug!("Decoded {} ({} frames)", clip, frames.len());
        ClipFrames::new(clip, frames)
    }
}

fn decode_error(clip: &ClipRef, reason: impl ToString) -> AnnotatorError {
    AnnotatorError::Decode {
        clip: clip.path().to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_gif(clip: &ClipRef) -> Result<Vec<GrayImage>, AnnotatorError> {
    use image::{codecs::gif::GifDecoder, AnimationDecoder, DynamicImage};
    use std::{fs::File, io::BufReader};

    let file = File::open(clip.path()).map_err(|e| decode_error(clip, e))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| decode_error(clip, e))?;
    decoder
        .into_frames()
        .map(|frame| {
            frame
                .map(|f| DynamicImage::ImageRgba8(f.into_buffer()).to_luma8())
                .map_err(|e| decode_error(clip, e))
        })
        .collect()
}

#[cfg(feature = "video-opencv")]
fn read_video(clip: &ClipRef) -> Result<Vec<GrayImage>, AnnotatorError> {
    use opencv::{core::Mat, imgproc, prelude::*, videoio};

    let cv_err = |e: opencv::Error| decode_error(clip, e);

    let path = clip.path().to_string_lossy();
    let mut cap = videoio::VideoCapture::from_file(&path, videoio::CAP_ANY).map_err(cv_err)?;
    if !cap.is_opened().map_err(cv_err)? {
        return Err(decode_error(clip, "cannot open video"));
    }

    let mut frames = Vec::new();
    let mut frame = Mat::default();
    loop {
        if !cap.read(&mut frame).map_err(cv_err)? || frame.empty() {
            break;
        }
        let mut gray = Mat::default();
        if frame.channels() == 1 {
            gray = frame.try_clone().map_err(cv_err)?;
        } else {
            imgproc::cvt_color(&frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0).map_err(cv_err)?;
        }
        let (width, height) = (gray.cols() as u32, gray.rows() as u32);
        let bytes = gray.data_bytes().map_err(cv_err)?.to_vec();
        let image = GrayImage::from_raw(width, height, bytes)
            .ok_or_else(|| decode_error(clip, "frame buffer size mismatch"))?;
        frames.push(image);
    }
    cap.release().map_err(cv_err)?;
    Ok(frames)
}

#[cfg(not(feature = "video-opencv"))]
fn read_video(clip: &ClipRef) -> Result<Vec<GrayImage>, AnnotatorError> {
    Err(decode_error(
        clip,
        "video decoding requires building with the video-opencv feature",
    ))
}
