// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line options and resolved configuration.

use crate::io::discovery::normalize_extension;
use crate::io::serialization;
use crate::models::grid::GridDims;
use crate::models::label::LabelSet;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Label many short clips at once by clicking on them in a paged mosaic.
///
/// Left click, double click and middle click assign labels (see --labels),
/// right click removes one. Keys: N next page, B previous page, Q quit.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Folder searched recursively for clips
    pub root: PathBuf,

    /// Accepted clip extensions, comma separated
    #[arg(long = "ext", value_delimiter = ',', default_value = "mp4,avi")]
    pub extensions: Vec<String>,

    /// Approximate number of clips shown per page
    #[arg(long, default_value_t = 100.0)]
    pub approx_count: f64,

    /// Target display aspect ratio, e.g. 16/9 or 1.78
    #[arg(long, default_value = "16/9", value_parser = parse_ratio)]
    pub ratio: f64,

    /// Label vocabulary file (YAML or JSON)
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Session status file
    #[arg(long, default_value = "status.json")]
    pub status_file: PathBuf,

    /// Annotation file (YAML or JSON), backed up before each write
    #[arg(long, default_value = "labels.json")]
    pub annotation_file: PathBuf,

    /// Time each mosaic frame stays on screen
    #[arg(long, default_value_t = 30)]
    pub frame_delay_ms: u64,

    /// Do not build the next page's mosaic in the background
    #[arg(long)]
    pub no_prefetch: bool,
}

/// Parse `W/H` or a plain decimal into an aspect ratio.
pub fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio = match s.split_once('/') {
        Some((w, h)) => {
            let w: f64 = w.trim().parse().map_err(|_| format!("bad ratio width '{}'", w))?;
            let h: f64 = h.trim().parse().map_err(|_| format!("bad ratio height '{}'", h))?;
            w / h
        }
        None => s.trim().parse().map_err(|_| format!("bad ratio '{}'", s))?,
    };
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(format!("ratio must be positive, got '{}'", s));
    }
    Ok(ratio)
}

/// Validated settings handed to the application.
pub struct Config {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub grid: GridDims,
    pub labels: LabelSet,
    pub status_file: PathBuf,
    pub annotation_file: PathBuf,
    pub frame_delay: Duration,
    pub prefetch: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let grid = GridDims::from_target(args.approx_count, args.ratio)?;

        let labels = match &args.labels {
            Some(path) => LabelSet::new(serialization::import_labels(path)?)
                .with_context(|| format!("validating {}", path.display()))?,
            None => LabelSet::default_vocabulary()?,
        };
        serialization::ensure_supported(&args.annotation_file)
            .with_context(|| format!("annotation file {}", args.annotation_file.display()))?;

        Ok(Self {
            root: args.root,
            extensions: args.extensions.iter().map(|e| normalize_extension(e)).collect(),
            grid,
            labels,
            status_file: args.status_file,
            annotation_file: args.annotation_file,
            frame_delay: Duration::from_millis(args.frame_delay_ms.max(1)),
            prefetch: !args.no_prefetch,
        })
    }
}
