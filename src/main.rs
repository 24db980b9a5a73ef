// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mosaic Annotator
//!
//! Tiles many short clips into a paged, looping grid so an operator can
//! label them by clicking, and remembers which page they reached.

mod app;
mod config;
mod error;
mod io;
mod labeling;
mod models;
mod mosaic;
mod session;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use clap::Parser;
use config::{Args, Config};
use io::media::MediaDecoder;
use session::SessionController;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(Args::parse())?;

    // Find clips and lay them out on pages
    let clips = io::discovery::find_clips(&config.root, &config.extensions)?;
    let mut pages = models::page::build_pages(&clips, config.grid);
    log::info!(
        "{} clips on {} pages of {}x{}",
        clips.len(),
        pages.len(),
        config.grid.nx,
        config.grid.ny
    );

    // Bring back labels from a previous session
    let records = io::serialization::import_annotations(&config.annotation_file)
        .with_context(|| format!("loading annotations from {}", config.annotation_file.display()))?;
    let restored = io::serialization::apply_annotations(&mut pages, &config.root, &records, &config.labels)
        .with_context(|| format!("applying annotations from {}", config.annotation_file.display()))?;
    if restored.applied > 0 {
        log::info!("Restored {} labels", restored.applied);
    }

    let session = SessionController::restore(config.status_file.clone(), pages.len())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 360.0])
            .with_title("Mosaic Annotator"),
        ..Default::default()
    };

    let app = AnnotatorApp::new(config, pages, restored.unmatched, session, Arc::new(MediaDecoder));

    eframe::run_native("Mosaic Annotator", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
