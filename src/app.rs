// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the control loop: it builds each page's mosaic on a
//! background thread, loops its frames on screen, forwards pointer gestures
//! to the labeler and keyboard commands to the session controller, and
//! persists progress on every page change and on quit.

use crate::config::Config;
use crate::error::AnnotatorError;
use crate::io::media::FrameSource;
use crate::io::serialization::{self, AnnotationRecord};
use crate::labeling::{LabelChange, Labeler};
use crate::models::page::Page;
use crate::mosaic::{build_mosaic, Mosaic};
use crate::session::{NavKey, SessionController, SessionState, Transition};
use crate::ui::{canvas, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a background mosaic build: page index and outcome.
type BuildResult = (usize, Result<Mosaic, AnnotatorError>);

/// Main application state.
pub struct AnnotatorApp {
    /// All pages for the run, built once at startup
    pages: Vec<Page>,

    labeler: Labeler,
    session: SessionController,
    source: Arc<dyn FrameSource>,

    root: PathBuf,
    annotation_file: PathBuf,
    /// Saved records for clips not found this run, written back unchanged
    carried: Vec<AnnotationRecord>,
    frame_delay: Duration,
    prefetch: bool,

    /// Mosaic of the current page once built
    mosaic: Option<Mosaic>,

    /// Receiver for the current page's build
    loader: Option<(usize, Receiver<BuildResult>)>,

    /// Receiver and finished result for the page-ahead build
    prefetcher: Option<(usize, Receiver<BuildResult>)>,
    prefetched: Option<Mosaic>,

    /// Why the current page could not be shown
    load_error: Option<String>,

    texture: Option<egui::TextureHandle>,
    /// (page, frame) currently uploaded to the texture
    shown: Option<(usize, usize)>,
    last_tick: Instant,

    /// Last message for the operator
    status: Option<String>,
}

impl AnnotatorApp {
    /// Create the application and start loading the session's page.
    pub fn new(
        config: Config,
        pages: Vec<Page>,
        carried: Vec<AnnotationRecord>,
        session: SessionController,
        source: Arc<dyn FrameSource>,
    ) -> Self {
        let mut app = Self {
            pages,
            labeler: Labeler::new(config.labels),
            session,
            source,
            root: config.root,
            annotation_file: config.annotation_file,
            carried,
            frame_delay: config.frame_delay,
            prefetch: config.prefetch,
            mosaic: None,
            loader: None,
            prefetcher: None,
            prefetched: None,
            load_error: None,
            texture: None,
            shown: None,
            last_tick: Instant::now(),
            status: None,
        };
        if let Some(page) = app.session.current_page() {
            app.show_page(page);
        }
        app
    }

    /// Build a page's mosaic on a background thread.
    fn spawn_build(&self, page_index: usize) -> Receiver<BuildResult> {
        let (sender, receiver) = channel();
        let page = self.pages[page_index].clone();
        let source = Arc::clone(&self.source);

        std::thread::spawn(move || {
            let started = Instant::now();
            log::info!("Loading page {} ({} clips)", page_index, page.occupied());
            let result = build_mosaic(page_index, &page, source.as_ref());
            match &result {
                Ok(mosaic) => log::info!(
                    "Page {} ready: {} frames of {}x{} in {:.1?}",
                    page_index,
                    mosaic.frame_count(),
                    mosaic.width(),
                    mosaic.height(),
                    started.elapsed()
                ),
                Err(e) => log::error!("Page {} failed: {}", page_index, e),
            }
            let _ = sender.send((page_index, result));
        });

        receiver
    }

    /// Make `page_index` current, reusing a prefetched or in-flight build.
    fn show_page(&mut self, page_index: usize) {
        self.mosaic = None;
        self.shown = None;
        self.load_error = None;
        self.labeler.leave_page();

        if self.prefetched.as_ref().map(|m| m.page) == Some(page_index) {
            if let Some(mosaic) = self.prefetched.take() {
                log::info!("Using prefetched mosaic for page {}", page_index);
                self.adopt_mosaic(mosaic);
                return;
            }
        }

        if self.prefetcher.as_ref().map(|(p, _)| *p) == Some(page_index) {
            self.loader = self.prefetcher.take();
        } else {
            self.loader = Some((page_index, self.spawn_build(page_index)));
        }
    }

    /// Install a finished mosaic for the current page.
    fn adopt_mosaic(&mut self, mosaic: Mosaic) {
        if self.session.current_page() != Some(mosaic.page) {
            return;
        }

        let page = mosaic.page;
        if let Err(e) = self
            .labeler
            .enter_page(&self.pages[page], mosaic.frame_width, mosaic.frame_height)
        {
            log::error!("{}", e);
            self.status = Some(e.to_string());
        }
        self.session.set_frame_count(mosaic.frame_count());
        self.mosaic = Some(mosaic);
        self.last_tick = Instant::now();

        let next = page + 1;
        let already_ahead = self.prefetched.as_ref().map(|m| m.page) == Some(next)
            || self.prefetcher.as_ref().map(|(p, _)| *p) == Some(next);
        if self.prefetch && next < self.pages.len() && !already_ahead {
            self.prefetched = None;
            self.prefetcher = Some((next, self.spawn_build(next)));
        }
    }

    /// Check the background builds for results.
    fn poll_builds(&mut self) {
        if let Some((page, receiver)) = &self.loader {
            let page = *page;
            match receiver.try_recv() {
                Ok((_, result)) => {
                    self.loader = None;
                    match result {
                        Ok(mosaic) => self.adopt_mosaic(mosaic),
                        Err(e) => self.load_error = Some(e.to_string()),
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.loader = None;
                    self.load_error = Some(format!("Loading page {} stopped unexpectedly", page + 1));
                }
            }
        }

        if let Some((_, receiver)) = &self.prefetcher {
            match receiver.try_recv() {
                Ok((_, result)) => {
                    self.prefetcher = None;
                    // A failed prefetch is rebuilt (and reported) when the page is shown
                    self.prefetched = result.ok();
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.prefetcher = None,
            }
        }
    }

    /// Write the annotation file, reporting failures to the operator.
    fn save_annotations(&mut self) {
        log::info!("Saving annotations...");
        let records = serialization::collect_annotations(&self.pages, &self.root, &self.carried);
        if let Err(e) = serialization::export_annotations(&records, &self.annotation_file) {
            log::error!("Failed to save annotations: {:#}", e);
            self.status = Some(format!("Failed to save annotations: {}", e));
        }
    }

    fn export_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .add_filter("YAML", &["yaml", "yml"])
            .set_file_name("annotations.json")
            .save_file()
        else {
            return;
        };

        let records = serialization::collect_annotations(&self.pages, &self.root, &self.carried);
        match serialization::export_annotations(&records, &path) {
            Ok(()) => {
                log::info!("Exported {} annotations to {}", records.len(), path.display());
                self.status = Some(format!("Exported {} annotations", records.len()));
            }
            Err(e) => {
                log::error!("Failed to export annotations: {:#}", e);
                self.status = Some(format!("Failed to export annotations: {}", e));
            }
        }
    }

    /// Apply a navigation key. Returns true when the session has quit.
    fn navigate(&mut self, key: NavKey) -> bool {
        match self.session.handle_key(key) {
            Ok(Transition::PageChanged { to, .. }) => {
                self.save_annotations();
                if let Err(e) = self.session.persist(to) {
                    log::error!("{}", e);
                    self.status = Some(e.to_string());
                }
                self.show_page(to);
                false
            }
            Ok(Transition::Quit { persist_error }) => {
                if let Some(e) = persist_error {
                    self.status = Some(e.to_string());
                }
                self.save_annotations();
                true
            }
            Ok(Transition::Stay) => false,
            Err(e) => {
                log::warn!("{}", e);
                self.status = Some(e.to_string());
                false
            }
        }
    }

    /// Upload the current frame if it is not on screen yet.
    fn update_texture(&mut self, ctx: &egui::Context) {
        let (Some(mosaic), SessionState::Viewing { page, frame }) = (&self.mosaic, self.session.state()) else {
            return;
        };
        if self.shown == Some((page, frame)) {
            return;
        }
        let Some(bytes) = mosaic.frame_rgb8(frame) else {
            return;
        };

        let size = [mosaic.width() as usize, mosaic.height() as usize];
        let image = egui::ColorImage::from_rgb(size, &bytes);
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("mosaic", image, egui::TextureOptions::NEAREST));
            }
        }
        self.shown = Some((page, frame));
    }
}

/// The single character of a key name such as "N", if it is one.
fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_builds();

        // Closing the window counts as quitting
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.session.state() != SessionState::Quitting {
                self.navigate(NavKey::Quit);
            }
            return;
        }

        let keys: Vec<NavKey> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => single_char(key.name()).and_then(NavKey::from_char),
                    _ => None,
                })
                .collect()
        });
        for key in keys {
            if self.navigate(key) {
                log::info!("Quitting the program...");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        }

        if self.mosaic.is_some() && self.last_tick.elapsed() >= self.frame_delay {
            self.session.advance_frame();
            self.last_tick = Instant::now();
        }
        self.update_texture(ctx);

        let page_index = self.session.current_page().unwrap_or(0);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                let page = &self.pages[page_index];
                toolbar::show(
                    ui,
                    &toolbar::ToolbarInfo {
                        page: page_index,
                        page_count: self.session.page_count(),
                        labeled: page.labeled(),
                        occupied: page.occupied(),
                        labels: self.labeler.labels(),
                        status: self.status.as_deref(),
                    },
                )
            })
            .inner;

        if let toolbar::ToolbarAction::Export = toolbar_action {
            self.export_as();
        }

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.load_error {
                    canvas::show_message(ui, message, false);
                    canvas::CanvasAction::None
                } else if let (Some(mosaic), Some(texture)) = (&self.mosaic, &self.texture) {
                    canvas::show(ui, texture, (mosaic.width(), mosaic.height()), self.labeler.rectangles())
                } else {
                    let clips = self.pages[page_index].occupied();
                    canvas::show_message(
                        ui,
                        &format!("Loading page {} ({} clips)...", page_index + 1, clips),
                        true,
                    );
                    canvas::CanvasAction::None
                }
            })
            .inner;

        if let canvas::CanvasAction::Input(event) = canvas_action {
            if let Some(mosaic) = &self.mosaic {
                let (width, height) = (mosaic.width(), mosaic.height());
                match self
                    .labeler
                    .dispatch(&mut self.pages[page_index], event, width, height)
                {
                    Ok(LabelChange::Ignored) => {}
                    Ok(change) => {
                        log::debug!("{:?}", change);
                        self.status = None;
                    }
                    Err(e) => {
                        log::warn!("{}", e);
                        self.status = Some(e.to_string());
                    }
                }
            }
        }

        ctx.request_repaint_after(self.frame_delay);
    }
}
