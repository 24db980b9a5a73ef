// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Page navigation and session persistence.
//!
//! The controller is a small state machine: while viewing, the mosaic
//! loops frame by frame until a navigation key changes page or quits.
//! It is the only component that reads or writes the status file.

use crate::error::AnnotatorError;
use crate::io::serialization;
use crate::models::status::SessionStatus;
use std::path::PathBuf;

/// Keyboard commands understood while viewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    Quit,
}

impl NavKey {
    /// Map a typed character to a command, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(NavKey::Next),
            'b' => Some(NavKey::Previous),
            'q' => Some(NavKey::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing { page: usize, frame: usize },
    Quitting,
}

/// Result of a navigation command.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Stay,
    PageChanged { from: usize, to: usize },
    /// The session has ended. A failed status write does not keep it open.
    Quit { persist_error: Option<AnnotatorError> },
}

pub struct SessionController {
    state: SessionState,
    page_count: usize,
    frame_count: usize,
    status_path: PathBuf,
}

impl SessionController {
    /// Start at `page`, which must be in range.
    pub fn new(status_path: PathBuf, page_count: usize, page: usize) -> Result<Self, AnnotatorError> {
        if page >= page_count {
            return Err(AnnotatorError::PageRange {
                requested: page as i64,
                page_count,
            });
        }
        Ok(Self {
            state: SessionState::Viewing { page, frame: 0 },
            page_count,
            frame_count: 0,
            status_path,
        })
    }

    /// Resume from the status file if there is one, otherwise start at page 0.
    /// A saved page past the end is clamped to the last page.
    pub fn restore(status_path: PathBuf, page_count: usize) -> Result<Self, AnnotatorError> {
        let saved = serialization::load_status(&status_path).map_err(|e| AnnotatorError::Persist {
            path: status_path.clone(),
            reason: format!("{:#}", e),
        })?;

        let page = match saved {
            Some(status) => {
                log::info!("Status file found at {}. Loading from page {}", status.time, status.page);
                if status.page >= page_count {
                    log::warn!(
                        "Saved page {} is past the last page; resuming at page {}",
                        status.page,
                        page_count.saturating_sub(1)
                    );
                }
                status.page.min(page_count.saturating_sub(1))
            }
            None => 0,
        };
        Self::new(status_path, page_count, page)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Page being viewed, `None` once quitting.
    pub fn current_page(&self) -> Option<usize> {
        match self.state {
            SessionState::Viewing { page, .. } => Some(page),
            SessionState::Quitting => None,
        }
    }

    pub fn current_frame(&self) -> Option<usize> {
        match self.state {
            SessionState::Viewing { frame, .. } => Some(frame),
            SessionState::Quitting => None,
        }
    }

    /// Set the loop length once the current page's mosaic is available.
    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        if let SessionState::Viewing { frame, .. } = &mut self.state {
            *frame = 0;
        }
    }

    /// Advance to the next frame, wrapping at the end of the clip.
    pub fn advance_frame(&mut self) {
        if self.frame_count == 0 {
            return;
        }
        if let SessionState::Viewing { frame, .. } = &mut self.state {
            *frame = (*frame + 1) % self.frame_count;
        }
    }

    /// Apply a navigation key.
    ///
    /// Moving before the first or past the last page leaves the state
    /// unchanged and returns `PageRange`. Quitting always enters
    /// `Quitting`; the status write result travels with the transition.
    pub fn handle_key(&mut self, key: NavKey) -> Result<Transition, AnnotatorError> {
        let SessionState::Viewing { page, .. } = self.state else {
            return Ok(Transition::Stay);
        };

        let target = match key {
            NavKey::Next => page as i64 + 1,
            NavKey::Previous => page as i64 - 1,
            NavKey::Quit => {
                self.state = SessionState::Quitting;
                log::info!("Quitting at page {}", page);
                let persist_error = self.persist(page).err();
                if let Some(e) = &persist_error {
                    log::error!("{}", e);
                }
                return Ok(Transition::Quit { persist_error });
            }
        };

        if target < 0 || target >= self.page_count as i64 {
            return Err(AnnotatorError::PageRange {
                requested: target,
                page_count: self.page_count,
            });
        }

        let to = target as usize;
        self.state = SessionState::Viewing { page: to, frame: 0 };
        self.frame_count = 0;
        log::info!("Page {} -> {}", page, to);
        Ok(Transition::PageChanged { from: page, to })
    }

    /// Write the status file for `page`.
    pub fn persist(&self, page: usize) -> Result<(), AnnotatorError> {
        log::info!("Saving status...");
        serialization::save_status(&SessionStatus::now(page), &self.status_path).map_err(|e| {
            AnnotatorError::Persist {
                path: self.status_path.clone(),
                reason: format!("{:#}", e),
            }
        })
    }
}
