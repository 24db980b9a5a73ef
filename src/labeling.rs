// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Click-to-label state for the current page.
//!
//! [`Labeler`] turns pointer gestures into label changes on the current
//! page and keeps the highlight rectangles drawn over labeled cells. It
//! only ever holds rectangles for one page.

use crate::error::AnnotatorError;
use crate::models::grid::GridIndex;
use crate::models::label::{InputEvent, InputKind, LabelSet, Rgb};
use crate::models::page::Page;
use crate::util::geometry::{cell_bounds, cell_from_click, Point};

/// Highlight drawn over a labeled cell, in mosaic pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub index: GridIndex,
    pub top_left: Point,
    pub bottom_right: Point,
    pub color: Rgb,
    pub label: String,
}

/// What a dispatched gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelChange {
    Assigned { index: GridIndex, label: String },
    Cleared { index: GridIndex },
    /// The gesture is not bound to anything.
    Ignored,
}

pub struct Labeler {
    labels: LabelSet,
    frame_size: (u32, u32),
    rectangles: Vec<Rectangle>,
}

impl Labeler {
    pub fn new(labels: LabelSet) -> Self {
        Self {
            labels,
            frame_size: (0, 0),
            rectangles: Vec::new(),
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// Switch to a newly displayed page whose clips are `frame_width` x `frame_height`.
    pub fn enter_page(&mut self, page: &Page, frame_width: u32, frame_height: u32) -> Result<(), AnnotatorError> {
        self.frame_size = (frame_width, frame_height);
        self.recompute_rectangles(page)
    }

    /// Drop rectangles while no page is on screen.
    pub fn leave_page(&mut self) {
        self.rectangles.clear();
    }

    pub fn assign_label(&mut self, page: &mut Page, index: GridIndex, label: &str) -> Result<(), AnnotatorError> {
        self.labels.get(label)?;
        let cell = page.cell_mut(index)?;
        cell.label = Some(label.to_string());
        log::info!("Labeled {} as '{}'", cell.clip, label);
        self.recompute_rectangles(page)
    }

    pub fn clear_label(&mut self, page: &mut Page, index: GridIndex) -> Result<(), AnnotatorError> {
        let cell = page.cell_mut(index)?;
        if let Some(old) = cell.label.take() {
            log::info!("Removed label '{}' from {}", old, cell.clip);
        }
        self.recompute_rectangles(page)
    }

    /// Rebuild the rectangles for every labeled cell of `page`.
    ///
    /// Fails on the first label that is not in the vocabulary; the previous
    /// rectangles are kept in that case.
    pub fn recompute_rectangles(&mut self, page: &Page) -> Result<(), AnnotatorError> {
        let (fw, fh) = self.frame_size;
        let rectangles = page
            .cells()
            .filter_map(|(index, cell)| cell.label.as_ref().map(|label| (index, label)))
            .map(|(index, label)| {
                let color = self.labels.color_of(label)?;
                let (top_left, bottom_right) = cell_bounds(index, fw, fh);
                Ok(Rectangle {
                    index,
                    top_left,
                    bottom_right,
                    color,
                    label: label.clone(),
                })
            })
            .collect::<Result<Vec<_>, AnnotatorError>>()?;
        self.rectangles = rectangles;
        Ok(())
    }

    /// Apply a pointer gesture on a mosaic of `mosaic_width` x `mosaic_height`.
    ///
    /// The removal gesture clears the cell whatever the vocabulary says;
    /// other gestures assign the label bound to them, if any.
    pub fn dispatch(
        &mut self,
        page: &mut Page,
        event: InputEvent,
        mosaic_width: u32,
        mosaic_height: u32,
    ) -> Result<LabelChange, AnnotatorError> {
        let index = cell_from_click(event.x, event.y, mosaic_width, mosaic_height, page.dims());

        if event.kind == InputKind::SecondaryClick {
            self.clear_label(page, index)?;
            return Ok(LabelChange::Cleared { index });
        }

        let Some(spec) = self.labels.for_trigger(event.kind) else {
            return Ok(LabelChange::Ignored);
        };
        let label = spec.name.clone();
        self.assign_label(page, index, &label)?;
        Ok(LabelChange::Assigned { index, label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::GridDims;
    use crate::models::page::{build_pages, ClipRef};

    fn setup(clip_count: usize) -> (Labeler, Page) {
        let clips: Vec<ClipRef> = (0..clip_count).map(|i| ClipRef::new(format!("{}.mp4", i))).collect();
        let page = build_pages(&clips, GridDims::new(4, 3).unwrap()).remove(0);
        let mut labeler = Labeler::new(LabelSet::default_vocabulary().unwrap());
        labeler.enter_page(&page, 100, 50).unwrap();
        (labeler, page)
    }

    fn click(kind: InputKind, x: f64, y: f64) -> InputEvent {
        InputEvent { kind, x, y }
    }

    #[test]
    fn test_assign_then_clear() {
        let (mut labeler, mut page) = setup(12);
        let index = GridIndex::new(2, 1);

        labeler.assign_label(&mut page, index, "standing").unwrap();
        assert_eq!(
            labeler.rectangles(),
            &[Rectangle {
                index,
                top_left: Point::new(100.0, 100.0),
                bottom_right: Point::new(200.0, 150.0),
                color: Rgb([255, 140, 0]),
                label: "standing".to_string(),
            }]
        );

        labeler.clear_label(&mut page, index).unwrap();
        assert!(labeler.rectangles().is_empty());
        assert!(page.cell(index).unwrap().label.is_none());
    }

    #[test]
    fn test_one_rectangle_per_labeled_cell() {
        let (mut labeler, mut page) = setup(12);
        labeler.assign_label(&mut page, GridIndex::new(0, 0), "walking").unwrap();
        labeler.assign_label(&mut page, GridIndex::new(1, 3), "sitting").unwrap();
        labeler.assign_label(&mut page, GridIndex::new(0, 0), "sitting").unwrap();

        let rects = labeler.rectangles();
        assert_eq!(rects.len(), 2);
        assert!(rects.iter().all(|r| r.color == Rgb([200, 0, 0])));
    }

    #[test]
    fn test_dispatch_by_gesture() {
        let (mut labeler, mut page) = setup(12);
        let (w, h) = (400, 150);

        let change = labeler.dispatch(&mut page, click(InputKind::DoubleClick, 0.0, 0.0), w, h).unwrap();
        assert_eq!(
            change,
            LabelChange::Assigned { index: GridIndex::new(0, 0), label: "sitting".to_string() }
        );

        let change = labeler.dispatch(&mut page, click(InputKind::SecondaryClick, 50.0, 20.0), w, h).unwrap();
        assert_eq!(change, LabelChange::Cleared { index: GridIndex::new(0, 0) });
        assert!(labeler.rectangles().is_empty());
    }

    #[test]
    fn test_unbound_gesture_is_ignored() {
        let (_, mut page) = setup(12);
        let mut labeler = Labeler::new(
            LabelSet::new(vec![crate::models::label::LabelSpec::new(
                "only",
                [1, 2, 3],
                InputKind::PrimaryClick,
            )])
            .unwrap(),
        );
        let change = labeler.dispatch(&mut page, click(InputKind::MiddleClick, 0.0, 0.0), 400, 150).unwrap();
        assert_eq!(change, LabelChange::Ignored);
    }

    #[test]
    fn test_unknown_label_and_empty_cell() {
        let (mut labeler, mut page) = setup(5);
        assert_eq!(
            labeler.assign_label(&mut page, GridIndex::new(0, 0), "jumping"),
            Err(AnnotatorError::UnknownLabel("jumping".to_string()))
        );
        assert!(page.cell(GridIndex::new(0, 0)).unwrap().label.is_none());

        let err = labeler
            .dispatch(&mut page, click(InputKind::PrimaryClick, 399.0, 149.0), 400, 150)
            .unwrap_err();
        assert_eq!(err, AnnotatorError::EmptyCell(GridIndex::new(2, 3)));
    }

    #[test]
    fn test_recompute_rejects_foreign_label() {
        let (mut labeler, mut page) = setup(3);
        page.cell_mut(GridIndex::new(0, 2)).unwrap().label = Some("flying".to_string());
        assert!(matches!(
            labeler.recompute_rectangles(&page),
            Err(AnnotatorError::UnknownLabel(_))
        ));
    }
}
