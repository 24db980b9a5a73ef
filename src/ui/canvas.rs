// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mosaic canvas.
//!
//! This module displays the current composite frame, draws the label
//! rectangles on top of it and reports pointer gestures in mosaic pixel
//! coordinates.

use crate::labeling::Rectangle;
use crate::models::label::{InputEvent, InputKind, Rgb};
use crate::util::geometry::denormalize_coordinates;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Input(InputEvent),
}

fn color32(color: Rgb) -> egui::Color32 {
    let [r, g, b] = color.0;
    egui::Color32::from_rgb(r, g, b)
}

/// Display the mosaic texture and handle pointer gestures.
pub fn show(
    ui: &mut egui::Ui,
    texture: &egui::TextureHandle,
    mosaic_size: (u32, u32),
    rectangles: &[Rectangle],
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (img_width, img_height) = mosaic_size;
        if img_width == 0 || img_height == 0 {
            return;
        }

        // Fit the mosaic into the available space
        let available = ui.available_size();
        let img_aspect = img_width as f32 / img_height as f32;
        let available_aspect = available.x / available.y;

        let (display_width, display_height) = if img_aspect > available_aspect {
            (available.x, available.x / img_aspect)
        } else {
            (available.y * img_aspect, available.y)
        };

        let x_offset = (available.x - display_width) / 2.0;
        let y_offset = (available.y - display_height) / 2.0;

        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click());

        // A double click also reports the second click; the double click wins.
        let kind = if response.double_clicked() {
            Some(InputKind::DoubleClick)
        } else if response.clicked() {
            Some(InputKind::PrimaryClick)
        } else if response.clicked_by(egui::PointerButton::Middle) {
            Some(InputKind::MiddleClick)
        } else if response.secondary_clicked() {
            Some(InputKind::SecondaryClick)
        } else {
            None
        };

        if let (Some(kind), Some(pos)) = (kind, response.interact_pointer_pos()) {
            if image_rect.contains(pos) {
                let rel_x = (pos.x - image_rect.min.x) / display_width;
                let rel_y = (pos.y - image_rect.min.y) / display_height;
                let point = denormalize_coordinates(rel_x as f64, rel_y as f64, img_width, img_height);
                action = CanvasAction::Input(InputEvent {
                    kind,
                    x: point.x,
                    y: point.y,
                });
            }
        }

        let scale = display_width / img_width as f32;
        let painter = ui.painter();
        for rect in rectangles {
            draw_rectangle(painter, rect, &image_rect, scale);
        }
    });

    action
}

/// Draw a label highlight, mapping mosaic pixels to screen space.
fn draw_rectangle(painter: &egui::Painter, rect: &Rectangle, image_rect: &egui::Rect, scale: f32) {
    let to_screen = |x: f64, y: f64| image_rect.min + egui::vec2(x as f32 * scale, y as f32 * scale);
    let color = color32(rect.color);

    let screen_rect = egui::Rect::from_min_max(
        to_screen(rect.top_left.x, rect.top_left.y),
        to_screen(rect.bottom_right.x, rect.bottom_right.y),
    );
    painter.rect_stroke(screen_rect, 0.0, egui::Stroke::new((4.0 * scale).max(1.0), color));
    painter.text(
        to_screen(rect.top_left.x + 10.0, rect.top_left.y + 15.0),
        egui::Align2::LEFT_BOTTOM,
        &rect.label,
        egui::FontId::proportional(12.0),
        color,
    );
}

/// Placeholder shown while a page is loading or failed to load.
pub fn show_message(ui: &mut egui::Ui, message: &str, busy: bool) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            if busy {
                ui.spinner();
                ui.add_space(10.0);
            }
            ui.label(
                egui::RichText::new(message)
                    .size(16.0)
                    .color(egui::Color32::from_gray(200)),
            );
        });
    });
}
