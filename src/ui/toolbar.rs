// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and status line.
//!
//! Shows page position, the label legend with the gesture for each label,
//! key hints and the latest status message.

use crate::models::label::{InputKind, LabelSet};

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    Export,
}

/// What the toolbar needs to know about the session.
pub struct ToolbarInfo<'a> {
    pub page: usize,
    pub page_count: usize,
    pub labeled: usize,
    pub occupied: usize,
    pub labels: &'a LabelSet,
    pub status: Option<&'a str>,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, info: &ToolbarInfo<'_>) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(egui::RichText::new(format!("Page {} / {}", info.page + 1, info.page_count)).strong());
        ui.label(format!("{} of {} labeled", info.labeled, info.occupied));

        ui.separator();

        for spec in info.labels.iter() {
            let [r, g, b] = spec.color.0;
            ui.label(
                egui::RichText::new(format!("■ {} ({})", spec.name, spec.trigger.describe()))
                    .color(egui::Color32::from_rgb(r, g, b)),
            );
        }
        ui.label(format!("{} removes", InputKind::SecondaryClick.describe()));

        ui.separator();

        if ui.button("Export…").clicked() {
            action = ToolbarAction::Export;
        }

        ui.label(egui::RichText::new("N next · B back · Q quit").italics().weak());
    });

    if let Some(status) = info.status {
        ui.label(egui::RichText::new(status).color(egui::Color32::from_rgb(230, 160, 60)));
    }

    action
}
