//! Sidebar with the grouped lab catalog.

use crate::lab::{self, Lab};
use eframe::egui::{self, Ui};

/// Renders the lab list. Returns the lab clicked this frame, if any.
pub fn render(ui: &mut Ui, selected: Option<&str>) -> Option<&'static Lab> {
    let mut clicked = None;

    ui.heading("Labs");
    ui.separator();

    egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
        for (kind, labs) in lab::grouped() {
            ui.label(egui::RichText::new(kind.label()).strong());
            for lab in labs {
                let is_selected = selected == Some(lab.client_url);
                let response = ui
                    .selectable_label(is_selected, lab.name)
                    .on_hover_text(lab.description);
                if response.clicked() {
                    clicked = Some(lab);
                }
            }
            ui.add_space(8.0);
        }
    });

    clicked
}
