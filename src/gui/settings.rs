//! Settings page: editing and applying the API base URL.

use crate::state::server::ServerStateModel;
use crate::validators;
use eframe::egui::{self, Ui};

/// Outcome of rendering the settings page.
pub enum SettingsAction {
    None,
    /// Persist and reconnect to the given (already trimmed) URL.
    Apply(String),
}

/// Editable settings state.
pub struct SettingsPage {
    api_url_text: String,
}

impl SettingsPage {
    pub fn new(api_url: String) -> Self {
        Self { api_url_text: api_url }
    }

    /// Renders the page and reports what the user asked for.
    pub fn render(&mut self, ui: &mut Ui, server: &ServerStateModel) -> SettingsAction {
        let mut action = SettingsAction::None;

        ui.heading("Settings");
        ui.separator();

        egui::Grid::new("settings_fields")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("API URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.api_url_text).desired_width(320.0),
                );
                ui.end_row();
            });

        let validation = validators::api_url(self.api_url_text.trim());
        if let Err(message) = validation {
            ui.colored_label(egui::Color32::from_rgb(255, 100, 100), message);
        }

        let trimmed = validators::trim_api_url(&self.api_url_text);
        let current = server.api_url.as_deref().unwrap_or_default();
        let value_changed = trimmed != current;

        ui.horizontal(|ui| {
            let can_apply = validation.is_ok() && value_changed;
            if ui.add_enabled(can_apply, egui::Button::new("Apply")).clicked() {
                self.api_url_text = trimmed.clone();
                action = SettingsAction::Apply(trimmed);
            }
            if ui.add_enabled(value_changed, egui::Button::new("Reset")).clicked() {
                self.api_url_text = current.to_string();
            }
        });

        action
    }
}
