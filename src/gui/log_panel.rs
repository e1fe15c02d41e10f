//! Event log panel.
//!
//! Owns its own filter state and renders the captured log entries as
//! monospace rows. Text filtering is case-insensitive over message and
//! target; only the visible rows are laid out.

use crate::log_capture::{LogBuffer, LogEntry};
use eframe::egui::{self, Color32, ScrollArea, Ui};
use log::LevelFilter;

/// Filterable view over the shared `LogBuffer`.
pub struct LogPanel {
    level: LevelFilter,
    filter: String,
    stick_to_bottom: bool,
}

impl Default for LogPanel {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            filter: String::new(),
            stick_to_bottom: true,
        }
    }
}

impl LogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the entry passes the current level and text filters.
    fn matches(&self, entry: &LogEntry) -> bool {
        if entry.level > self.level {
            return false;
        }
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        entry.message.to_lowercase().contains(&needle)
            || entry.target.to_lowercase().contains(&needle)
    }

    pub fn ui(&mut self, ui: &mut Ui, buffer: &LogBuffer) {
        ui.horizontal(|ui| {
            ui.heading("Event Log");
            ui.separator();
            self.level_combo(ui);
            ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Filter...")
                    .desired_width(160.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    buffer.clear();
                }
                ui.toggle_value(&mut self.stick_to_bottom, "Follow");
            });
        });
        ui.separator();

        let entries = buffer.read();
        let shown: Vec<&LogEntry> = entries.iter().filter(|e| self.matches(e)).collect();
        let row_height = ui.text_style_height(&egui::TextStyle::Monospace);

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(self.stick_to_bottom)
            .show_rows(ui, row_height, shown.len(), |ui, range| {
                for entry in shown[range].iter() {
                    ui.horizontal(|ui| {
                        ui.monospace(entry.timestamp.format("%H:%M:%S%.3f").to_string());
                        ui.colored_label(entry.color(), format!("{:>5}", entry.level));
                        ui.colored_label(Color32::from_gray(150), format!("{}:", entry.target));
                        ui.monospace(&entry.message);
                    });
                }
            });
    }

    fn level_combo(&mut self, ui: &mut Ui) {
        egui::ComboBox::from_id_salt("log_level")
            .selected_text(format!("{:?}", self.level))
            .show_ui(ui, |ui| {
                for level in [
                    LevelFilter::Off,
                    LevelFilter::Error,
                    LevelFilter::Warn,
                    LevelFilter::Info,
                    LevelFilter::Debug,
                    LevelFilter::Trace,
                ] {
                    ui.selectable_value(&mut self.level, level, format!("{level:?}"));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use log::Level;

    fn entry(level: Level, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn level_filter_hides_more_verbose_entries() {
        let panel = LogPanel::default();
        assert!(panel.matches(&entry(Level::Warn, "nml_client", "socket closed")));
        assert!(panel.matches(&entry(Level::Info, "nml_client", "connected")));
        assert!(!panel.matches(&entry(Level::Debug, "nml_client", "GET /api")));
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let panel = LogPanel {
            filter: "SOCKET".to_string(),
            ..LogPanel::default()
        };
        assert!(panel.matches(&entry(Level::Info, "nml_client", "Health socket connected")));
        assert!(!panel.matches(&entry(Level::Info, "nml_client", "API URL set")));
    }

    #[test]
    fn text_filter_also_matches_the_target() {
        let panel = LogPanel {
            filter: "socket".to_string(),
            ..LogPanel::default()
        };
        assert!(panel.matches(&entry(Level::Info, "nml_client::socket", "connected")));
    }

    #[test]
    fn off_hides_everything() {
        let panel = LogPanel {
            level: LevelFilter::Off,
            ..LogPanel::default()
        };
        assert!(!panel.matches(&entry(Level::Error, "nml_client", "boom")));
    }
}
