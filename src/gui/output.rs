//! Calculation output panel.
//!
//! Renders the stored output of a lab snapshot: either the server payload as
//! a key/value table or a captured error with its status, status text, and
//! detail.

use crate::state::labs::{LabOutput, LabSnapshot, OutputError};
use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};
use serde_json::Value;

const MAX_VALUE_CHARS: usize = 200;

/// Renders the output section. Returns true when the user cleared the output.
pub fn render(ui: &mut Ui, snapshot: &LabSnapshot, calculating: bool) -> bool {
    let mut clear = false;

    ui.separator();
    ui.horizontal(|ui| {
        ui.heading("Output");
        let can_clear = snapshot.output.is_some() && !calculating;
        if ui.add_enabled(can_clear, egui::Button::new("Clear")).clicked() {
            clear = true;
        }
    });

    match &snapshot.output {
        None => {
            ui.weak("No output yet.");
        }
        Some(LabOutput::Error { error }) => error_panel(ui, error),
        Some(LabOutput::Result(result)) => result_table(ui, result),
    }

    clear
}

fn error_panel(ui: &mut Ui, error: &OutputError) {
    let red = Color32::from_rgb(255, 100, 100);
    ui.colored_label(red, format!("{} {}", error.status, error.status_text));
    ui.label(display_value(&error.detail));
}

fn result_table(ui: &mut Ui, result: &serde_json::Map<String, Value>) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Key");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (key, value) in result {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.monospace(key);
                    });
                    row.col(|ui| {
                        ui.monospace(display_value(value));
                    });
                });
            }
        });
}

/// Compact, truncated rendering of a JSON value.
fn display_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_VALUE_CHARS {
        let truncated: String = text.chars().take(MAX_VALUE_CHARS).collect();
        format!("{truncated}...")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_display_unquoted() {
        assert_eq!(display_value(&json!("bad expression")), "bad expression");
        assert_eq!(display_value(&json!(2.0000000000284217)), "2.0000000000284217");
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "x".repeat(1000);
        let shown = display_value(&json!(long));
        assert!(shown.chars().count() <= MAX_VALUE_CHARS + 3);
        assert!(shown.ends_with("..."));
    }
}
