//! Status footer: connection indicator, API URL, and server health readout.

use crate::state::server::{ConnectionStatus, ServerStateModel};
use eframe::egui::{self, Color32, Ui};

/// Renders the footer. Returns true when the user asked to reconnect.
pub fn render(ui: &mut Ui, server: &ServerStateModel) -> bool {
    let mut retry = false;

    ui.horizontal(|ui| {
        let (color, label) = match server.connection_status {
            ConnectionStatus::Connecting => (Color32::from_rgb(255, 200, 0), "Connecting"),
            ConnectionStatus::Connected => (Color32::from_rgb(100, 220, 100), "Connected"),
            ConnectionStatus::Disconnected => (Color32::from_rgb(255, 100, 100), "Disconnected"),
        };
        ui.colored_label(color, "●");
        ui.label(label);

        if server.connection_status == ConnectionStatus::Disconnected && ui.button("Retry").clicked()
        {
            retry = true;
        }

        ui.separator();
        match &server.api_url {
            Some(url) => ui.monospace(url),
            None => ui.label("No API URL set"),
        };

        if let Some(health) = &server.server_health {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "Mem {:.0}% ({} / {})",
                    health.memory_load,
                    format_bytes(health.used_memory),
                    format_bytes(health.total_memory)
                ));
                ui.separator();
                ui.label(format!("CPU {:.0}%", health.cpu_load));
            });
        }
    });

    retry
}

/// Human-readable byte count, binary units.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
