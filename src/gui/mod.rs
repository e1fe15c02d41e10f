//! The eframe/egui implementation for the GUI.
//!
//! The shell is a header, a collapsible sidebar of labs, a status footer, and
//! a central panel routed between the selected lab, the settings page, and the
//! about page. Per-lab form state lives here; everything the forms produce is
//! dispatched into `NmlApp` and read back as snapshots each frame.

pub mod forms;

mod footer;
mod log_panel;
mod output;
mod settings;
mod sidebar;

use crate::lab::{lab_by_id, Lab};
use crate::log_capture::LogBuffer;
use crate::state::server::ServerStateModel;
use crate::state::NmlApp;
use eframe::egui;
use forms::{ExprCache, ExprStatus, FieldKind, LabForm};
use log::warn;
use log_panel::LogPanel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SIDEBAR_STORAGE_KEY: &str = "isSidebarOpened";

/// What the central panel currently shows.
#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Lab(&'static str),
    Settings,
    About,
}

/// The main GUI struct.
pub struct Gui {
    app: NmlApp,
    log_buffer: LogBuffer,
    view: View,
    sidebar_open: bool,
    show_log_panel: bool,
    forms: HashMap<&'static str, LabForm>,
    settings: settings::SettingsPage,
    expr_cache: Arc<Mutex<ExprCache>>,
    log_panel: LogPanel,
}

impl Gui {
    /// Creates a new GUI, restoring the sidebar state from storage.
    pub fn new(_cc: &eframe::CreationContext<'_>, app: NmlApp, log_buffer: LogBuffer) -> Self {
        let (sidebar_open, api_url) = app.with_inner(|inner| {
            (
                inner.storage.get_json::<bool>(SIDEBAR_STORAGE_KEY).unwrap_or(true),
                inner.server.api_url.clone().unwrap_or_default(),
            )
        });

        let mut gui = Self {
            app,
            log_buffer,
            view: View::About,
            sidebar_open,
            show_log_panel: false,
            forms: HashMap::new(),
            settings: settings::SettingsPage::new(api_url),
            expr_cache: Arc::new(Mutex::new(ExprCache::new())),
            log_panel: LogPanel::new(),
        };

        // Open on the first lab when the catalog is non-empty.
        if let Some(lab) = crate::lab::LABS.first() {
            gui.select_lab(lab);
        }
        gui
    }

    /// Switches to a lab, lazily building and restoring its form.
    fn select_lab(&mut self, lab: &'static Lab) {
        if !self.forms.contains_key(lab.client_url) {
            let mut form = forms::catalog::form_for(lab);
            let snapshot = self.app.with_inner(|inner| inner.lab_snapshot(lab.client_url));
            form.restore(&snapshot);

            // Restored expressions were never validated in this session.
            let pending: Vec<String> = form
                .fields
                .iter()
                .filter(|f| matches!(f.kind, FieldKind::Expression) && !f.text.is_empty())
                .map(|f| f.text.clone())
                .collect();
            self.forms.insert(lab.client_url, form);
            for expression in pending {
                self.spawn_expression_validation(expression);
            }
        }
        self.view = View::Lab(lab.client_url);
    }

    /// Kicks off remote validation for a normalized expression, once.
    #[allow(clippy::unwrap_used)]
    fn spawn_expression_validation(&self, expression: String) {
        if expression.is_empty() {
            return;
        }
        {
            let mut cache = self.expr_cache.lock().unwrap();
            if cache.contains_key(&expression) {
                return;
            }
            cache.insert(expression.clone(), ExprStatus::Pending);
        }

        let (http, api_url) = self
            .app
            .with_inner(|inner| (inner.http.clone(), inner.server.api_url.clone()));
        let Some(api_url) = api_url else {
            // No server to ask; leave the entry pending until a URL is set.
            return;
        };

        let cache = self.expr_cache.clone();
        self.app.runtime().spawn(async move {
            let status = match http.validate_expression(&api_url, &expression).await {
                Ok(true) => ExprStatus::Valid,
                Ok(false) => ExprStatus::Invalid,
                Err(e) => {
                    warn!("Expression validation failed: {}", e);
                    ExprStatus::Invalid
                }
            };
            cache.lock().unwrap().insert(expression, status);
        });
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        let open = self.sidebar_open;
        self.app.with_inner(|inner| {
            if let Err(e) = inner.storage.set_json(SIDEBAR_STORAGE_KEY, &open) {
                warn!("Failed to persist sidebar state: {}", e);
            }
        });
    }

    fn header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("☰").on_hover_text("Toggle sidebar").clicked() {
                    self.toggle_sidebar();
                }
                ui.heading("Numerical Methods Lab");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.view == View::Settings, "Settings")
                        .clicked()
                    {
                        self.view = View::Settings;
                    }
                    if ui
                        .selectable_label(self.view == View::About, "About")
                        .clicked()
                    {
                        self.view = View::About;
                    }
                    ui.toggle_value(&mut self.show_log_panel, "Event Log");
                });
            });
        });
    }

    #[allow(clippy::unwrap_used)]
    fn lab_page(&mut self, ui: &mut egui::Ui, lab: &'static Lab, server: &ServerStateModel) {
        ui.heading(lab.name);
        ui.label(lab.description);
        ui.separator();

        let Some(form) = self.forms.get_mut(lab.client_url) else {
            return;
        };

        let cache = self.expr_cache.lock().unwrap().clone();
        let mut edited_expressions = Vec::new();
        let changed = form.draw(ui, &cache, &mut |expression| {
            edited_expressions.push(expression.to_string());
        });

        if changed {
            let input = form.to_input();
            self.app.with_inner(|inner| inner.update_input(lab, input));
        }

        ui.separator();
        let can_submit = form.is_valid(&cache) && server.can_run_task();
        let calculating =
            server.server_task_state == Some(crate::state::server::ServerTaskState::Calculating);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_submit, egui::Button::new("Calculate"))
                .clicked()
            {
                form.apply_defaults();
                let input = form.to_input();
                let options = form.calculate_options();
                self.app.with_inner(|inner| inner.update_input(lab, input));
                self.app.calculate(lab, options);
            }
            if calculating {
                ui.spinner();
                ui.label("Calculating...");
            }
        });

        let snapshot = self.app.with_inner(|inner| inner.lab_snapshot(lab.client_url));
        if output::render(ui, &snapshot, calculating) {
            self.app.with_inner(|inner| inner.clear_output(lab));
        }

        for expression in edited_expressions {
            self.spawn_expression_validation(expression);
        }
    }

    fn about_page(&self, ui: &mut egui::Ui) {
        let (client_version, api_version) = self.app.with_inner(|inner| {
            (
                inner.config.versions.client.clone(),
                inner.config.versions.api.clone(),
            )
        });

        ui.heading("Numerical Methods Lab");
        ui.label("An interactive client for numerical-methods course labs.");
        ui.separator();
        egui::Grid::new("about_versions").num_columns(2).show(ui, |ui| {
            ui.label("Client version");
            ui.label(client_version);
            ui.end_row();
            ui.label("API version");
            ui.label(api_version);
            ui.end_row();
        });
        ui.separator();
        ui.label("Pick a lab from the sidebar, fill in the form, and press Calculate.");
    }
}

impl eframe::App for Gui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let server = self.app.with_inner(|inner| inner.server.clone());

        self.header(ctx);

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            if footer::render(ui, &server) {
                self.app.connect(None);
            }
        });

        if self.show_log_panel {
            egui::TopBottomPanel::bottom("log_panel")
                .resizable(true)
                .min_height(150.0)
                .show(ctx, |ui| {
                    self.log_panel.ui(ui, &self.log_buffer);
                });
        }

        if self.sidebar_open {
            let selected = match self.view {
                View::Lab(id) => Some(id),
                _ => None,
            };
            let mut clicked = None;
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .min_width(220.0)
                .show(ctx, |ui| {
                    clicked = sidebar::render(ui, selected);
                });
            if let Some(lab) = clicked {
                self.select_lab(lab);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                match self.view {
                    View::Lab(id) => {
                        if let Some(lab) = lab_by_id(id) {
                            self.lab_page(ui, lab, &server);
                        }
                    }
                    View::Settings => {
                        let action = self.settings.render(ui, &server);
                        match action {
                            settings::SettingsAction::Apply(url) => self.app.set_api_url(&url),
                            settings::SettingsAction::None => {}
                        }
                    }
                    View::About => self.about_page(ui),
                }
            });
        });

        // Request a repaint to ensure the GUI is continuously updated
        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.app.shutdown();
    }
}
