//! Schema-driven lab forms.
//!
//! Every lab defines its form as data (see `catalog`): a list of typed fields
//! plus an optional matrix or point-table block. A single renderer draws the
//! fields, normalizes expression text as the user types, validates inline, and
//! produces the flat input mapping dispatched to the store. Expression fields
//! are validated remotely; the result cache lives in the GUI and is keyed by
//! the normalized text, so retyping the same expression does not re-query the
//! server.

pub mod catalog;

use crate::expression;
use crate::lab::Lab;
use crate::state::labs::{CalculateOptions, LabInput, LabSnapshot};
use crate::validators;
use egui::Ui;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Remote validation result for one normalized expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprStatus {
    Pending,
    Valid,
    Invalid,
}

/// Cache of remote expression-validation results.
pub type ExprCache = HashMap<String, ExprStatus>;

/// Typed form field kinds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free-text math expression, normalized on edit and validated remotely.
    Expression,
    /// Floating-point number.
    Number,
    /// Integer number.
    Integer,
    /// One of a fixed set of (value, label) choices.
    Select(&'static [(&'static str, &'static str)]),
}

/// One scalar form field.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// `Validators.min` equivalent; fires only when a value is present.
    pub min: Option<f64>,
    /// Strict greater-than bound; fires only when a value is present.
    pub greater_than: Option<f64>,
    /// Filled in on submit when the field was left empty.
    pub default: Option<Value>,
    /// Current edit buffer.
    pub text: String,
}

impl Field {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            min: None,
            greater_than: None,
            default: None,
            text: String::new(),
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    fn greater_than(mut self, bound: f64) -> Self {
        self.greater_than = Some(bound);
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Parses the edit buffer into a JSON value; empty text is null.
    fn value(&self) -> Value {
        if self.text.is_empty() {
            return Value::Null;
        }
        match self.kind {
            FieldKind::Expression | FieldKind::Select(_) => Value::String(self.text.clone()),
            FieldKind::Number => self
                .text
                .parse::<f64>()
                .ok()
                .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number))
                .unwrap_or(Value::Null),
            FieldKind::Integer => self
                .text
                .parse::<i64>()
                .ok()
                .map(|v| json!(v))
                .unwrap_or(Value::Null),
        }
    }

    fn numeric_value(&self) -> Option<f64> {
        self.text.parse::<f64>().ok()
    }

    fn set_from(&mut self, value: &Value) {
        self.text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }

    /// Inline validation message, if any.
    fn error(&self, cache: &ExprCache) -> Option<&'static str> {
        if self.required {
            let result = match self.kind {
                FieldKind::Number | FieldKind::Integer => {
                    validators::required_number(self.numeric_value())
                }
                _ => validators::required(&self.text),
            };
            if let Err(msg) = result {
                return Some(msg);
            }
        }
        if !self.text.is_empty()
            && matches!(self.kind, FieldKind::Number | FieldKind::Integer)
            && self.numeric_value().is_none()
        {
            return Some("Not a valid number");
        }
        if let Some(min) = self.min {
            if let Err(msg) = validators::min(self.numeric_value(), min) {
                return Some(msg);
            }
        }
        if let Some(bound) = self.greater_than {
            if let Err(msg) = validators::greater_than(self.numeric_value(), bound) {
                return Some(msg);
            }
        }
        if matches!(self.kind, FieldKind::Expression) && !self.text.is_empty() {
            match cache.get(&self.text) {
                Some(ExprStatus::Valid) => {}
                Some(ExprStatus::Invalid) => return Some("Expression is not valid"),
                Some(ExprStatus::Pending) | None => return Some("Validating expression..."),
            }
        }
        None
    }
}

/// Keys the matrix block reports its dimensions under.
#[derive(Debug, Clone)]
pub enum SizeKeys {
    /// Square system: a single `matrix_size` field.
    Square(&'static str),
    /// Rectangular system: `matrix_rows` / `matrix_cols`.
    RowsCols(&'static str, &'static str),
}

/// Coefficient matrix plus constants vector for linear-system labs.
#[derive(Debug, Clone)]
pub struct MatrixBlock {
    pub size_keys: SizeKeys,
    pub matrix_key: &'static str,
    pub constants_key: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<String>>,
    pub constants: Vec<String>,
}

const MATRIX_DIM_RANGE: std::ops::RangeInclusive<usize> = 2..=8;

impl MatrixBlock {
    fn new(size_keys: SizeKeys, rows: usize, cols: usize) -> Self {
        Self {
            size_keys,
            matrix_key: "coefficient_matrix",
            constants_key: "constants",
            rows,
            cols,
            cells: vec![vec!["0".to_string(); cols]; rows],
            constants: vec!["0".to_string(); rows],
        }
    }

    fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows.clamp(*MATRIX_DIM_RANGE.start(), *MATRIX_DIM_RANGE.end());
        self.cols = cols.clamp(*MATRIX_DIM_RANGE.start(), *MATRIX_DIM_RANGE.end());
        self.cells.resize(self.rows, vec!["0".to_string(); self.cols]);
        for row in &mut self.cells {
            row.resize(self.cols, "0".to_string());
        }
        self.constants.resize(self.rows, "0".to_string());
    }

    fn is_valid(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .chain(self.constants.iter())
            .all(|cell| cell.parse::<f64>().is_ok())
    }

    fn size_entries(&self) -> Vec<(&'static str, Value)> {
        match self.size_keys {
            SizeKeys::Square(key) => vec![(key, json!(self.rows))],
            SizeKeys::RowsCols(rows_key, cols_key) => {
                vec![(rows_key, json!(self.rows)), (cols_key, json!(self.cols))]
            }
        }
    }

    /// Size keys are client-only; they are skipped on submit.
    fn skip_keys(&self) -> Vec<&'static str> {
        match self.size_keys {
            SizeKeys::Square(key) => vec![key],
            SizeKeys::RowsCols(rows_key, cols_key) => vec![rows_key, cols_key],
        }
    }

    fn matrix_value(&self) -> Value {
        Value::Array(
            self.cells
                .iter()
                .map(|row| Value::Array(row.iter().map(|c| number_or_null(c)).collect()))
                .collect(),
        )
    }

    fn constants_value(&self) -> Value {
        Value::Array(self.constants.iter().map(|c| number_or_null(c)).collect())
    }

    fn set_from(&mut self, input: &LabInput) {
        let rows = read_dim(input, match self.size_keys {
            SizeKeys::Square(key) => key,
            SizeKeys::RowsCols(rows_key, _) => rows_key,
        })
        .unwrap_or(self.rows);
        let cols = match self.size_keys {
            SizeKeys::Square(_) => rows,
            SizeKeys::RowsCols(_, cols_key) => read_dim(input, cols_key).unwrap_or(self.cols),
        };
        self.resize(rows, cols);

        if let Some(Value::Array(matrix)) = input.get(self.matrix_key) {
            for (r, row) in matrix.iter().take(self.rows).enumerate() {
                if let Value::Array(cols) = row {
                    for (c, cell) in cols.iter().take(self.cols).enumerate() {
                        self.cells[r][c] = cell_text(cell);
                    }
                }
            }
        }
        if let Some(Value::Array(constants)) = input.get(self.constants_key) {
            for (r, cell) in constants.iter().take(self.rows).enumerate() {
                self.constants[r] = cell_text(cell);
            }
        }
    }
}

/// Point table (x/y vectors) for interpolation labs.
#[derive(Debug, Clone)]
pub struct PointsBlock {
    pub size_key: &'static str,
    pub size: usize,
    pub x: Vec<String>,
    pub y: Vec<String>,
}

const POINTS_RANGE: std::ops::RangeInclusive<usize> = 2..=12;

impl PointsBlock {
    fn new(size: usize) -> Self {
        Self {
            size_key: "vector_size",
            size,
            x: vec!["0".to_string(); size],
            y: vec!["0".to_string(); size],
        }
    }

    fn resize(&mut self, size: usize) {
        self.size = size.clamp(*POINTS_RANGE.start(), *POINTS_RANGE.end());
        self.x.resize(self.size, "0".to_string());
        self.y.resize(self.size, "0".to_string());
    }

    fn is_valid(&self) -> bool {
        self.x
            .iter()
            .chain(self.y.iter())
            .all(|cell| cell.parse::<f64>().is_ok())
    }

    fn set_from(&mut self, input: &LabInput) {
        if let Some(size) = read_dim(input, self.size_key) {
            self.resize(size);
        }
        if let Some(Value::Array(xs)) = input.get("x") {
            for (i, v) in xs.iter().take(self.size).enumerate() {
                self.x[i] = cell_text(v);
            }
        }
        if let Some(Value::Array(ys)) = input.get("y") {
            for (i, v) in ys.iter().take(self.size).enumerate() {
                self.y[i] = cell_text(v);
            }
        }
    }
}

/// Runtime form state for one lab.
pub struct LabForm {
    pub lab: &'static Lab,
    pub fields: Vec<Field>,
    pub matrix: Option<MatrixBlock>,
    pub points: Option<PointsBlock>,
}

impl LabForm {
    fn new(lab: &'static Lab, fields: Vec<Field>) -> Self {
        Self {
            lab,
            fields,
            matrix: None,
            points: None,
        }
    }

    fn with_matrix(mut self, matrix: MatrixBlock) -> Self {
        self.matrix = Some(matrix);
        self
    }

    fn with_points(mut self, points: PointsBlock) -> Self {
        self.points = Some(points);
        self
    }

    /// Restores the edit buffers from a persisted snapshot.
    pub fn restore(&mut self, snapshot: &LabSnapshot) {
        let Some(input) = &snapshot.input else {
            // No stored input: apply field defaults.
            for field in &mut self.fields {
                if let Some(default) = field.default.clone() {
                    field.set_from(&default);
                }
            }
            return;
        };
        for field in &mut self.fields {
            match input.get(field.key) {
                Some(value) => field.set_from(value),
                None => {
                    if let Some(default) = field.default.clone() {
                        field.set_from(&default);
                    }
                }
            }
        }
        if let Some(matrix) = &mut self.matrix {
            matrix.set_from(input);
        }
        if let Some(points) = &mut self.points {
            points.set_from(input);
        }
    }

    /// The flat input mapping for the store (nulls included for empty fields).
    pub fn to_input(&self) -> LabInput {
        let mut input = Map::new();
        for field in &self.fields {
            input.insert(field.key.to_string(), field.value());
        }
        if let Some(matrix) = &self.matrix {
            for (key, value) in matrix.size_entries() {
                input.insert(key.to_string(), value);
            }
            input.insert(matrix.matrix_key.to_string(), matrix.matrix_value());
            input.insert(matrix.constants_key.to_string(), matrix.constants_value());
        }
        if let Some(points) = &self.points {
            input.insert(points.size_key.to_string(), json!(points.size));
            input.insert(
                "x".to_string(),
                Value::Array(points.x.iter().map(|c| number_or_null(c)).collect()),
            );
            input.insert(
                "y".to_string(),
                Value::Array(points.y.iter().map(|c| number_or_null(c)).collect()),
            );
        }
        input
    }

    /// Request-shaping options for this form.
    ///
    /// Matrix and point forms JSON-encode their vectors and skip the
    /// client-only size keys.
    pub fn calculate_options(&self) -> CalculateOptions {
        let mut skip_keys = Vec::new();
        if let Some(matrix) = &self.matrix {
            skip_keys.extend(matrix.skip_keys());
        }
        if let Some(points) = &self.points {
            skip_keys.push(points.size_key);
        }
        CalculateOptions {
            json: self.matrix.is_some() || self.points.is_some(),
            skip_keys,
        }
    }

    /// True when every field and block passes validation.
    pub fn is_valid(&self, cache: &ExprCache) -> bool {
        self.fields.iter().all(|field| field.error(cache).is_none())
            && self.matrix.as_ref().map_or(true, MatrixBlock::is_valid)
            && self.points.as_ref().map_or(true, PointsBlock::is_valid)
    }

    /// Fills defaults into empty defaulted fields. Called on submit.
    pub fn apply_defaults(&mut self) {
        for field in &mut self.fields {
            if field.text.is_empty() {
                if let Some(default) = field.default.clone() {
                    field.set_from(&default);
                }
            }
        }
    }

    /// Draws the form. Returns true when any value changed this frame.
    ///
    /// `on_expression_edit` is invoked with the normalized text of every
    /// expression field that changed, so the owner can kick off remote
    /// validation.
    pub fn draw(
        &mut self,
        ui: &mut Ui,
        cache: &ExprCache,
        on_expression_edit: &mut dyn FnMut(&str),
    ) -> bool {
        let mut changed = false;

        egui::Grid::new(format!("{}_fields", self.lab.client_url))
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for field in &mut self.fields {
                    ui.label(field.label);
                    match field.kind {
                        FieldKind::Select(choices) => {
                            let selected_label = choices
                                .iter()
                                .find(|(value, _)| *value == field.text)
                                .map(|(_, label)| *label)
                                .unwrap_or("Select...");
                            egui::ComboBox::from_id_salt(field.key)
                                .selected_text(selected_label)
                                .show_ui(ui, |ui| {
                                    for (value, label) in choices {
                                        if ui
                                            .selectable_label(field.text == *value, *label)
                                            .clicked()
                                        {
                                            field.text = (*value).to_string();
                                            changed = true;
                                        }
                                    }
                                });
                        }
                        _ => {
                            let response = ui.text_edit_singleline(&mut field.text);
                            if response.changed() {
                                if matches!(field.kind, FieldKind::Expression) {
                                    field.text = expression::normalize(&field.text);
                                    on_expression_edit(&field.text);
                                }
                                changed = true;
                            }
                        }
                    }
                    if let Some(error) = field.error(cache) {
                        ui.colored_label(egui::Color32::from_rgb(255, 100, 100), error);
                    }
                    ui.end_row();
                }
            });

        if let Some(matrix) = &mut self.matrix {
            changed |= draw_matrix(ui, self.lab.client_url, matrix);
        }
        if let Some(points) = &mut self.points {
            changed |= draw_points(ui, self.lab.client_url, points);
        }

        changed
    }
}

fn draw_matrix(ui: &mut Ui, lab_id: &str, matrix: &mut MatrixBlock) -> bool {
    let mut changed = false;

    ui.separator();
    ui.horizontal(|ui| {
        let mut rows = matrix.rows;
        let mut cols = matrix.cols;
        match matrix.size_keys {
            SizeKeys::Square(_) => {
                ui.label("Matrix size");
                if ui
                    .add(egui::DragValue::new(&mut rows).range(MATRIX_DIM_RANGE))
                    .changed()
                {
                    matrix.resize(rows, rows);
                    changed = true;
                }
            }
            SizeKeys::RowsCols(_, _) => {
                ui.label("Rows");
                let rows_changed = ui
                    .add(egui::DragValue::new(&mut rows).range(MATRIX_DIM_RANGE))
                    .changed();
                ui.label("Columns");
                let cols_changed = ui
                    .add(egui::DragValue::new(&mut cols).range(MATRIX_DIM_RANGE))
                    .changed();
                if rows_changed || cols_changed {
                    matrix.resize(rows, cols);
                    changed = true;
                }
            }
        }
    });

    ui.label("Coefficient matrix");
    egui::Grid::new(format!("{lab_id}_matrix"))
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for row in &mut matrix.cells {
                for cell in row.iter_mut() {
                    changed |= ui
                        .add(egui::TextEdit::singleline(cell).desired_width(48.0))
                        .changed();
                }
                ui.end_row();
            }
        });

    ui.label("Constants");
    egui::Grid::new(format!("{lab_id}_constants"))
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for cell in &mut matrix.constants {
                changed |= ui
                    .add(egui::TextEdit::singleline(cell).desired_width(48.0))
                    .changed();
            }
            ui.end_row();
        });

    if !matrix.is_valid() {
        ui.colored_label(
            egui::Color32::from_rgb(255, 100, 100),
            "All matrix cells must be numbers",
        );
    }

    changed
}

fn draw_points(ui: &mut Ui, lab_id: &str, points: &mut PointsBlock) -> bool {
    let mut changed = false;

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Number of points");
        let mut size = points.size;
        if ui
            .add(egui::DragValue::new(&mut size).range(POINTS_RANGE))
            .changed()
        {
            points.resize(size);
            changed = true;
        }
    });

    egui::Grid::new(format!("{lab_id}_points"))
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            ui.label("x");
            for cell in &mut points.x {
                changed |= ui
                    .add(egui::TextEdit::singleline(cell).desired_width(48.0))
                    .changed();
            }
            ui.end_row();
            ui.label("y");
            for cell in &mut points.y {
                changed |= ui
                    .add(egui::TextEdit::singleline(cell).desired_width(48.0))
                    .changed();
            }
            ui.end_row();
        });

    if !points.is_valid() {
        ui.colored_label(
            egui::Color32::from_rgb(255, 100, 100),
            "All point values must be numbers",
        );
    }

    changed
}

fn number_or_null(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number))
        .unwrap_or(Value::Null)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_dim(input: &LabInput, key: &str) -> Option<usize> {
    input.get(key).and_then(Value::as_u64).map(|v| v as usize)
}
