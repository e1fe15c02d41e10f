//! Per-lab form definitions.
//!
//! One constructor per numerical method, declaring the exact field set,
//! defaults, and validation bounds the corresponding endpoint expects.

use super::{Field, FieldKind, LabForm, MatrixBlock, PointsBlock, SizeKeys};
use crate::lab::Lab;
use serde_json::json;

const DEFAULT_TOLERANCE: f64 = 1e-6;
const DEFAULT_MAX_ITERATIONS: i64 = 100;

const RULE_TYPES: &[(&str, &str)] = &[
    ("left", "Left"),
    ("middle", "Middle"),
    ("right", "Right"),
];

const OPERATIONS: &[(&str, &str)] = &[
    ("add", "Add"),
    ("subtract", "Subtract"),
    ("multiply", "Multiply"),
    ("divide", "Divide"),
    ("power", "Power"),
    ("mod", "Modulo"),
    ("floor_divide", "Floor Divide"),
];

/// Builds the form for a lab.
pub fn form_for(lab: &'static Lab) -> LabForm {
    match lab.client_url {
        "newtons-method" => newtons_method(lab),
        "secant-method" => secant_method(lab),
        "simple-iteration" => simple_iteration(lab),
        "fixed-point-iteration-method" => fixed_point_iteration(lab),
        "gaussian-elimination-method" => gaussian_elimination(lab),
        "least-squares-method" => least_squares(lab),
        "fixed-point-iteration-system-method" => fixed_point_system(lab),
        "newtons-interpolation-method" | "lagranges-interpolation-method" => interpolation(lab),
        "rectangles-rule" => rectangles_rule(lab),
        "trapezoidal-rule" | "simpsons-rule" => integration(lab),
        "numerical-operations" => numerical_operations(lab),
        other => {
            // The catalog and this module are updated together; an unknown id
            // yields an empty form rather than a panic.
            log::error!("No form definition for lab '{}'", other);
            LabForm::new(lab, Vec::new())
        }
    }
}

fn tolerance_field() -> Field {
    Field::new("tol", "Tolerance", FieldKind::Number)
        .greater_than(0.0)
        .default_value(json!(DEFAULT_TOLERANCE))
}

fn max_iterations_field() -> Field {
    Field::new("max_iter", "Max iterations", FieldKind::Integer)
        .min(1.0)
        .default_value(json!(DEFAULT_MAX_ITERATIONS))
}

fn newtons_method(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("f_string", "f(x)", FieldKind::Expression).required(),
            Field::new("df_string", "f'(x)", FieldKind::Expression).required(),
            Field::new("x0", "Initial guess", FieldKind::Number).required(),
            tolerance_field(),
            max_iterations_field(),
        ],
    )
}

fn secant_method(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("f_string", "f(x)", FieldKind::Expression).required(),
            Field::new("x0", "First guess", FieldKind::Number).required(),
            Field::new("x1", "Second guess", FieldKind::Number).required(),
            tolerance_field(),
            max_iterations_field(),
        ],
    )
}

fn simple_iteration(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("f_string", "f(x)", FieldKind::Expression).required(),
            Field::new("x0", "Initial guess", FieldKind::Number).required(),
            tolerance_field(),
            max_iterations_field(),
        ],
    )
}

fn fixed_point_iteration(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("f_string", "f(x)", FieldKind::Expression)
                .required()
                .default_value(json!("x**2-4")),
            Field::new("x0", "Initial guess", FieldKind::Number)
                .required()
                .default_value(json!(3)),
            tolerance_field(),
            max_iterations_field(),
        ],
    )
}

fn gaussian_elimination(lab: &'static Lab) -> LabForm {
    LabForm::new(lab, Vec::new()).with_matrix(MatrixBlock::new(SizeKeys::Square("matrix_size"), 3, 3))
}

fn least_squares(lab: &'static Lab) -> LabForm {
    LabForm::new(lab, Vec::new()).with_matrix(MatrixBlock::new(
        SizeKeys::RowsCols("matrix_rows", "matrix_cols"),
        3,
        3,
    ))
}

fn fixed_point_system(lab: &'static Lab) -> LabForm {
    LabForm::new(lab, vec![tolerance_field(), max_iterations_field()]).with_matrix(
        MatrixBlock::new(SizeKeys::Square("matrix_size"), 3, 3),
    )
}

fn interpolation(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("number_of_points", "Plot resolution", FieldKind::Integer)
                .min(2.0)
                .default_value(json!(100)),
            Field::new("x_value", "Evaluate at x", FieldKind::Number).default_value(json!(0)),
        ],
    )
    .with_points(PointsBlock::new(4))
}

fn rectangles_rule(lab: &'static Lab) -> LabForm {
    let mut form = integration(lab);
    form.fields.push(
        Field::new("rule_type", "Rule type", FieldKind::Select(RULE_TYPES))
            .default_value(json!("middle")),
    );
    form
}

fn integration(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("f_string", "f(x)", FieldKind::Expression)
                .required()
                .default_value(json!("x**2")),
            Field::new("a", "Lower bound", FieldKind::Number)
                .required()
                .default_value(json!(0)),
            Field::new("b", "Upper bound", FieldKind::Number)
                .required()
                .default_value(json!(10)),
            Field::new(
                "number_of_interval_partitions",
                "Partitions",
                FieldKind::Integer,
            )
            .min(1.0)
            .default_value(json!(10000)),
        ],
    )
}

fn numerical_operations(lab: &'static Lab) -> LabForm {
    LabForm::new(
        lab,
        vec![
            Field::new("a", "Operand a", FieldKind::Number).required(),
            Field::new("op", "Operation", FieldKind::Select(OPERATIONS))
                .required()
                .default_value(json!("add")),
            Field::new("b", "Operand b", FieldKind::Number).required(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::LABS;

    #[test]
    fn every_lab_has_a_form_definition() {
        for lab in LABS.iter() {
            let form = form_for(lab);
            let has_content =
                !form.fields.is_empty() || form.matrix.is_some() || form.points.is_some();
            assert!(has_content, "lab '{}' has an empty form", lab.client_url);
        }
    }

    #[test]
    fn matrix_labs_use_json_query_encoding() {
        for id in [
            "gaussian-elimination-method",
            "least-squares-method",
            "fixed-point-iteration-system-method",
        ] {
            let lab = crate::lab::lab_by_id(id).unwrap();
            assert!(form_for(lab).calculate_options().json, "lab '{}'", id);
        }
    }

    #[test]
    fn secant_form_takes_two_initial_guesses() {
        let lab = crate::lab::lab_by_id("secant-method").unwrap();
        let form = form_for(lab);
        let keys: Vec<&str> = form.fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["f_string", "x0", "x1", "tol", "max_iter"]);
        assert!(form.fields.iter().take(3).all(|f| f.required));
    }

    #[test]
    fn scalar_labs_use_plain_query_encoding() {
        let lab = crate::lab::lab_by_id("newtons-method").unwrap();
        let options = form_for(lab).calculate_options();
        assert!(!options.json);
        assert!(options.skip_keys.is_empty());
    }
}
