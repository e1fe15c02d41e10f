//! Static catalog of available labs.
//!
//! A lab is one selectable numerical method with its own form and remote
//! endpoint. The catalog is fixed at build time; labs are never created or
//! destroyed at runtime. `client_url` doubles as the lab id and storage key
//! suffix, `api_url` is the server endpoint slug.

use once_cell::sync::Lazy;

/// One selectable numerical method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lab {
    pub name: &'static str,
    pub description: &'static str,
    /// Lab id, also the persisted snapshot key suffix.
    pub client_url: &'static str,
    /// Server endpoint slug appended to the API base URL.
    pub api_url: &'static str,
    pub kind: LabKind,
}

/// Category a lab belongs to, used to group the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabKind {
    NonLinearEquation,
    SystemOfLinearEquations,
    Interpolation,
    Integration,
    Functions,
}

impl LabKind {
    pub fn label(&self) -> &'static str {
        match self {
            LabKind::NonLinearEquation => "Non-Linear Equation",
            LabKind::SystemOfLinearEquations => "System of Linear Equations",
            LabKind::Interpolation => "Interpolation",
            LabKind::Integration => "Integration",
            LabKind::Functions => "Functions",
        }
    }
}

/// Sidebar group display order.
pub const LAB_GROUPS_ORDER: [LabKind; 5] = [
    LabKind::NonLinearEquation,
    LabKind::SystemOfLinearEquations,
    LabKind::Interpolation,
    LabKind::Integration,
    LabKind::Functions,
];

pub static LABS: Lazy<Vec<Lab>> = Lazy::new(|| {
    vec![
        Lab {
            name: "Newton's Method",
            description: "Find the root of the equation using Newton's Method.",
            client_url: "newtons-method",
            api_url: "newtons_method",
            kind: LabKind::NonLinearEquation,
        },
        Lab {
            name: "Secant Method",
            description: "Find the root of the equation using the Secant Method.",
            client_url: "secant-method",
            api_url: "secant_method",
            kind: LabKind::NonLinearEquation,
        },
        Lab {
            name: "Simple Iteration",
            description: "Find the root of the equation using the Simple Iteration Method.",
            client_url: "simple-iteration",
            api_url: "simple_iteration",
            kind: LabKind::NonLinearEquation,
        },
        Lab {
            name: "Fixed-Point Iteration Method",
            description: "Find the root of the equation using the Fixed-Point Iteration Method.",
            client_url: "fixed-point-iteration-method",
            api_url: "fixed_point_iteration_method",
            kind: LabKind::NonLinearEquation,
        },
        Lab {
            name: "Gaussian Elimination Method",
            description: "Solve a system of linear equations using the Gaussian Elimination Method.",
            client_url: "gaussian-elimination-method",
            api_url: "gaussian_elimination_method",
            kind: LabKind::SystemOfLinearEquations,
        },
        Lab {
            name: "Least Squares Method",
            description: "Solve a system of linear equations using the Least Squares Method.",
            client_url: "least-squares-method",
            api_url: "least_squares_method",
            kind: LabKind::SystemOfLinearEquations,
        },
        Lab {
            name: "Fixed Point Iteration Method",
            description: "Solve a system of linear equations using the Fixed Point Iteration Method.",
            client_url: "fixed-point-iteration-system-method",
            api_url: "fixed_point_iteration_system_method",
            kind: LabKind::SystemOfLinearEquations,
        },
        Lab {
            name: "Newton's Interpolation Method",
            description: "Plot a polynomial using Newton's Interpolation Method.",
            client_url: "newtons-interpolation-method",
            api_url: "newtons_interpolation_method",
            kind: LabKind::Interpolation,
        },
        Lab {
            name: "Lagrange's Interpolation Method",
            description: "Plot a polynomial using Lagrange's Interpolation Method.",
            client_url: "lagranges-interpolation-method",
            api_url: "lagranges_interpolation_method",
            kind: LabKind::Interpolation,
        },
        Lab {
            name: "Rectangles Rule",
            description: "Integrate a function using the Rectangles Rule.",
            client_url: "rectangles-rule",
            api_url: "rectangles_rule",
            kind: LabKind::Integration,
        },
        Lab {
            name: "Trapezoidal Rule",
            description: "Integrate a function using the Trapezoidal Rule.",
            client_url: "trapezoidal-rule",
            api_url: "trapezoidal_rule",
            kind: LabKind::Integration,
        },
        Lab {
            name: "Simpson's Rule",
            description: "Integrate a function using Simpson's Rule.",
            client_url: "simpsons-rule",
            api_url: "simpsons_rule",
            kind: LabKind::Integration,
        },
        Lab {
            name: "Numerical Operations",
            description: "Compute a basic numerical operation on two operands.",
            client_url: "numerical-operations",
            api_url: "numerical_operations",
            kind: LabKind::Functions,
        },
    ]
});

/// Looks a lab up by its id.
pub fn lab_by_id(lab_id: &str) -> Option<&'static Lab> {
    LABS.iter().find(|lab| lab.client_url == lab_id)
}

/// Labs grouped by kind in sidebar order. Empty groups are skipped.
pub fn grouped() -> Vec<(LabKind, Vec<&'static Lab>)> {
    LAB_GROUPS_ORDER
        .iter()
        .filter_map(|kind| {
            let labs: Vec<&Lab> = LABS.iter().filter(|lab| lab.kind == *kind).collect();
            if labs.is_empty() {
                None
            } else {
                Some((*kind, labs))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lab_ids_are_unique() {
        let mut seen = HashSet::new();
        for lab in LABS.iter() {
            assert!(seen.insert(lab.client_url), "duplicate id {}", lab.client_url);
        }
    }

    #[test]
    fn lookup_by_id_finds_known_labs() {
        let lab = lab_by_id("newtons-method").unwrap();
        assert_eq!(lab.api_url, "newtons_method");
        assert!(lab_by_id("unknown-method").is_none());
    }

    #[test]
    fn catalog_has_every_root_finding_method() {
        for id in [
            "newtons-method",
            "secant-method",
            "simple-iteration",
            "fixed-point-iteration-method",
        ] {
            let lab = lab_by_id(id).unwrap_or_else(|| panic!("{id} missing from catalog"));
            assert_eq!(lab.kind, LabKind::NonLinearEquation);
        }
        assert_eq!(lab_by_id("secant-method").map(|l| l.api_url), Some("secant_method"));
    }

    #[test]
    fn groups_follow_the_display_order() {
        let groups = grouped();
        assert_eq!(groups.first().map(|(k, _)| *k), Some(LabKind::NonLinearEquation));
        let kinds: Vec<LabKind> = groups.iter().map(|(k, _)| *k).collect();
        let order_positions: Vec<usize> = kinds
            .iter()
            .map(|k| LAB_GROUPS_ORDER.iter().position(|o| o == k).unwrap())
            .collect();
        let mut sorted = order_positions.clone();
        sorted.sort_unstable();
        assert_eq!(order_positions, sorted);
    }

    #[test]
    fn every_lab_is_in_exactly_one_group() {
        let total: usize = grouped().iter().map(|(_, labs)| labs.len()).sum();
        assert_eq!(total, LABS.len());
    }
}
