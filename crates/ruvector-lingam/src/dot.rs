//! Graphviz DOT export of a discovered structure.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{LingamError, ValidationError};
use crate::types::{AdjacencyMatrix, CausalOrdering};

/// Rendering options for [`to_dot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotOptions {
    /// Edges with `|b| < min_abs_weight` are omitted. Default: `0.0`.
    pub min_abs_weight: f64,
    /// Decimal places of edge labels. Default: `3`.
    pub precision: usize,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            min_abs_weight: 0.0,
            precision: 3,
        }
    }
}

/// Render `(ordering, adjacency)` as a DOT digraph.
///
/// Nodes are emitted in ordering order; one `parent -> child` edge is
/// emitted per nonzero weight passing `options.min_abs_weight`. `labels`
/// defaults to `x0..x{n-1}`.
///
/// # Errors
///
/// [`LingamError::InvalidInput`] if `labels` or `adjacency` does not match
/// the ordering length.
///
/// # Example
///
/// ```rust
/// use ruvector_lingam::dot::{to_dot, DotOptions};
/// use ruvector_lingam::types::{AdjacencyMatrix, CausalOrdering};
///
/// let ordering = CausalOrdering::new(vec![0, 1]).unwrap();
/// let b = AdjacencyMatrix::zeros(2);
/// let dot = to_dot(&ordering, &b, None, &DotOptions::default()).unwrap();
/// assert!(dot.starts_with("digraph"));
/// ```
pub fn to_dot(
    ordering: &CausalOrdering,
    adjacency: &AdjacencyMatrix,
    labels: Option<&[String]>,
    options: &DotOptions,
) -> Result<String, LingamError> {
    let n = ordering.len();
    if adjacency.dim() != n {
        return Err(ValidationError::DimensionMismatch(format!(
            "adjacency is {0}x{0} but ordering has {n} variables",
            adjacency.dim(),
        ))
        .into());
    }
    let names: Vec<String> = match labels {
        Some(labels) if labels.len() != n => {
            return Err(ValidationError::DimensionMismatch(format!(
                "{} labels for {n} variables",
                labels.len(),
            ))
            .into());
        }
        Some(labels) => labels.iter().map(|l| escape(l)).collect(),
        None => (0..n).map(|i| format!("x{i}")).collect(),
    };

    let mut out = String::from("digraph lingam {\n");
    for &v in ordering.as_slice() {
        let _ = writeln!(out, "    n{v} [label=\"{}\"];", names[v]);
    }
    for &child in ordering.as_slice() {
        for (parent, &w) in adjacency.row(child).iter().enumerate() {
            if w == 0.0 || w.abs() < options.min_abs_weight {
                continue;
            }
            let _ = writeln!(
                out,
                "    n{parent} -> n{child} [label=\"{w:.prec$}\"];",
                prec = options.precision,
            );
        }
    }
    out.push_str("}\n");
    Ok(out)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
