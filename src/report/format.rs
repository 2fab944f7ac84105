//! Formatted terminal output for fit runs.

use crate::domain::{FitDiagnostics, TwoStageDiagnostics};
use crate::error::{FitError, Result};
use crate::tree::CompartmentTree;

/// Per-node comparison of reference and fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamComparison {
    pub node: usize,
    pub parent: Option<usize>,
    pub reference: [f64; 3],
    pub fitted: [f64; 3],
}

impl ParamComparison {
    /// Largest relative deviation over `g_c`, `g_l`, `ca`.
    ///
    /// The root's `g_c` carries no information and is skipped.
    pub fn max_rel_error(&self) -> f64 {
        let start = if self.parent.is_none() { 1 } else { 0 };
        (start..3)
            .map(|k| rel(self.fitted[k], self.reference[k]))
            .fold(0.0, f64::max)
    }
}

fn rel(value: f64, reference: f64) -> f64 {
    let diff = (value - reference).abs();
    if reference == 0.0 { diff } else { diff / reference.abs() }
}

/// Pair up the nodes of two trees with the same topology.
pub fn compare_params(reference: &CompartmentTree, fitted: &CompartmentTree) -> Result<Vec<ParamComparison>> {
    if reference.parents() != fitted.parents() {
        return Err(FitError::dims(
            "tree topology",
            format!("{:?}", reference.parents()),
            format!("{:?}", fitted.parents()),
        ));
    }
    Ok(reference
        .nodes()
        .zip(fitted.nodes())
        .map(|(r, f)| ParamComparison {
            node: r.index(),
            parent: r.parent(),
            reference: [r.params.g_c, r.params.g_l, r.params.ca],
            fitted: [f.params.g_c, f.params.g_l, f.params.ca],
        })
        .collect())
}

/// Table of reference vs fitted parameters, one row per node.
pub fn format_comparison(rows: &[ParamComparison]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:>6}  {:>12} {:>12}  {:>12} {:>12}  {:>12} {:>12}  {:>9}\n",
        "node", "parent", "g_c", "g_c fit", "g_l", "g_l fit", "ca", "ca fit", "max rel"
    ));
    for row in rows {
        let parent = row.parent.map_or_else(|| "-".to_string(), |p| p.to_string());
        out.push_str(&format!(
            "{:>4} {:>6}  {:>12.6e} {:>12.6e}  {:>12.6e} {:>12.6e}  {:>12.6e} {:>12.6e}  {:>9.2e}\n",
            row.node,
            parent,
            row.reference[0],
            row.fitted[0],
            row.reference[1],
            row.fitted[1],
            row.reference[2],
            row.fitted[2],
            row.max_rel_error(),
        ));
    }
    out
}

pub fn format_diagnostics(label: &str, diag: &FitDiagnostics) -> String {
    let flag = if diag.is_rank_deficient() { " (rank deficient)" } else { "" };
    format!(
        "{label:<12} rows={} params={} rank={} residual={:.3e}{flag}\n",
        diag.rows, diag.params, diag.rank, diag.residual_norm
    )
}

/// Labelled stages of the two-stage fit, for [`format_run_summary`].
pub fn two_stage_labels(diag: &TwoStageDiagnostics) -> [(&'static str, FitDiagnostics); 2] {
    [("conductance", diag.conductance), ("capacitance", diag.capacitance)]
}

/// Full summary of a synthetic validation run.
pub fn format_run_summary(
    reference: &CompartmentTree,
    fitted: &CompartmentTree,
    stages: &[(&str, FitDiagnostics)],
    impedance_error: f64,
) -> Result<String> {
    let rows = compare_params(reference, fitted)?;
    let worst = rows.iter().map(ParamComparison::max_rel_error).fold(0.0, f64::max);

    let mut out = String::new();
    out.push_str("=== ctfit - compartment tree fit ===\n");
    out.push_str(&format!("Nodes: {}\n", reference.len()));
    out.push_str("\nReference tree:\n");
    out.push_str(&reference.to_string());

    out.push_str("\nSolver diagnostics:\n");
    for (label, diag) in stages {
        out.push_str(&format_diagnostics(label, diag));
    }

    out.push_str("\nParameters:\n");
    out.push_str(&format_comparison(&rows));

    out.push_str(&format!("\nMax parameter rel. error: {worst:.3e}\n"));
    out.push_str(&format!("Impedance rel. error    : {impedance_error:.3e}\n"));
    Ok(out)
}

/// Tree dump followed by its conductance matrix.
pub fn format_tree(tree: &CompartmentTree) -> String {
    let mut out = String::new();
    out.push_str(&format!("Nodes: {}\n", tree.len()));
    out.push_str(&tree.to_string());
    out.push_str("\nConductance matrix (uS):\n");
    let g = tree.conductance_matrix();
    for i in 0..g.nrows() {
        let parts: Vec<String> = g.row(i).iter().map(|x| format!("{x:>11.4e}")).collect();
        out.push_str(&parts.join(" "));
        out.push('\n');
    }
    out
}
