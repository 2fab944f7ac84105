//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - stored on tree nodes during fitting
//! - exported to JSON snapshots
//! - compared in reports

use serde::{Deserialize, Serialize};

/// Placeholder capacitance (uF) of a freshly created compartment.
pub const DEFAULT_CA: f64 = 1.0;
/// Placeholder coupling conductance (uS) of a freshly created compartment.
pub const DEFAULT_G_C: f64 = 0.0;
/// Placeholder leak conductance (uS) of a freshly created compartment.
pub const DEFAULT_G_L: f64 = 1e-2;

/// Electrical parameters of a single compartment.
///
/// Units follow the usual reduced-model convention: capacitance in uF and
/// conductances in uS, so that `freq * ca` and `g` share units when frequencies
/// are given in 1/ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentParams {
    /// Membrane capacitance.
    pub ca: f64,
    /// Leak conductance.
    pub g_l: f64,
    /// Coupling conductance to the parent compartment. Ignored at the root.
    pub g_c: f64,
}

impl Default for CompartmentParams {
    fn default() -> Self {
        Self {
            ca: DEFAULT_CA,
            g_l: DEFAULT_G_L,
            g_c: DEFAULT_G_C,
        }
    }
}

impl CompartmentParams {
    pub fn new(ca: f64, g_l: f64, g_c: f64) -> Self {
        Self { ca, g_l, g_c }
    }

    /// Read the value stored for `kind`.
    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::Coupling => self.g_c,
            ParamKind::Leak => self.g_l,
            ParamKind::Capacitance => self.ca,
        }
    }

    /// Overwrite the value stored for `kind`.
    pub fn set(&mut self, kind: ParamKind, value: f64) {
        match kind {
            ParamKind::Coupling => self.g_c = value,
            ParamKind::Leak => self.g_l = value,
            ParamKind::Capacitance => self.ca = value,
        }
    }

    /// True if the conductances are still the values a fresh node is created with.
    pub fn has_placeholder_conductances(&self) -> bool {
        self.g_l == DEFAULT_G_L && self.g_c == DEFAULT_G_C
    }
}

/// Which scalar of a compartment a fit parameter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Coupling,
    Leak,
    Capacitance,
}

impl ParamKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ParamKind::Coupling => "g_c",
            ParamKind::Leak => "g_l",
            ParamKind::Capacitance => "ca",
        }
    }
}

/// Which parameters a fit solves for.
///
/// Each family fixes the per-node list of unknowns (see `fit::layout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamFamily {
    /// Coupling and leak conductances (steady state).
    Conductance,
    /// Capacitances only (conductances held fixed).
    Capacitance,
    /// Conductances and capacitances at once (experimental).
    Combined,
}

impl ParamFamily {
    /// Unknowns contributed by the root node, in slot order.
    pub fn root_kinds(self) -> &'static [ParamKind] {
        match self {
            ParamFamily::Conductance => &[ParamKind::Leak],
            ParamFamily::Capacitance => &[ParamKind::Capacitance],
            ParamFamily::Combined => &[ParamKind::Leak, ParamKind::Capacitance],
        }
    }

    /// Unknowns contributed by every non-root node, in slot order.
    pub fn child_kinds(self) -> &'static [ParamKind] {
        match self {
            ParamFamily::Conductance => &[ParamKind::Coupling, ParamKind::Leak],
            ParamFamily::Capacitance => &[ParamKind::Capacitance],
            ParamFamily::Combined => &[
                ParamKind::Coupling,
                ParamKind::Leak,
                ParamKind::Capacitance,
            ],
        }
    }
}

/// Solver diagnostics for a single least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// Rows of the flattened feature matrix.
    pub rows: usize,
    /// Number of unknowns (columns).
    pub params: usize,
    /// Numerical rank of the feature matrix.
    pub rank: usize,
    /// Euclidean norm of `A x - b` at the solution.
    pub residual_norm: f64,
}

impl FitDiagnostics {
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.params
    }
}

/// Diagnostics of the two-stage conductance-then-capacitance fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoStageDiagnostics {
    pub conductance: FitDiagnostics,
    pub capacitance: FitDiagnostics,
}
