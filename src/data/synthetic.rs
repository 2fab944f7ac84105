//! Synthetic compartment trees with known parameters.
//!
//! Used to validate the fitter: build a tree with random positive parameters,
//! compute its exact impedances, and check that a fresh tree of the same
//! topology recovers the parameters.

use num_complex::Complex64;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::domain::CompartmentParams;
use crate::error::{FitError, Result};
use crate::tree::CompartmentTree;

/// Ranges the random parameters are drawn from (uniform).
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    pub n_nodes: usize,
    /// Probability that a new node attaches to the most recent node (chain)
    /// instead of a uniformly random earlier node (branching). Must lie in `[0, 1]`.
    pub chain_prob: f64,
    pub ca: (f64, f64),
    pub g_l: (f64, f64),
    pub g_c: (f64, f64),
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            n_nodes: 6,
            chain_prob: 0.6,
            ca: (0.5, 2.0),
            g_l: (0.002, 0.02),
            g_c: (0.01, 0.1),
        }
    }
}

/// Random tree with positive parameters, reproducible from `seed`.
pub fn random_tree(spec: &SyntheticSpec, seed: u64) -> Result<CompartmentTree> {
    if spec.n_nodes == 0 {
        return Err(FitError::EmptyTree);
    }
    for (name, (lo, hi)) in [("ca", spec.ca), ("g_l", spec.g_l), ("g_c", spec.g_c)] {
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi > lo) {
            return Err(FitError::dims("synthetic range", format!("0 < lo < hi for {name}"), format!("({lo}, {hi})")));
        }
    }

    if !(0.0..=1.0).contains(&spec.chain_prob) {
        return Err(FitError::dims("chain probability", "a value in [0, 1]", spec.chain_prob));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let ca = Uniform::new(spec.ca.0, spec.ca.1);
    let g_l = Uniform::new(spec.g_l.0, spec.g_l.1);
    let g_c = Uniform::new(spec.g_c.0, spec.g_c.1);

    let mut tree = CompartmentTree::with_root(CompartmentParams::new(
        ca.sample(&mut rng),
        g_l.sample(&mut rng),
        0.0,
    ));
    for i in 1..spec.n_nodes {
        let parent = if rng.gen_bool(spec.chain_prob) {
            i - 1
        } else {
            rng.gen_range(0..i)
        };
        let params = CompartmentParams::new(ca.sample(&mut rng), g_l.sample(&mut rng), g_c.sample(&mut rng));
        tree.add_node(parent, params)?;
    }
    Ok(tree)
}

/// `[0, iω_1, ..., iω_m]` with `ω` log-spaced between `w_min` and `w_max`.
pub fn imaginary_frequencies(w_min: f64, w_max: f64, steps: usize) -> Result<Vec<Complex64>> {
    if !(w_min.is_finite() && w_max.is_finite() && w_min > 0.0 && w_max > w_min) {
        return Err(FitError::dims(
            "frequency range",
            "0 < w_min < w_max",
            format!("({w_min}, {w_max})"),
        ));
    }
    if steps < 2 {
        return Err(FitError::dims("frequency steps", ">= 2", steps));
    }

    let ln_min = w_min.ln();
    let step = (w_max.ln() - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps + 1);
    out.push(Complex64::new(0.0, 0.0));
    for i in 0..steps {
        out.push(Complex64::new(0.0, (ln_min + step * i as f64).exp()));
    }
    Ok(out)
}
