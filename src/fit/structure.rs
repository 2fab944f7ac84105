//! Structure tensors: the linear basis behind every fit.
//!
//! Every entry of the conductance (or system) matrix is a linear combination of
//! the unknown parameters. A structure tensor `S` of shape `(n, n, p)` stores
//! that combination: for the parameter vector `v` read with the same layout,
//! `Σ_k v[k] S[:,:,k]` is the matrix itself.
//!
//! We store `S` as one `n×n` slice per parameter. The unit contribution of each
//! parameter kind is:
//!
//! - coupling of node `i` to parent `j`: `+1` at `(i,i)`, `(j,j)`; `-1` at `(i,j)`, `(j,i)`
//! - leak of node `i`: `+1` at `(i,i)`
//! - capacitance of node `i`: `+freq` at `(i,i)`

use nalgebra::{ComplexField, DMatrix, DVector};
use num_complex::Complex64;

use crate::domain::{ParamFamily, ParamKind};
use crate::error::{FitError, Result};
use crate::fit::layout::ParamLayout;
use crate::tree::CompartmentTree;

#[derive(Debug, Clone, PartialEq)]
pub struct StructureTensor<T: ComplexField<RealField = f64>> {
    n: usize,
    slices: Vec<DMatrix<T>>,
}

impl<T: ComplexField<RealField = f64>> StructureTensor<T> {
    pub fn n_nodes(&self) -> usize {
        self.n
    }

    pub fn n_params(&self) -> usize {
        self.slices.len()
    }

    /// `S[:,:,k]`.
    pub fn slice(&self, k: usize) -> &DMatrix<T> {
        &self.slices[k]
    }

    pub fn slices(&self) -> &[DMatrix<T>] {
        &self.slices
    }

    /// `S[i,j,k]`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> T {
        self.slices[k][(i, j)].clone()
    }

    /// `Σ_k v[k] S[:,:,k]`.
    pub fn reconstruct(&self, v: &DVector<T>) -> Result<DMatrix<T>> {
        if v.len() != self.slices.len() {
            return Err(FitError::dims("parameter vector length", self.slices.len(), v.len()));
        }
        let mut out = DMatrix::zeros(self.n, self.n);
        for (slice, vk) in self.slices.iter().zip(v.iter()) {
            out += slice * vk.clone();
        }
        Ok(out)
    }
}

/// Structure tensor of the conductance matrix, shape `(n, n, 2n-1)`.
pub fn conductance_structure(tree: &CompartmentTree, layout: &ParamLayout) -> Result<StructureTensor<f64>> {
    expect_family(layout, ParamFamily::Conductance)?;
    build_structure(tree, layout, 0.0)
}

/// Per-frequency structure tensors of the system matrix.
///
/// With a capacitance layout this is the `(n_freqs, n, n, n)` capacitance
/// tensor; with a combined layout it holds conductances and capacitances.
pub fn frequency_structures(
    tree: &CompartmentTree,
    layout: &ParamLayout,
    freqs: &[Complex64],
) -> Result<Vec<StructureTensor<Complex64>>> {
    if layout.family() == ParamFamily::Conductance {
        return Err(FitError::dims(
            "structure family",
            "capacitance or combined",
            "conductance",
        ));
    }
    freqs
        .iter()
        .map(|&freq| build_structure(tree, layout, freq))
        .collect()
}

fn expect_family(layout: &ParamLayout, family: ParamFamily) -> Result<()> {
    if layout.family() != family {
        return Err(FitError::dims(
            "structure family",
            format!("{family:?}"),
            format!("{:?}", layout.family()),
        ));
    }
    Ok(())
}

fn build_structure<T: ComplexField<RealField = f64>>(
    tree: &CompartmentTree,
    layout: &ParamLayout,
    freq: T,
) -> Result<StructureTensor<T>> {
    let n = tree.len();
    let one = T::from_real(1.0);
    let mut slices = Vec::with_capacity(layout.len());

    for slot in layout.slots() {
        let node = tree.node(slot.node).ok_or(FitError::InvalidParent {
            parent: slot.node,
            len: n,
        })?;
        let ii = node.index();
        let mut s = DMatrix::<T>::zeros(n, n);
        match slot.kind {
            ParamKind::Coupling => {
                if let Some(jj) = node.parent() {
                    s[(ii, jj)] -= one.clone();
                    s[(jj, ii)] -= one.clone();
                    s[(jj, jj)] += one.clone();
                    s[(ii, ii)] += one.clone();
                }
            }
            ParamKind::Leak => s[(ii, ii)] += one.clone(),
            ParamKind::Capacitance => s[(ii, ii)] += freq.clone(),
        }
        slices.push(s);
    }

    Ok(StructureTensor { n, slices })
}
