//! Flat parameter-vector layout.
//!
//! A fit solves for a flat vector `x`. `ParamLayout` is the explicit map between
//! `(node index, ParamKind)` and a slot of `x`. It is built once per tree and
//! fit family, and both the structure-tensor builder and the write-back read
//! it, so the two directions cannot drift apart.
//!
//! Slots are assigned in canonical node order, using the family's per-node kind
//! list (`ParamFamily::root_kinds` / `child_kinds`). For the conductance family
//! this gives root leak at 0 and, for node `i > 0`, coupling at `2i-1` and leak
//! at `2i`.

use std::collections::HashMap;

use nalgebra::DVector;

use crate::domain::{ParamFamily, ParamKind};
use crate::error::{FitError, Result};
use crate::tree::CompartmentTree;

/// One entry of the flat parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSlot {
    pub node: usize,
    pub kind: ParamKind,
}

#[derive(Debug, Clone)]
pub struct ParamLayout {
    family: ParamFamily,
    slots: Vec<ParamSlot>,
    lookup: HashMap<(usize, ParamKind), usize>,
}

impl ParamLayout {
    pub fn new(tree: &CompartmentTree, family: ParamFamily) -> Self {
        let mut slots = Vec::new();
        for node in tree.nodes() {
            let kinds = if node.is_root() {
                family.root_kinds()
            } else {
                family.child_kinds()
            };
            slots.extend(kinds.iter().map(|&kind| ParamSlot {
                node: node.index(),
                kind,
            }));
        }
        let lookup = slots
            .iter()
            .enumerate()
            .map(|(k, s)| ((s.node, s.kind), k))
            .collect();
        Self {
            family,
            slots,
            lookup,
        }
    }

    pub fn family(&self) -> ParamFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ParamSlot] {
        &self.slots
    }

    /// Slot of `kind` at `node`, if the family fits it there.
    pub fn slot(&self, node: usize, kind: ParamKind) -> Option<usize> {
        self.lookup.get(&(node, kind)).copied()
    }

    /// Current tree parameters as a flat vector.
    pub fn read(&self, tree: &CompartmentTree) -> Result<DVector<f64>> {
        let mut values = DVector::zeros(self.len());
        for (k, slot) in self.slots.iter().enumerate() {
            let params = tree.params(slot.node).ok_or(FitError::InvalidParent {
                parent: slot.node,
                len: tree.len(),
            })?;
            values[k] = params.get(slot.kind);
        }
        Ok(values)
    }

    /// Write a flat vector back onto the tree. Parameters outside the layout are untouched.
    pub fn write(&self, tree: &mut CompartmentTree, values: &DVector<f64>) -> Result<()> {
        if values.len() != self.len() {
            return Err(FitError::dims("parameter vector length", self.len(), values.len()));
        }
        let len = tree.len();
        for (slot, &value) in self.slots.iter().zip(values.iter()) {
            let params = tree.params_mut(slot.node).ok_or(FitError::InvalidParent {
                parent: slot.node,
                len,
            })?;
            params.set(slot.kind, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompartmentParams;

    fn chain(n: usize) -> CompartmentTree {
        let parents: Vec<Option<usize>> = (0..n).map(|i| i.checked_sub(1)).collect();
        CompartmentTree::from_parents(&parents, &vec![CompartmentParams::default(); n]).unwrap()
    }

    #[test]
    fn conductance_layout_matches_interleaved_indexing() {
        let tree = chain(4);
        let layout = ParamLayout::new(&tree, ParamFamily::Conductance);
        assert_eq!(layout.len(), 2 * 4 - 1);
        assert_eq!(layout.slot(0, ParamKind::Leak), Some(0));
        assert_eq!(layout.slot(0, ParamKind::Coupling), None);
        for i in 1..4 {
            assert_eq!(layout.slot(i, ParamKind::Coupling), Some(2 * i - 1));
            assert_eq!(layout.slot(i, ParamKind::Leak), Some(2 * i));
        }
    }

    #[test]
    fn capacitance_layout_is_node_index() {
        let tree = chain(3);
        let layout = ParamLayout::new(&tree, ParamFamily::Capacitance);
        assert_eq!(layout.len(), 3);
        for i in 0..3 {
            assert_eq!(layout.slot(i, ParamKind::Capacitance), Some(i));
        }
    }

    #[test]
    fn combined_layout_strides_by_three() {
        let tree = chain(3);
        let layout = ParamLayout::new(&tree, ParamFamily::Combined);
        assert_eq!(layout.len(), 2 + 3 * 2);
        assert_eq!(layout.slot(0, ParamKind::Leak), Some(0));
        assert_eq!(layout.slot(0, ParamKind::Capacitance), Some(1));
        assert_eq!(layout.slot(2, ParamKind::Coupling), Some(5));
        assert_eq!(layout.slot(2, ParamKind::Leak), Some(6));
        assert_eq!(layout.slot(2, ParamKind::Capacitance), Some(7));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut tree = chain(3);
        let layout = ParamLayout::new(&tree, ParamFamily::Combined);
        let values = DVector::from_iterator(layout.len(), (0..layout.len()).map(|k| 0.1 * (k + 1) as f64));
        layout.write(&mut tree, &values).unwrap();
        assert_eq!(layout.read(&tree).unwrap(), values);

        // The root's coupling is not part of any layout and stays untouched.
        assert_eq!(tree.params(0).unwrap().g_c, CompartmentParams::default().g_c);
        assert!(layout.write(&mut tree, &DVector::zeros(2)).is_err());
    }
}
