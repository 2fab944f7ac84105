//! A single compartment of a `CompartmentTree`.

use std::fmt;

use crate::domain::CompartmentParams;

/// Tree node carrying the electrical parameters of one compartment.
///
/// Parent and children are stored as indices into the owning tree, so a node
/// is only meaningful together with its tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentNode {
    pub(crate) index: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub params: CompartmentParams,
}

impl CompartmentNode {
    pub(crate) fn new(index: usize, parent: Option<usize>, params: CompartmentParams) -> Self {
        Self {
            index,
            parent,
            children: Vec::new(),
            params,
        }
    }

    /// Position in the canonical order; row/column in every matrix.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for CompartmentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}", self.index)?;
        if let Some(parent) = self.parent {
            write!(f, ", Parent: Node {parent}")?;
        }
        write!(
            f,
            " --- (g_c = {} uS, g_l = {} uS, c = {} uF)",
            self.params.g_c, self.params.g_l, self.params.ca
        )
    }
}
