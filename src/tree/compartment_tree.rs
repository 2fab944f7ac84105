//! Rooted tree of compartments with a fixed canonical node order.
//!
//! The canonical order is the insertion order: a node's index is the number of
//! nodes inserted before it, and a parent must exist before its children are
//! added. Every matrix produced by the crate uses this order on both axes.

use std::fmt;

use crate::domain::CompartmentParams;
use crate::error::{FitError, Result};
use crate::tree::CompartmentNode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompartmentTree {
    nodes: Vec<CompartmentNode>,
}

impl CompartmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree consisting of a single root compartment.
    pub fn with_root(params: CompartmentParams) -> Self {
        Self {
            nodes: vec![CompartmentNode::new(0, None, params)],
        }
    }

    /// Build a tree from a parent list.
    ///
    /// `parents[0]` must be `None` (the root) and every other entry must point
    /// to an earlier node.
    pub fn from_parents(parents: &[Option<usize>], params: &[CompartmentParams]) -> Result<Self> {
        if parents.len() != params.len() {
            return Err(FitError::dims("parameter list length", parents.len(), params.len()));
        }
        let mut tree = Self::new();
        for (&parent, &p) in parents.iter().zip(params) {
            match parent {
                None => tree.add_root(p)?,
                Some(parent) => tree.add_node(parent, p)?,
            };
        }
        Ok(tree)
    }

    /// Insert the root. Fails if the tree already has one.
    pub fn add_root(&mut self, params: CompartmentParams) -> Result<usize> {
        if !self.nodes.is_empty() {
            return Err(FitError::DuplicateRoot);
        }
        self.nodes.push(CompartmentNode::new(0, None, params));
        Ok(0)
    }

    /// Append a child of `parent` and return its index.
    pub fn add_node(&mut self, parent: usize, params: CompartmentParams) -> Result<usize> {
        if self.nodes.is_empty() {
            return Err(FitError::MissingRoot);
        }
        let len = self.nodes.len();
        if parent >= len {
            return Err(FitError::InvalidParent { parent, len });
        }
        self.nodes.push(CompartmentNode::new(len, Some(parent), params));
        self.nodes[parent].children.push(len);
        Ok(len)
    }

    /// Fresh tree with the same topology and placeholder parameters.
    pub fn with_same_topology(&self) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|node| CompartmentNode {
                params: CompartmentParams::default(),
                ..node.clone()
            })
            .collect();
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&CompartmentNode> {
        self.nodes.first()
    }

    pub fn node(&self, index: usize) -> Option<&CompartmentNode> {
        self.nodes.get(index)
    }

    /// Nodes in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = &CompartmentNode> {
        self.nodes.iter()
    }

    pub fn params(&self, index: usize) -> Option<&CompartmentParams> {
        self.nodes.get(index).map(|n| &n.params)
    }

    pub fn params_mut(&mut self, index: usize) -> Option<&mut CompartmentParams> {
        self.nodes.get_mut(index).map(|n| &mut n.params)
    }

    /// Parent index of every node, in canonical order.
    pub fn parents(&self) -> Vec<Option<usize>> {
        self.nodes.iter().map(|n| n.parent).collect()
    }

    /// Parameters of every node, in canonical order.
    pub fn param_list(&self) -> Vec<CompartmentParams> {
        self.nodes.iter().map(|n| n.params).collect()
    }

    /// Overwrite all parameters at once.
    pub fn set_param_list(&mut self, params: &[CompartmentParams]) -> Result<()> {
        if params.len() != self.nodes.len() {
            return Err(FitError::dims("parameter list length", self.nodes.len(), params.len()));
        }
        for (node, &p) in self.nodes.iter_mut().zip(params) {
            node.params = p;
        }
        Ok(())
    }

    /// Pre-order depth-first walk from the root, children in insertion order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        let stack = if self.nodes.is_empty() { Vec::new() } else { vec![0] };
        DepthFirst { tree: self, stack }
    }

    /// Number of edges between `index` and the root.
    pub fn depth(&self, index: usize) -> Option<usize> {
        let mut node = self.nodes.get(index)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = &self.nodes[parent];
            depth += 1;
        }
        Some(depth)
    }
}

/// Iterator returned by [`CompartmentTree::depth_first`].
pub struct DepthFirst<'a> {
    tree: &'a CompartmentTree,
    stack: Vec<usize>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a CompartmentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl fmt::Display for CompartmentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.depth_first() {
            let depth = self.depth(node.index).unwrap_or(0);
            writeln!(f, "{}{}", "  ".repeat(depth), node)?;
        }
        Ok(())
    }
}
