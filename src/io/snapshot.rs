//! Read/write parameter snapshots (JSON).
//!
//! Fits overwrite node parameters in place. A snapshot is the portable record
//! of a tree: its parent list plus the parameters of every node, in canonical
//! order. It lets callers keep a previous fit and rebuild or restore it later.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::CompartmentParams;
use crate::error::{FitError, Result};
use crate::tree::CompartmentTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub tool: String,
    /// Parent of each node; `None` for the root.
    pub parents: Vec<Option<usize>>,
    pub params: Vec<CompartmentParams>,
}

impl CompartmentTree {
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            tool: "ctfit".to_string(),
            parents: self.parents(),
            params: self.param_list(),
        }
    }

    /// Rebuild a tree from a snapshot.
    pub fn from_snapshot(snapshot: &ParamSnapshot) -> Result<Self> {
        Self::from_parents(&snapshot.parents, &snapshot.params)
    }

    /// Overwrite the parameters with those of `snapshot`.
    ///
    /// The snapshot must describe the same topology.
    pub fn restore_params(&mut self, snapshot: &ParamSnapshot) -> Result<()> {
        if snapshot.parents != self.parents() {
            return Err(FitError::dims(
                "snapshot topology",
                format!("{:?}", self.parents()),
                format!("{:?}", snapshot.parents),
            ));
        }
        self.set_param_list(&snapshot.params)
    }
}

/// Write a snapshot JSON file.
pub fn write_snapshot_json(path: &Path, snapshot: &ParamSnapshot) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), snapshot)?;
    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_snapshot_json(path: &Path) -> Result<ParamSnapshot> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> CompartmentTree {
        CompartmentTree::from_parents(
            &[None, Some(0), Some(0)],
            &[
                CompartmentParams::new(1.0, 0.01, 0.0),
                CompartmentParams::new(0.5, 0.02, 0.03),
                CompartmentParams::new(0.25, 0.04, 0.05),
            ],
        )
        .unwrap()
    }

    #[test]
    fn snapshot_rebuilds_the_same_tree() {
        let t = tree();
        let rebuilt = CompartmentTree::from_snapshot(&t.snapshot()).unwrap();
        assert_eq!(rebuilt, t);
    }

    #[test]
    fn restore_undoes_a_refit() {
        let mut t = tree();
        let before = t.snapshot();
        t.params_mut(2).unwrap().g_c = 9.0;
        t.restore_params(&before).unwrap();
        assert_eq!(t, tree());

        let other = CompartmentTree::with_root(CompartmentParams::default()).snapshot();
        assert!(t.restore_params(&other).is_err());
    }

    #[test]
    fn snapshot_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let snap = tree().snapshot();
        write_snapshot_json(&path, &snap).unwrap();
        assert_eq!(read_snapshot_json(&path).unwrap(), snap);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_snapshot_json(&path), Err(FitError::Json(_))));
        assert!(matches!(
            read_snapshot_json(&dir.path().join("missing.json")),
            Err(FitError::Io(_))
        ));
    }
}
