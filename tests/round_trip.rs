use approx::assert_relative_eq;
use nalgebra::DMatrix;
use num_complex::Complex64;

use compartment_fit::data::{SyntheticSpec, imaginary_frequencies, random_tree};
use compartment_fit::domain::{CompartmentParams, ParamFamily};
use compartment_fit::error::FitError;
use compartment_fit::fit::{FitTask, ParamLayout, conductance_structure, fit_batch, frequency_structures};
use compartment_fit::io::{read_snapshot_json, write_snapshot_json};
use compartment_fit::models::relative_error;
use compartment_fit::tree::CompartmentTree;

fn assert_params_close(fit: &CompartmentTree, truth: &CompartmentTree, tol: f64) {
    for (a, b) in fit.nodes().zip(truth.nodes()) {
        assert_relative_eq!(a.params.g_l, b.params.g_l, max_relative = tol);
        assert_relative_eq!(a.params.ca, b.params.ca, max_relative = tol);
        if !a.is_root() {
            assert_relative_eq!(a.params.g_c, b.params.g_c, max_relative = tol);
        }
    }
}

#[test]
fn random_trees_are_recovered_by_the_two_stage_fit() {
    let freqs = imaginary_frequencies(1e-2, 1.0, 5).unwrap();
    for seed in 0..5 {
        let truth = random_tree(&SyntheticSpec::default(), seed).unwrap();
        let zf = truth.impedance_matrices(&freqs).unwrap();

        let mut fit = truth.with_same_topology();
        let diag = fit.compute_gc(&freqs, &zf, None).unwrap();
        assert!(!diag.conductance.is_rank_deficient());
        assert!(!diag.capacitance.is_rank_deficient());

        assert_params_close(&fit, &truth, 1e-6);
        let err = relative_error(&fit.impedance_matrices(&freqs).unwrap(), &zf).unwrap();
        assert!(err < 1e-7, "seed {seed}: impedance error {err}");
    }
}

#[test]
fn two_compartment_example() {
    let truth = CompartmentTree::from_parents(
        &[None, Some(0)],
        &[CompartmentParams::new(1.0, 0.01, 0.0), CompartmentParams::new(1.0, 0.01, 0.02)],
    )
    .unwrap();
    let expected_g = DMatrix::from_row_slice(2, 2, &[0.03, -0.02, -0.02, 0.03]);
    assert_relative_eq!(truth.conductance_matrix(), expected_g, epsilon = 1e-15);

    let freqs = vec![Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.5)];
    let zf = truth.impedance_matrices(&freqs).unwrap();
    let mut fit = truth.with_same_topology();
    fit.compute_gc(&freqs, &zf, None).unwrap();
    assert_params_close(&fit, &truth, 1e-8);
}

#[test]
fn missing_zero_frequency_leaves_tree_untouched() {
    let truth = random_tree(&SyntheticSpec::default(), 3).unwrap();
    let freqs = vec![Complex64::new(0.0, 0.1), Complex64::new(0.0, 1.0)];
    let zf = truth.impedance_matrices(&freqs).unwrap();

    let mut fit = truth.with_same_topology();
    let before = fit.clone();
    assert!(matches!(
        fit.compute_gc(&freqs, &zf, None),
        Err(FitError::MissingZeroFrequency { .. })
    ));
    assert_eq!(fit, before);
}

#[test]
fn structure_tensors_reconstruct_the_model_matrices() {
    let tree = random_tree(
        &SyntheticSpec {
            n_nodes: 9,
            chain_prob: 0.3,
            ..SyntheticSpec::default()
        },
        11,
    )
    .unwrap();

    let layout = ParamLayout::new(&tree, ParamFamily::Conductance);
    let g = conductance_structure(&tree, &layout)
        .unwrap()
        .reconstruct(&layout.read(&tree).unwrap())
        .unwrap();
    assert_relative_eq!(g, tree.conductance_matrix(), epsilon = 1e-14);

    let freqs = vec![Complex64::new(0.0, 0.0), Complex64::new(0.3, 2.0)];
    let layout = ParamLayout::new(&tree, ParamFamily::Combined);
    let values = layout.read(&tree).unwrap().map(|x| Complex64::new(x, 0.0));
    let systems = tree.system_matrices(&freqs);
    for (structure, system) in frequency_structures(&tree, &layout, &freqs).unwrap().iter().zip(&systems) {
        let rebuilt: DMatrix<Complex64> = structure.reconstruct(&values).unwrap();
        assert!((rebuilt - system).norm() < 1e-12);
    }
}

#[test]
fn batch_fit_and_snapshot_export() {
    let freqs = imaginary_frequencies(1e-2, 1.0, 4).unwrap();
    let truths: Vec<CompartmentTree> = (0..4)
        .map(|seed| random_tree(&SyntheticSpec::default(), seed).unwrap())
        .collect();
    let mut tasks: Vec<FitTask> = truths
        .iter()
        .map(|truth| FitTask {
            tree: truth.with_same_topology(),
            freqs: freqs.clone(),
            zf_mat: truth.impedance_matrices(&freqs).unwrap(),
            z_mat: None,
        })
        .collect();

    let results = fit_batch(&mut tasks);
    assert!(results.iter().all(Result::is_ok));
    for (task, truth) in tasks.iter().zip(&truths) {
        assert_params_close(&task.tree, truth, 1e-6);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fit.json");
    write_snapshot_json(&path, &tasks[0].tree.snapshot()).unwrap();
    let restored = CompartmentTree::from_snapshot(&read_snapshot_json(&path).unwrap()).unwrap();
    assert_eq!(restored, tasks[0].tree);
}
