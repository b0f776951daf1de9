//! Constrained solve of the assembled stiffness equations.
//!
//! Restrained DOFs are eliminated by keeping only the free rows and columns of
//! `K`, the reduced system `K_ff · U_f = F_f` is solved with a dense LU
//! factorisation, and the result is scattered back into a full displacement
//! vector whose restrained entries stay at zero.

use log::{debug, trace, warn};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::settings::SolverSettings;

/// The reduced system has no trustworthy solution.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("reduced stiffness system is singular at dof {dof}")]
pub struct SingularDof {
    /// Global index of the DOF where the breakdown was detected.
    pub dof: usize,
}

/// Indices of the DOFs that are not restrained, in ascending order.
#[must_use]
pub fn free_dofs(restrained: &[bool]) -> Vec<usize> {
    restrained
        .iter()
        .enumerate()
        .filter_map(|(dof, &fixed)| (!fixed).then_some(dof))
        .collect()
}

/// Solve `K · U = F` with `U[d] = 0` for every restrained `d`.
///
/// LU with partial pivoting is used because the regularized matrix under an
/// arbitrary restraint pattern is not guaranteed to be positive definite.
///
/// # Errors
///
/// Returns [`SingularDof`] when the factorisation breaks down, when the solution
/// is not finite, or when more than `settings.mechanism_tolerance` of the
/// largest free load drives a mechanism (see [`mechanism_load`]).
pub fn solve_constrained(
    stiffness: &DMatrix<f64>,
    load: &DVector<f64>,
    restrained: &[bool],
    settings: &SolverSettings,
) -> Result<DVector<f64>, SingularDof> {
    let mut displacements = DVector::zeros(load.len());
    let free = free_dofs(restrained);
    debug!("solving for {} free of {} dof", free.len(), load.len());
    if free.is_empty() {
        return Ok(displacements);
    }

    let (k_ff, f_f) = reduce(stiffness, load, &free);
    let lu = k_ff.clone().lu();
    let Some(solution) = lu.solve(&f_f) else {
        let pivots = lu.u().diagonal();
        let dof = free[pivots.iamin()];
        warn!("zero pivot while solving; dof {dof} is unrestrained");
        return Err(SingularDof { dof });
    };

    if let Some(idx) = solution.iter().position(|value| !value.is_finite()) {
        warn!("non-finite displacement at dof {}", free[idx]);
        return Err(SingularDof { dof: free[idx] });
    }

    let scale = f_f.amax();
    let excited = mechanism_load(&k_ff, &f_f, settings.regularization);
    let idx = excited.iamax();
    if excited[idx].abs() > settings.mechanism_tolerance * scale {
        warn!(
            "load at dof {} drives a mechanism ({:.3e} of the largest free load {scale:.3e})",
            free[idx],
            excited[idx].abs()
        );
        return Err(SingularDof { dof: free[idx] });
    }

    for (idx, &dof) in free.iter().enumerate() {
        displacements[dof] = solution[idx];
    }
    Ok(displacements)
}

/// Part of `load` that the bare stiffness of the structure cannot resist.
///
/// `regularization` is first removed from the diagonal of `k_ff`. Eigenvectors
/// whose eigenvalue is at most `regularization` times the largest one span the
/// mechanisms of the structure, and the returned vector is the projection of
/// `load` onto them. It is zero for a stable structure and for a mechanism that
/// the load does not move, however flexible the structure is otherwise.
#[must_use]
pub fn mechanism_load(
    k_ff: &DMatrix<f64>,
    load: &DVector<f64>,
    regularization: f64,
) -> DVector<f64> {
    let mut bare = k_ff.clone();
    for idx in 0..bare.nrows() {
        bare[(idx, idx)] -= regularization;
    }
    let eigen = bare.symmetric_eigen();
    let threshold = regularization * eigen.eigenvalues.amax();

    let mut projected = DVector::zeros(load.len());
    for (idx, &value) in eigen.eigenvalues.iter().enumerate() {
        if value <= threshold {
            let mode = eigen.eigenvectors.column(idx);
            let weight = mode.dot(load);
            projected += mode * weight;
        }
    }
    trace!("mechanism share of the load: {:.3e}", projected.amax());
    projected
}

/// Principal submatrix and subvector on the `free` indices.
fn reduce(
    stiffness: &DMatrix<f64>,
    load: &DVector<f64>,
    free: &[usize],
) -> (DMatrix<f64>, DVector<f64>) {
    let n = free.len();
    let k_ff = DMatrix::from_fn(n, n, |row, col| stiffness[(free[row], free[col])]);
    let f_f = DVector::from_fn(n, |row, _| load[free[row]]);
    (k_ff, f_f)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn fully_restrained_system_has_zero_displacement() {
        let stiffness = DMatrix::identity(4, 4);
        let load = DVector::from_vec(vec![1.0, -2.0, 3.0, 4.0]);
        let displacements =
            solve_constrained(&stiffness, &load, &[true; 4], &SolverSettings::default())
                .expect("nothing to solve");
        assert_eq!(displacements, DVector::zeros(4));
    }

    #[test]
    fn restrained_entries_stay_zero_and_free_entries_satisfy_reduced_system() {
        let stiffness = DMatrix::from_row_slice(
            3,
            3,
            &[4.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 4.0],
        );
        let load = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let restrained = [false, true, false];
        let displacements =
            solve_constrained(&stiffness, &load, &restrained, &SolverSettings::default())
                .expect("well conditioned");

        assert_eq!(displacements[1], 0.0);
        assert_relative_eq!(displacements[0], 0.25, epsilon = 1.0e-12);
        assert_relative_eq!(displacements[2], 0.75, epsilon = 1.0e-12);
    }

    #[test]
    fn exactly_singular_matrix_is_reported() {
        let stiffness = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let load = DVector::from_vec(vec![1.0, 1.0]);
        let error = solve_constrained(
            &stiffness,
            &load,
            &[false, false],
            &SolverSettings::default(),
        )
        .expect_err("zero pivot");
        assert_eq!(error, SingularDof { dof: 1 });
    }

    #[test]
    fn load_carried_by_regularization_is_a_mechanism() {
        let settings = SolverSettings::default();
        let stiffness = DMatrix::from_row_slice(
            2,
            2,
            &[1.0 + settings.regularization, 0.0, 0.0, settings.regularization],
        );
        let load = DVector::from_vec(vec![0.0, 1.0]);
        let error = solve_constrained(&stiffness, &load, &[false, false], &settings)
            .expect_err("mechanism excited");
        assert_eq!(error, SingularDof { dof: 1 });
    }

    #[test]
    fn unloaded_mechanism_direction_is_tolerated() {
        let settings = SolverSettings::default();
        let stiffness = DMatrix::from_row_slice(
            2,
            2,
            &[1.0 + settings.regularization, 0.0, 0.0, settings.regularization],
        );
        let load = DVector::from_vec(vec![5.0, 0.0]);
        let displacements = solve_constrained(&stiffness, &load, &[false, false], &settings)
            .expect("load is orthogonal to the mechanism");
        assert_relative_eq!(displacements[0], 5.0, epsilon = 1.0e-6);
        assert_eq!(displacements[1], 0.0);
    }

    #[test]
    fn flexible_direction_is_not_a_mechanism() {
        let settings = SolverSettings::default();
        let soft = 1.0e-6;
        let stiffness = DMatrix::from_row_slice(
            2,
            2,
            &[1.0 + settings.regularization, 0.0, 0.0, soft + settings.regularization],
        );
        let load = DVector::from_vec(vec![0.0, 1.0]);
        let displacements = solve_constrained(&stiffness, &load, &[false, false], &settings)
            .expect("soft but stable");
        assert_relative_eq!(
            displacements[1],
            1.0 / (soft + settings.regularization),
            max_relative = 1.0e-9
        );
    }

    #[test]
    fn small_load_on_mechanism_is_still_rejected() {
        let settings = SolverSettings::default();
        let stiffness = DMatrix::from_row_slice(
            2,
            2,
            &[1.0 + settings.regularization, 0.0, 0.0, settings.regularization],
        );
        let load = DVector::from_vec(vec![0.0, 1.0e-8]);
        let error = solve_constrained(&stiffness, &load, &[false, false], &settings)
            .expect_err("magnitude does not matter");
        assert_eq!(error, SingularDof { dof: 1 });
    }

    #[test]
    fn mechanism_load_projects_onto_rigid_motion() {
        // A spring between two free DOFs translates freely as a pair.
        let eps = 1.0e-9;
        let stiffness =
            DMatrix::from_row_slice(2, 2, &[1.0 + eps, -1.0, -1.0, 1.0 + eps]);

        let pushed = mechanism_load(&stiffness, &DVector::from_vec(vec![1.0, 1.0]), eps);
        assert_relative_eq!(pushed[0], 1.0, epsilon = 1.0e-9);
        assert_relative_eq!(pushed[1], 1.0, epsilon = 1.0e-9);

        let stretched = mechanism_load(&stiffness, &DVector::from_vec(vec![1.0, -1.0]), eps);
        assert_relative_eq!(stretched.amax(), 0.0, epsilon = 1.0e-9);
    }

    #[test]
    fn free_dofs_skip_restrained_entries() {
        assert_eq!(free_dofs(&[true, false, false, true]), vec![1, 2]);
    }
}
