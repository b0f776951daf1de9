//! Global stiffness matrix and load vector assembly.
//!
//! Every member contributes the 4x4 bar stiffness
//!
//! ```text
//! k = [[ c²,  cs, -c², -cs],
//!      [ cs,  s², -cs, -s²],
//!      [-c², -cs,  c²,  cs],
//!      [-cs, -s²,  cs,  s²]]
//! ```
//!
//! at the global indices `(2i, 2i+1, 2j, 2j+1)` of its endpoints `i` and `j`.
//! Axial rigidity is taken as one for every member, so results are relative and
//! member length does not otherwise enter the stiffness.
//! See <https://en.wikipedia.org/wiki/Direct_stiffness_method>.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector, SMatrix};

use crate::errors::AnalysisError;
use crate::geometry::Point;
use crate::model::Truss;
use crate::settings::SolverSettings;
use crate::topology::Topology;

/// Axial rigidity shared by every member.
pub const UNIT_RIGIDITY: f64 = 1.0;

/// Orientation of a member in the global frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberGeometry {
    /// Distance between the endpoints.
    pub length: f64,
    /// Direction cosine with the X axis.
    pub cos: f64,
    /// Direction cosine with the Y axis.
    pub sin: f64,
}

impl MemberGeometry {
    /// Orientation of the line from `start` to `end`.
    ///
    /// `None` when the points coincide or their distance is not finite.
    #[must_use]
    pub fn between(start: Point, end: Point) -> Option<Self> {
        let delta = end.to_vector() - start.to_vector();
        let length = delta.norm();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Self {
            length,
            cos: delta.x / length,
            sin: delta.y / length,
        })
    }

    /// Bar stiffness in global coordinates, scaled by [`UNIT_RIGIDITY`].
    #[must_use]
    pub fn local_stiffness(&self) -> SMatrix<f64, 4, 4> {
        let c = self.cos;
        let s = self.sin;
        UNIT_RIGIDITY
            * SMatrix::<f64, 4, 4>::from_row_slice(&[
                c * c,
                c * s,
                -c * c,
                -c * s,
                c * s,
                s * s,
                -c * s,
                -s * s,
                -c * c,
                -c * s,
                c * c,
                c * s,
                -c * s,
                -s * s,
                c * s,
                s * s,
            ])
    }
}

/// Assembled, unreduced equations of a truss.
#[derive(Clone, Debug)]
pub struct GlobalSystem {
    /// Regularized `dof x dof` stiffness matrix.
    pub stiffness: DMatrix<f64>,
    /// Applied nodal loads.
    pub load: DVector<f64>,
    /// Whether each global DOF is fixed by a support.
    pub restrained: Vec<bool>,
}

impl GlobalSystem {
    /// Number of global degrees of freedom.
    #[must_use]
    pub fn dof(&self) -> usize {
        self.load.len()
    }
}

/// Orientation of the member at position `member`.
///
/// # Errors
///
/// Returns [`AnalysisError::ZeroLengthMember`] when its endpoints coincide.
pub fn member_geometry(
    truss: &Truss,
    topology: &Topology,
    member: usize,
) -> Result<MemberGeometry, AnalysisError> {
    let (start, end) = topology.endpoints(member);
    let nodes = truss.nodes();
    MemberGeometry::between(nodes[start].position, nodes[end].position).ok_or(
        AnalysisError::ZeroLengthMember {
            member: truss.members()[member].id,
        },
    )
}

/// Build the global stiffness matrix, load vector and restraint flags.
///
/// # Errors
///
/// Returns [`AnalysisError::ZeroLengthMember`] when a member has no direction.
pub fn assemble(
    truss: &Truss,
    topology: &Topology,
    settings: &SolverSettings,
) -> Result<GlobalSystem, AnalysisError> {
    let stiffness = build_stiffness_matrix(truss, topology, settings)?;
    let load = build_load_vector(truss);
    let restrained = collect_restraints(truss);
    debug!(
        "assembled {} dof from {} member(s), {} restrained",
        load.len(),
        truss.member_count(),
        restrained.iter().filter(|&&fixed| fixed).count()
    );
    Ok(GlobalSystem {
        stiffness,
        load,
        restrained,
    })
}

/// Scatter every member's stiffness into the global matrix, then regularize.
fn build_stiffness_matrix(
    truss: &Truss,
    topology: &Topology,
    settings: &SolverSettings,
) -> Result<DMatrix<f64>, AnalysisError> {
    let dof = truss.node_count() * 2;
    let mut matrix = DMatrix::zeros(dof, dof);
    for (member, &(start, end)) in topology.member_endpoints().iter().enumerate() {
        let geometry = member_geometry(truss, topology, member)?;
        trace!(
            "member {}: c = {:.6}, s = {:.6}",
            truss.members()[member].id,
            geometry.cos,
            geometry.sin
        );
        let local = geometry.local_stiffness();
        let dof_map = [2 * start, 2 * start + 1, 2 * end, 2 * end + 1];
        for (row_local, &global_row) in dof_map.iter().enumerate() {
            for (col_local, &global_col) in dof_map.iter().enumerate() {
                matrix[(global_row, global_col)] += local[(row_local, col_local)];
            }
        }
    }

    // Loose or under-connected nodes would otherwise leave zero rows.
    for idx in 0..dof {
        matrix[(idx, idx)] += settings.regularization;
    }
    Ok(matrix)
}

/// Decompose each node's load into its two global entries.
fn build_load_vector(truss: &Truss) -> DVector<f64> {
    let mut load = DVector::zeros(truss.node_count() * 2);
    for (idx, node) in truss.nodes().iter().enumerate() {
        if let Some(applied) = node.load {
            let components = applied.components();
            load[2 * idx] += components.x;
            load[2 * idx + 1] += components.y;
        }
    }
    load
}

/// Flag the DOFs fixed by each node's support.
fn collect_restraints(truss: &Truss) -> Vec<bool> {
    truss
        .nodes()
        .iter()
        .flat_map(|node| {
            let support = node.support.unwrap_or_default();
            [support.restrain_x, support.restrain_y]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;
    use crate::model::{Load, Member, MemberId, Node, NodeId, Support};

    fn triangle() -> Truss {
        Truss::from_parts(
            "triangle",
            vec![
                Node::new(NodeId(0), point(0.0, 0.0)).with_support(Support::pin()),
                Node::new(NodeId(1), point(4.0, 0.0)).with_support(Support::roller()),
                Node::new(NodeId(2), point(2.0, 2.0)).with_load(Load::new(10.0, 270.0)),
            ],
            vec![
                Member::new(MemberId(0), NodeId(0), NodeId(1)),
                Member::new(MemberId(1), NodeId(1), NodeId(2)),
                Member::new(MemberId(2), NodeId(0), NodeId(2)),
            ],
        )
    }

    #[test]
    fn stiffness_is_symmetric_and_regularized() {
        let truss = triangle();
        let topology = Topology::build(&truss).expect("valid model");
        let settings = SolverSettings::default();
        let system = assemble(&truss, &topology, &settings).expect("assembly succeeds");

        assert_eq!(system.dof(), 6);
        assert_relative_eq!(
            system.stiffness,
            system.stiffness.transpose(),
            epsilon = 1.0e-15
        );
        // Node 0 sees the horizontal bar fully and the 45 degree bar by half.
        assert_relative_eq!(system.stiffness[(0, 0)], 1.5 + 1.0e-9, epsilon = 1.0e-12);
        assert_relative_eq!(system.stiffness[(1, 1)], 0.5 + 1.0e-9, epsilon = 1.0e-12);
        assert_relative_eq!(system.stiffness[(0, 2)], -1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn rows_balance_without_regularization() {
        let truss = triangle();
        let topology = Topology::build(&truss).expect("valid model");
        let settings = SolverSettings::default().with_regularization(0.0);
        let system = assemble(&truss, &topology, &settings).expect("assembly succeeds");

        // A rigid translation produces no internal force.
        let shift = DVector::from_iterator(6, [1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let forces = &system.stiffness * shift;
        assert_relative_eq!(forces.norm(), 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn loads_and_restraints_follow_node_order() {
        let truss = triangle();
        let topology = Topology::build(&truss).expect("valid model");
        let system = assemble(&truss, &topology, &SolverSettings::default())
            .expect("assembly succeeds");

        assert_relative_eq!(system.load[4], 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(system.load[5], -10.0, epsilon = 1.0e-12);
        assert_eq!(
            system.restrained,
            vec![true, true, false, true, false, false]
        );
    }

    #[test]
    fn coincident_endpoints_are_rejected() {
        let truss = Truss::from_parts(
            "collapsed",
            vec![
                Node::new(NodeId(0), point(1.0, 1.0)),
                Node::new(NodeId(1), point(1.0, 1.0)),
            ],
            vec![Member::new(MemberId(9), NodeId(0), NodeId(1))],
        );
        let topology = Topology::build(&truss).expect("connectivity is fine");
        let error = assemble(&truss, &topology, &SolverSettings::default())
            .expect_err("zero length detected");
        assert_eq!(
            error,
            AnalysisError::ZeroLengthMember {
                member: MemberId(9)
            }
        );
    }

    #[test]
    fn local_stiffness_matches_outer_product() {
        let geometry = MemberGeometry::between(point(0.0, 0.0), point(3.0, 4.0))
            .expect("non-degenerate member");
        assert_relative_eq!(geometry.length, 5.0);
        let k = geometry.local_stiffness();
        assert_relative_eq!(k[(0, 0)], 0.36, epsilon = 1.0e-12);
        assert_relative_eq!(k[(0, 1)], 0.48, epsilon = 1.0e-12);
        assert_relative_eq!(k[(1, 3)], -0.64, epsilon = 1.0e-12);
        assert_relative_eq!(k[(3, 2)], 0.48, epsilon = 1.0e-12);
    }
}
