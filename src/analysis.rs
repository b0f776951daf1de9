//! Analysis pipeline: topology, assembly, constrained solve and recovery.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assembly::assemble;
use crate::errors::AnalysisError;
use crate::geometry::{Axis, Displacement, Force};
use crate::model::{MemberId, NodeId, Truss};
use crate::recovery::{member_forces, support_reactions, MemberForce, SupportReaction};
use crate::settings::SolverSettings;
use crate::solver::solve_constrained;
use crate::topology::Topology;

/// How a member carries its axial force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberState {
    /// Pulled apart.
    Tension,
    /// Pushed together.
    Compression,
    /// Force below the zero-force threshold.
    ZeroForce,
}

impl MemberState {
    /// Classify `force` against `threshold`.
    ///
    /// # Examples
    /// ```
    /// use truss2d::MemberState;
    ///
    /// assert_eq!(MemberState::classify(5.0, 1e-3), MemberState::Tension);
    /// assert_eq!(MemberState::classify(-2.0, 1e-3), MemberState::Compression);
    /// assert_eq!(MemberState::classify(4e-4, 1e-3), MemberState::ZeroForce);
    /// ```
    #[must_use]
    pub fn classify(force: f64, threshold: f64) -> Self {
        if force.abs() < threshold {
            MemberState::ZeroForce
        } else if force > 0.0 {
            MemberState::Tension
        } else {
            MemberState::Compression
        }
    }

    /// Short label in the editor's style, e.g. `5.0 (T)`, `3.2 (C)` or `0.0`.
    #[must_use]
    pub fn label(force: f64, threshold: f64) -> String {
        match Self::classify(force, threshold) {
            MemberState::ZeroForce => "0.0".to_owned(),
            MemberState::Tension => format!("{:.1} (T)", force.abs()),
            MemberState::Compression => format!("{:.1} (C)", force.abs()),
        }
    }
}

/// Results of one analysis, independent of the truss they came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Displacement of every node, in node order.
    pub displacements: Vec<(NodeId, Displacement)>,
    /// Axial force of every member, in member order.
    pub member_forces: Vec<MemberForce>,
    /// Reactions of every supported node, in node order.
    pub reactions: Vec<SupportReaction>,
}

impl Analysis {
    /// Axial force of `member`, if it was part of the analysis.
    #[must_use]
    pub fn member_force(&self, member: MemberId) -> Option<f64> {
        self.member_forces
            .iter()
            .find(|entry| entry.member == member)
            .map(|entry| entry.force)
    }

    /// Reaction at `node`, if it carries a support.
    #[must_use]
    pub fn reaction(&self, node: NodeId) -> Option<&SupportReaction> {
        self.reactions.iter().find(|entry| entry.node == node)
    }

    /// Displacement of `node`.
    #[must_use]
    pub fn displacement(&self, node: NodeId) -> Option<Displacement> {
        self.displacements
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, displacement)| *displacement)
    }

    /// Net force on the structure in model axes: reactions plus applied loads.
    ///
    /// Both components are close to zero for a solved truss.
    #[must_use]
    pub fn equilibrium_residual(&self, truss: &Truss) -> Force {
        let reactions: Force = self.reactions.iter().map(SupportReaction::model_force).sum();
        let loads: Force = truss.nodes().iter().map(|node| node.applied_force()).sum();
        reactions + loads
    }
}

/// Analyse `truss` without modifying it.
///
/// # Errors
///
/// Returns [`AnalysisError`] when the model is empty or malformed, or when the
/// structure cannot carry its loads.
///
/// # Examples
/// ```
/// use truss2d::{analyze, point, Load, SolverSettings, Support, Truss};
///
/// let mut truss = Truss::new("bar");
/// let a = truss.add_node(point(0.0, 0.0));
/// let b = truss.add_node(point(10.0, 0.0));
/// let ab = truss.add_member(a, b).expect("nodes exist");
/// truss.set_support(a, Support::pin()).expect("node exists");
/// truss.set_load(b, Load::new(5.0, 0.0)).expect("node exists");
///
/// let analysis = analyze(&truss, &SolverSettings::default()).expect("stable");
/// let force = analysis.member_force(ab).expect("member analysed");
/// assert!((force - 5.0).abs() < 1.0e-6);
/// ```
pub fn analyze(truss: &Truss, settings: &SolverSettings) -> Result<Analysis, AnalysisError> {
    let topology = Topology::build(truss)?;
    topology.check_translation_restraint(truss)?;

    let system = assemble(truss, &topology, settings)?;
    let displacements =
        solve_constrained(&system.stiffness, &system.load, &system.restrained, settings)
            .map_err(|singular| {
                let node = singular.dof / 2;
                AnalysisError::SingularSystem {
                    node: truss.nodes()[node].id,
                    axis: Axis::of_dof(singular.dof),
                    dof: singular.dof,
                }
            })?;

    let member_forces = member_forces(truss, &topology, &displacements)?;
    let reactions = support_reactions(truss, &system, &displacements, settings);
    debug!(
        "analysed '{}': {} member force(s), {} reaction(s)",
        truss.name(),
        member_forces.len(),
        reactions.len()
    );

    Ok(Analysis {
        displacements: truss
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                (
                    node.id,
                    Displacement::new(displacements[2 * idx], displacements[2 * idx + 1]),
                )
            })
            .collect(),
        member_forces,
        reactions,
    })
}

impl Truss {
    /// Analyse the truss and write forces and reactions into it.
    ///
    /// Every reaction is reset to zero before the results are applied, so
    /// solving an unchanged truss again reproduces the same values. On failure
    /// the truss is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] under the same conditions as [`analyze`].
    pub fn solve(&mut self, settings: &SolverSettings) -> Result<Analysis, AnalysisError> {
        let analysis = analyze(self, settings)?;
        self.apply(&analysis);
        Ok(analysis)
    }

    /// Analyse with default settings; see [`Truss::solve`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] under the same conditions as [`analyze`].
    pub fn evaluate(&mut self) -> Result<Analysis, AnalysisError> {
        self.solve(&SolverSettings::default())
    }

    /// Overwrite the output fields with `analysis`.
    ///
    /// Positions of `analysis` entries match the node and member order of the
    /// truss it was computed from.
    fn apply(&mut self, analysis: &Analysis) {
        let (nodes, members) = self.parts_mut();
        for node in nodes.iter_mut() {
            node.reaction_x = 0.0;
            node.reaction_y = 0.0;
        }
        for reaction in &analysis.reactions {
            if let Some(node) = nodes.iter_mut().find(|node| node.id == reaction.node) {
                if let Some(x) = reaction.x {
                    node.reaction_x = x;
                }
                if let Some(y) = reaction.y {
                    node.reaction_y = y;
                }
            }
        }
        for (member, result) in members.iter_mut().zip(&analysis.member_forces) {
            member.force = Some(result.force);
        }
    }
}
