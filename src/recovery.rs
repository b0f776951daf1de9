//! Member forces and support reactions recovered from solved displacements.

use log::trace;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::assembly::{member_geometry, GlobalSystem, MemberGeometry, UNIT_RIGIDITY};
use crate::errors::AnalysisError;
use crate::geometry::{Displacement, Force};
use crate::model::{MemberId, NodeId, Truss};
use crate::settings::SolverSettings;
use crate::topology::Topology;

/// Axial force carried by one member.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberForce {
    /// The member.
    pub member: MemberId,
    /// Positive in tension, negative in compression.
    pub force: f64,
}

/// Reaction developed by one support.
///
/// Only the restrained components are present. The vertical component follows
/// the drawing convention of the editor: its Y axis grows downward on screen, so
/// a positive `y` pushes the node up, which is the negative model Y direction.
/// [`SupportReaction::model_force`] converts back to model axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportReaction {
    /// The supported node.
    pub node: NodeId,
    /// Horizontal reaction, when X is restrained.
    pub x: Option<f64>,
    /// Vertical reaction in drawing convention, when Y is restrained.
    pub y: Option<f64>,
}

impl SupportReaction {
    /// The reaction as a force in model axes, missing components as zero.
    #[must_use]
    pub fn model_force(&self) -> Force {
        Force::new(self.x.unwrap_or(0.0), -self.y.unwrap_or(0.0))
    }
}

/// Axial force from the end displacements of a member.
///
/// The elongation is the relative displacement projected on the member axis.
#[must_use]
pub fn axial_force(geometry: &MemberGeometry, start: Displacement, end: Displacement) -> f64 {
    let elongation = (end.x - start.x) * geometry.cos + (end.y - start.y) * geometry.sin;
    elongation * UNIT_RIGIDITY
}

/// Displacement of the node at position `idx`.
fn node_displacement(displacements: &DVector<f64>, idx: usize) -> Displacement {
    Displacement::new(displacements[2 * idx], displacements[2 * idx + 1])
}

/// Axial force in every member, in member order.
///
/// Geometry is recomputed from the node positions so that it matches the
/// assembly exactly.
///
/// # Errors
///
/// Returns [`AnalysisError::ZeroLengthMember`] when a member has no direction.
pub fn member_forces(
    truss: &Truss,
    topology: &Topology,
    displacements: &DVector<f64>,
) -> Result<Vec<MemberForce>, AnalysisError> {
    truss
        .members()
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            let geometry = member_geometry(truss, topology, idx)?;
            let (start, end) = topology.endpoints(idx);
            let force = axial_force(
                &geometry,
                node_displacement(displacements, start),
                node_displacement(displacements, end),
            );
            trace!("member {}: axial force {force:.6}", member.id);
            Ok(MemberForce {
                member: member.id,
                force,
            })
        })
        .collect()
}

/// Reactions at every supported node, in node order.
///
/// The internal force `Q = K · U` uses the unreduced, regularized stiffness.
/// The applied load is removed from `Q` at each supported node, the vertical
/// component is negated to the drawing convention described on
/// [`SupportReaction`], and components below `settings.reaction_snap` become
/// exactly zero.
#[must_use]
pub fn support_reactions(
    truss: &Truss,
    system: &GlobalSystem,
    displacements: &DVector<f64>,
    settings: &SolverSettings,
) -> Vec<SupportReaction> {
    let internal = &system.stiffness * displacements;
    let snap = |value: f64| {
        if value.abs() < settings.reaction_snap {
            0.0
        } else {
            value
        }
    };

    truss
        .nodes()
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| {
            let support = node.support?;
            let applied = node.applied_force();
            let rx = snap(internal[2 * idx] - applied.x);
            let ry = snap(-(internal[2 * idx + 1] - applied.y));
            Some(SupportReaction {
                node: node.id,
                x: support.restrain_x.then_some(rx),
                y: support.restrain_y.then_some(ry),
            })
        })
        .collect()
}
