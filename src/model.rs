//! Passive description of a planar truss: nodes, members, supports and loads.
//!
//! The [`Truss`] owns flat collections of nodes and members. Members refer to
//! their endpoints by [`NodeId`], never by reference, so a model can be rebuilt
//! from storage and handed to the analysis as-is.

use serde::{Deserialize, Serialize};

use crate::errors::TrussEditError;
use crate::geometry::{Axis, Force, Point};

/// Stable identity of a node within a truss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a member within a truss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Restraint of a node's global displacement components.
///
/// A support with both flags cleared restrains nothing; it is accepted and
/// behaves like no support at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    /// Horizontal displacement is fixed to zero.
    pub restrain_x: bool,
    /// Vertical displacement is fixed to zero.
    pub restrain_y: bool,
}

impl Support {
    /// Create a support with explicit restraint flags.
    #[must_use]
    pub const fn new(restrain_x: bool, restrain_y: bool) -> Self {
        Self {
            restrain_x,
            restrain_y,
        }
    }

    /// A pinned support restraining both directions.
    #[must_use]
    pub const fn pin() -> Self {
        Self::new(true, true)
    }

    /// A roller restraining vertical movement only.
    #[must_use]
    pub const fn roller() -> Self {
        Self::new(false, true)
    }

    /// Whether the displacement along `axis` is fixed.
    #[must_use]
    pub const fn restrains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.restrain_x,
            Axis::Y => self.restrain_y,
        }
    }
}

/// Point load applied at a node.
///
/// The magnitude is non-negative by convention; direction comes from the angle,
/// measured in degrees counter-clockwise from the positive X axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// Size of the load.
    pub magnitude: f64,
    /// Direction in degrees from the positive X axis.
    pub angle: f64,
}

impl Load {
    /// Create a load from a magnitude and a direction in degrees.
    #[must_use]
    pub const fn new(magnitude: f64, angle: f64) -> Self {
        Self { magnitude, angle }
    }

    /// Decompose the load into global components.
    ///
    /// # Examples
    /// ```
    /// use truss2d::Load;
    ///
    /// let load = Load::new(5.0, 0.0);
    /// assert_eq!(load.components().x, 5.0);
    /// ```
    #[must_use]
    pub fn components(&self) -> Force {
        Force::from_polar(self.magnitude, self.angle)
    }
}

/// A joint of the truss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity, unique within the owning truss.
    pub id: NodeId,
    /// Location of the joint.
    pub position: Point,
    /// Optional restraint.
    #[serde(default)]
    pub support: Option<Support>,
    /// Optional applied load.
    #[serde(default)]
    pub load: Option<Load>,
    /// Horizontal support reaction, written by a successful solve.
    #[serde(default)]
    pub reaction_x: f64,
    /// Vertical support reaction, written by a successful solve.
    #[serde(default)]
    pub reaction_y: f64,
}

impl Node {
    /// Create an unsupported, unloaded node.
    #[must_use]
    pub fn new(id: NodeId, position: Point) -> Self {
        Self {
            id,
            position,
            support: None,
            load: None,
            reaction_x: 0.0,
            reaction_y: 0.0,
        }
    }

    /// Attach a support.
    #[must_use]
    pub fn with_support(mut self, support: Support) -> Self {
        self.support = Some(support);
        self
    }

    /// Attach a load.
    #[must_use]
    pub fn with_load(mut self, load: Load) -> Self {
        self.load = Some(load);
        self
    }

    /// Global components of the applied load, zero when there is none.
    #[must_use]
    pub fn applied_force(&self) -> Force {
        self.load.map(|load| load.components()).unwrap_or_default()
    }

    /// Whether the support on this node fixes `axis`.
    #[must_use]
    pub fn is_restrained(&self, axis: Axis) -> bool {
        self.support.is_some_and(|support| support.restrains(axis))
    }
}

/// A two-force member connecting two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Identity, unique within the owning truss.
    pub id: MemberId,
    /// First endpoint.
    pub start: NodeId,
    /// Second endpoint.
    pub end: NodeId,
    /// Axial force after a successful solve; positive is tension.
    #[serde(default)]
    pub force: Option<f64>,
}

impl Member {
    /// Create a member without results.
    #[must_use]
    pub fn new(id: MemberId, start: NodeId, end: NodeId) -> Self {
        Self {
            id,
            start,
            end,
            force: None,
        }
    }

    /// Whether this member joins `a` and `b`, in either order.
    fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

/// Container for a pin-jointed planar truss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Truss {
    /// Display name of the model.
    #[serde(default)]
    name: String,
    /// Joints in insertion order; node `i` owns DOFs `2i` and `2i + 1`.
    nodes: Vec<Node>,
    /// Members in insertion order.
    members: Vec<Member>,
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use truss2d::Truss;
    ///
    /// let truss = Truss::new("bridge");
    /// assert_eq!(truss.node_count(), 0);
    /// assert_eq!(truss.name(), "bridge");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Assemble a truss from collections built elsewhere.
    ///
    /// Nothing is validated here; [`analyze`](crate::analyze) rejects models whose
    /// members reference missing nodes or whose identities collide.
    #[must_use]
    pub fn from_parts(name: impl Into<String>, nodes: Vec<Node>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            nodes,
            members,
        }
    }

    /// Display name of the model.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the model.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Return the number of nodes in the truss.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Nodes in DOF order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a node by identity.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Look up a member by identity.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Add a new node with the next free identity.
    ///
    /// # Examples
    /// ```
    /// use truss2d::{point, NodeId, Truss};
    ///
    /// let mut truss = Truss::new("demo");
    /// let first = truss.add_node(point(0.0, 0.0));
    /// let second = truss.add_node(point(1.0, 0.0));
    /// assert_eq!(first, NodeId(0));
    /// assert_eq!(second, NodeId(1));
    /// ```
    pub fn add_node(&mut self, position: Point) -> NodeId {
        self.invalidate();
        let id = NodeId(self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0));
        self.nodes.push(Node::new(id, position));
        id
    }

    /// Insert a fully described node, keeping its identity.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateNode`] when the identity is taken.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId, TrussEditError> {
        if self.node(node.id).is_some() {
            return Err(TrussEditError::DuplicateNode(node.id));
        }
        self.invalidate();
        let id = node.id;
        self.nodes.push(node);
        Ok(id)
    }

    /// Update the position of an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn move_node(&mut self, node: NodeId, position: Point) -> Result<(), TrussEditError> {
        self.edit_node(node, |n| n.position = position)
    }

    /// Remove a node and every member attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), TrussEditError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node)
            .ok_or(TrussEditError::UnknownNode(node))?;
        self.invalidate();
        self.nodes.remove(index);
        self.members.retain(|m| m.start != node && m.end != node);
        Ok(())
    }

    /// Connect two nodes with a new member.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when either end is missing,
    /// [`TrussEditError::SelfConnectedMember`] when both ends are the same node and
    /// [`TrussEditError::DuplicateMember`] when the pair is already connected.
    pub fn add_member(&mut self, start: NodeId, end: NodeId) -> Result<MemberId, TrussEditError> {
        for id in [start, end] {
            if self.node(id).is_none() {
                return Err(TrussEditError::UnknownNode(id));
            }
        }
        if start == end {
            return Err(TrussEditError::SelfConnectedMember(start));
        }
        if let Some(existing) = self.members.iter().find(|m| m.joins(start, end)) {
            return Err(TrussEditError::DuplicateMember {
                start,
                end,
                existing: existing.id,
            });
        }
        self.invalidate();
        let id = MemberId(self.members.iter().map(|m| m.id.0 + 1).max().unwrap_or(0));
        self.members.push(Member::new(id, start, end));
        Ok(id)
    }

    /// Remove a member from the truss.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownMember`] when `member` is not part of this truss.
    pub fn remove_member(&mut self, member: MemberId) -> Result<(), TrussEditError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id == member)
            .ok_or(TrussEditError::UnknownMember(member))?;
        self.invalidate();
        self.members.remove(index);
        Ok(())
    }

    /// Attach or replace the support at a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn set_support(&mut self, node: NodeId, support: Support) -> Result<(), TrussEditError> {
        self.edit_node(node, |n| n.support = Some(support))
    }

    /// Remove the support at a node, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn clear_support(&mut self, node: NodeId) -> Result<(), TrussEditError> {
        self.edit_node(node, |n| n.support = None)
    }

    /// Attach or replace the load at a node.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn set_load(&mut self, node: NodeId, load: Load) -> Result<(), TrussEditError> {
        self.edit_node(node, |n| n.load = Some(load))
    }

    /// Remove the load at a node, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownNode`] when `node` is not part of this truss.
    pub fn clear_load(&mut self, node: NodeId) -> Result<(), TrussEditError> {
        self.edit_node(node, |n| n.load = None)
    }

    /// Retrieve the axial force in a member after analysis.
    #[must_use]
    pub fn member_force(&self, member: MemberId) -> Option<f64> {
        self.member(member).and_then(|member| member.force)
    }

    /// Retrieve the support reaction at a node after analysis.
    ///
    /// Returns `None` for unknown or unsupported nodes.
    #[must_use]
    pub fn node_reaction(&self, node: NodeId) -> Option<Force> {
        self.node(node)
            .filter(|node| node.support.is_some())
            .map(|node| Force::new(node.reaction_x, node.reaction_y))
    }

    /// Mutable access for the analysis stage that writes results back.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Node], &mut [Member]) {
        (&mut self.nodes, &mut self.members)
    }

    /// Apply `edit` to a node, clearing stale results first.
    fn edit_node<F>(&mut self, node: NodeId, edit: F) -> Result<(), TrussEditError>
    where
        F: FnOnce(&mut Node),
    {
        if self.node(node).is_none() {
            return Err(TrussEditError::UnknownNode(node));
        }
        self.invalidate();
        if let Some(target) = self.nodes.iter_mut().find(|n| n.id == node) {
            edit(target);
        }
        Ok(())
    }

    /// Reset results when the topology, supports or loads change.
    fn invalidate(&mut self) {
        for node in &mut self.nodes {
            node.reaction_x = 0.0;
            node.reaction_y = 0.0;
        }
        for member in &mut self.members {
            member.force = None;
        }
    }
}
