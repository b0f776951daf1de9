//! Error types produced while editing or analysing trusses.

use thiserror::Error;

use crate::geometry::Axis;
use crate::model::{MemberId, NodeId};

/// Error returned when a truss analysis fails.
///
/// A failed analysis never touches the truss it was given, so callers can keep
/// showing the previous state alongside the message.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when the truss has no nodes or no members.
    #[error("truss has {nodes} node(s) and {members} member(s); nothing to analyse")]
    EmptyModel {
        /// Number of nodes in the rejected truss.
        nodes: usize,
        /// Number of members in the rejected truss.
        members: usize,
    },
    /// Returned when a member names a node that is not part of the truss.
    #[error("member {member} references node {node}, which does not exist in this truss")]
    DanglingReference {
        /// Identifier of the offending member.
        member: MemberId,
        /// Identifier the member points at.
        node: NodeId,
    },
    /// Returned when the reduced stiffness system cannot be solved.
    ///
    /// The structure is unstable: it is insufficiently restrained or contains an
    /// internal mechanism that the applied loads excite.
    #[error("stiffness system is singular at node {node} ({axis} direction, dof {dof}); check supports and connectivity")]
    SingularSystem {
        /// Node owning the degree of freedom where the solve broke down.
        node: NodeId,
        /// Direction of that degree of freedom.
        axis: Axis,
        /// Global degree-of-freedom index.
        dof: usize,
    },
    /// Returned when two nodes share the same identity.
    #[error("node identity {node} is used more than once")]
    DuplicateNode {
        /// The repeated identity.
        node: NodeId,
    },
    /// Returned when two members share the same identity.
    #[error("member identity {member} is used more than once")]
    DuplicateMember {
        /// The repeated identity.
        member: MemberId,
    },
    /// Returned when a node position is NaN or infinite.
    #[error("node {node} has a non-finite position")]
    NonFinitePosition {
        /// Identifier of the offending node.
        node: NodeId,
    },
    /// Returned when a member starts and ends at the same node.
    #[error("member {member} connects a node to itself")]
    SelfConnectedMember {
        /// Identifier of the offending member.
        member: MemberId,
    },
    /// Returned when a member joins two coincident nodes.
    #[error("member {member} has zero length")]
    ZeroLengthMember {
        /// Identifier of the offending member.
        member: MemberId,
    },
}

/// Error returned when editing a [`Truss`](crate::Truss).
///
/// # Examples
///
/// ```
/// use truss2d::{point, NodeId, Truss, TrussEditError};
///
/// let mut truss = Truss::new("demo");
/// let a = truss.add_node(point(0.0, 0.0));
/// let missing = NodeId(42);
/// let error = truss.add_member(a, missing).expect_err("unknown node is rejected");
/// assert_eq!(error, TrussEditError::UnknownNode(missing));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrussEditError {
    /// Returned when a node cannot be found in the truss.
    #[error("node {0} does not exist in this truss")]
    UnknownNode(NodeId),
    /// Returned when a member cannot be found in the truss.
    #[error("member {0} does not exist in this truss")]
    UnknownMember(MemberId),
    /// Returned when a node identity is already taken.
    #[error("node {0} already exists in this truss")]
    DuplicateNode(NodeId),
    /// Returned when both ends of a new member are the same node.
    #[error("a member cannot connect node {0} to itself")]
    SelfConnectedMember(NodeId),
    /// Returned when the two nodes are already joined by a member.
    #[error("nodes {start} and {end} are already connected by member {existing}")]
    DuplicateMember {
        /// First node of the rejected member.
        start: NodeId,
        /// Second node of the rejected member.
        end: NodeId,
        /// Member that already joins the pair.
        existing: MemberId,
    },
}
