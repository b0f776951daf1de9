//! Connectivity view of a truss used to validate it before assembly.
//!
//! The model stores members as pairs of node identities. This module resolves
//! those identities to DOF-ordered indices and keeps the result in a petgraph
//! graph so that connected parts of the structure can be inspected.

use std::collections::{HashMap, HashSet};

use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;

use crate::errors::AnalysisError;
use crate::geometry::Axis;
use crate::model::{NodeId, Truss};

/// Resolved connectivity of a validated truss.
///
/// Graph node weights are positions in [`Truss::nodes`]; edge weights are
/// positions in [`Truss::members`].
#[derive(Debug)]
pub struct Topology {
    /// Undirected graph whose node `i` is the truss node at position `i`.
    graph: UnGraph<usize, usize>,
    /// Endpoint positions of each member, in member order.
    endpoints: Vec<(usize, usize)>,
}

impl Topology {
    /// Resolve the member endpoints of `truss`.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalysisError::EmptyModel`] when there is nothing to analyse,
    /// [`AnalysisError::DuplicateNode`] or [`AnalysisError::DuplicateMember`] when
    /// identities collide, [`AnalysisError::NonFinitePosition`] for a node that
    /// cannot be placed, [`AnalysisError::DanglingReference`] when a member names
    /// a missing node and [`AnalysisError::SelfConnectedMember`] when a member
    /// loops onto one node.
    pub fn build(truss: &Truss) -> Result<Self, AnalysisError> {
        let nodes = truss.nodes();
        let members = truss.members();
        if nodes.is_empty() || members.is_empty() {
            return Err(AnalysisError::EmptyModel {
                nodes: nodes.len(),
                members: members.len(),
            });
        }

        let mut index_map: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
        let mut graph = UnGraph::with_capacity(nodes.len(), members.len());
        for (idx, node) in nodes.iter().enumerate() {
            if index_map.insert(node.id, idx).is_some() {
                return Err(AnalysisError::DuplicateNode { node: node.id });
            }
            if !(node.position.x.is_finite() && node.position.y.is_finite()) {
                return Err(AnalysisError::NonFinitePosition { node: node.id });
            }
            graph.add_node(idx);
        }

        let mut member_ids = HashSet::with_capacity(members.len());
        let mut endpoints = Vec::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            if !member_ids.insert(member.id) {
                return Err(AnalysisError::DuplicateMember { member: member.id });
            }
            let resolve = |node: NodeId| {
                index_map
                    .get(&node)
                    .copied()
                    .ok_or(AnalysisError::DanglingReference {
                        member: member.id,
                        node,
                    })
            };
            let start = resolve(member.start)?;
            let end = resolve(member.end)?;
            if start == end {
                return Err(AnalysisError::SelfConnectedMember { member: member.id });
            }
            graph.add_edge(NodeIndex::new(start), NodeIndex::new(end), idx);
            endpoints.push((start, end));
        }

        Ok(Self { graph, endpoints })
    }

    /// Node positions joined by the member at position `member`.
    #[must_use]
    pub fn endpoints(&self, member: usize) -> (usize, usize) {
        self.endpoints[member]
    }

    /// All member endpoint pairs in member order.
    #[must_use]
    pub fn member_endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    /// Groups of node positions linked through members.
    ///
    /// Nodes without any member are left out; the stiffness regularization keeps
    /// them solvable on their own.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.graph.node_count()];
        let mut components = Vec::new();
        for start in self.graph.node_indices() {
            if seen[start.index()] || self.graph.neighbors(start).next().is_none() {
                continue;
            }
            let mut component = Vec::new();
            let mut dfs = Dfs::new(&self.graph, start);
            while let Some(visited) = dfs.next(&self.graph) {
                seen[visited.index()] = true;
                component.push(self.graph[visited]);
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Reject structures that can translate freely as a rigid body.
    ///
    /// Every connected component needs at least one restraint along each axis.
    /// Rotational mechanisms are left to the solver, which only rejects them when
    /// the loads excite them.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalysisError::SingularSystem`] naming the first node of the
    /// offending component and the unrestrained axis.
    pub fn check_translation_restraint(&self, truss: &Truss) -> Result<(), AnalysisError> {
        let nodes = truss.nodes();
        let components = self.components();
        debug!("truss has {} connected component(s)", components.len());
        for component in components {
            for axis in [Axis::X, Axis::Y] {
                if component.iter().any(|&idx| nodes[idx].is_restrained(axis)) {
                    continue;
                }
                let first = component[0];
                return Err(AnalysisError::SingularSystem {
                    node: nodes[first].id,
                    axis,
                    dof: 2 * first + axis.offset(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::model::{Member, MemberId, Node, Support};

    fn two_bars() -> Truss {
        Truss::from_parts(
            "split",
            vec![
                Node::new(NodeId(10), point(0.0, 0.0)).with_support(Support::pin()),
                Node::new(NodeId(11), point(1.0, 0.0)),
                Node::new(NodeId(12), point(5.0, 0.0)),
                Node::new(NodeId(13), point(6.0, 0.0)).with_support(Support::roller()),
                Node::new(NodeId(14), point(9.0, 9.0)),
            ],
            vec![
                Member::new(MemberId(0), NodeId(10), NodeId(11)),
                Member::new(MemberId(1), NodeId(13), NodeId(12)),
            ],
        )
    }

    #[test]
    fn resolves_endpoints_to_positions() {
        let topology = Topology::build(&two_bars()).expect("valid model");
        assert_eq!(topology.endpoints(0), (0, 1));
        assert_eq!(topology.endpoints(1), (3, 2));
    }

    #[test]
    fn components_skip_isolated_nodes() {
        let topology = Topology::build(&two_bars()).expect("valid model");
        assert_eq!(topology.components(), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn component_without_horizontal_restraint_is_rejected() {
        let truss = two_bars();
        let topology = Topology::build(&truss).expect("valid model");
        let error = topology
            .check_translation_restraint(&truss)
            .expect_err("roller-only component slides");
        assert_eq!(
            error,
            AnalysisError::SingularSystem {
                node: NodeId(12),
                axis: Axis::X,
                dof: 4,
            }
        );
    }

    #[test]
    fn dangling_reference_names_member_and_node() {
        let truss = Truss::from_parts(
            "dangling",
            vec![Node::new(NodeId(1), point(0.0, 0.0))],
            vec![Member::new(MemberId(3), NodeId(1), NodeId(2))],
        );
        let error = Topology::build(&truss).expect_err("missing node detected");
        assert_eq!(
            error,
            AnalysisError::DanglingReference {
                member: MemberId(3),
                node: NodeId(2),
            }
        );
    }

    #[test]
    fn duplicate_and_self_connected_members_are_rejected() {
        let duplicate = Truss::from_parts(
            "dup",
            vec![
                Node::new(NodeId(1), point(0.0, 0.0)),
                Node::new(NodeId(1), point(1.0, 0.0)),
            ],
            vec![Member::new(MemberId(0), NodeId(1), NodeId(1))],
        );
        assert_eq!(
            Topology::build(&duplicate).expect_err("duplicate detected"),
            AnalysisError::DuplicateNode { node: NodeId(1) }
        );

        let looped = Truss::from_parts(
            "loop",
            vec![Node::new(NodeId(1), point(0.0, 0.0))],
            vec![Member::new(MemberId(4), NodeId(1), NodeId(1))],
        );
        assert_eq!(
            Topology::build(&looped).expect_err("loop detected"),
            AnalysisError::SelfConnectedMember {
                member: MemberId(4)
            }
        );
    }

    #[test]
    fn repeated_member_identity_is_rejected() {
        let truss = Truss::from_parts(
            "twice",
            vec![
                Node::new(NodeId(0), point(0.0, 0.0)),
                Node::new(NodeId(1), point(1.0, 0.0)),
                Node::new(NodeId(2), point(1.0, 1.0)),
            ],
            vec![
                Member::new(MemberId(5), NodeId(0), NodeId(1)),
                Member::new(MemberId(5), NodeId(1), NodeId(2)),
            ],
        );
        assert_eq!(
            Topology::build(&truss).expect_err("member identity reused"),
            AnalysisError::DuplicateMember {
                member: MemberId(5)
            }
        );
    }

    #[test]
    fn non_finite_position_names_the_node() {
        for bad in [f64::NAN, f64::INFINITY] {
            let truss = Truss::from_parts(
                "lost",
                vec![
                    Node::new(NodeId(0), point(0.0, 0.0)),
                    Node::new(NodeId(1), point(1.0, bad)),
                ],
                vec![Member::new(MemberId(0), NodeId(0), NodeId(1))],
            );
            assert_eq!(
                Topology::build(&truss).expect_err("position rejected"),
                AnalysisError::NonFinitePosition { node: NodeId(1) }
            );
        }
    }
}
