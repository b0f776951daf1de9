#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod assembly;
pub mod errors;
pub mod geometry;
pub mod model;
pub mod recovery;
pub mod report;
pub mod settings;
pub mod solver;
pub mod topology;

pub use analysis::{analyze, Analysis, MemberState};
pub use errors::{AnalysisError, TrussEditError};
pub use geometry::{force, point, Axis, Displacement, Force, Point};
pub use model::{Load, Member, MemberId, Node, NodeId, Support, Truss};
pub use recovery::{MemberForce, SupportReaction};
pub use settings::SolverSettings;
