//! Plain-text summary of a solved truss.

use std::fmt::Write;

use crate::analysis::{Analysis, MemberState};
use crate::model::Truss;
use crate::settings::SolverSettings;

/// Render the member forces and support reactions of `analysis`.
///
/// Members are labelled the way the editor draws them: magnitude with `(T)` for
/// tension or `(C)` for compression, and `0.0` for zero-force members. Vertical
/// reactions use the drawing convention, positive upward.
#[must_use]
pub fn render_summary(truss: &Truss, analysis: &Analysis, settings: &SolverSettings) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Truss '{}': {} node(s), {} member(s)",
        truss.name(),
        truss.node_count(),
        truss.member_count()
    )
    .expect("writing to string cannot fail");

    output.push_str("Members:\n");
    for entry in &analysis.member_forces {
        let span = truss.member(entry.member).map_or_else(
            || "?".to_owned(),
            |member| format!("{}-{}", member.start, member.end),
        );
        writeln!(
            &mut output,
            "  {} ({span}): {}",
            entry.member,
            MemberState::label(entry.force, settings.zero_force_threshold)
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("Reactions:\n");
    for reaction in &analysis.reactions {
        let component = |value: Option<f64>| {
            value.map_or_else(|| "free".to_owned(), |value| format!("{value:+.3}"))
        };
        writeln!(
            &mut output,
            "  node {}: Rx = {}, Ry = {}",
            reaction.node,
            component(reaction.x),
            component(reaction.y)
        )
        .expect("writing to string cannot fail");
    }

    let residual = analysis.equilibrium_residual(truss);
    writeln!(
        &mut output,
        "Equilibrium residual: ({:.2e}, {:.2e})",
        residual.x, residual.y
    )
    .expect("writing to string cannot fail");

    output
}
