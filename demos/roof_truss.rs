use truss2d::report::render_summary;
use truss2d::{analyze, point, Load, MemberState, SolverSettings, Support, Truss};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut truss = Truss::new("king post");
    let left = truss.add_node(point(0.0, 0.0));
    let foot = truss.add_node(point(3.0, 0.0));
    let right = truss.add_node(point(6.0, 0.0));
    let apex = truss.add_node(point(3.0, -2.0));

    truss.add_member(left, foot)?;
    truss.add_member(foot, right)?;
    truss.add_member(left, apex)?;
    truss.add_member(apex, right)?;
    let post = truss.add_member(foot, apex)?;

    truss.set_support(left, Support::pin())?;
    truss.set_support(right, Support::roller())?;
    truss.set_load(apex, Load::new(12.0, 90.0))?;

    let settings = SolverSettings::default();
    let analysis = analyze(&truss, &settings)?;
    print!("{}", render_summary(&truss, &analysis, &settings));

    // With the load at the apex only, the king post carries nothing.
    if let Some(force) = analysis.member_force(post) {
        let state = MemberState::classify(force, settings.zero_force_threshold);
        println!("King post: {state:?}");
    }

    Ok(())
}
