use truss2d::{point, Load, Support, Truss};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A single tie pinned at one end and pulled at the other
    let mut truss = Truss::new("tie");
    let a = truss.add_node(point(0.0, 0.0));
    let b = truss.add_node(point(10.0, 0.0));
    let ab = truss.add_member(a, b)?;

    truss.set_support(a, Support::pin())?;
    truss.set_load(b, Load::new(5.0, 0.0))?;

    truss.evaluate()?;

    if let Some(force) = truss.member_force(ab) {
        println!("Member AB axial force: {force:.3}");
    }
    if let Some(reaction) = truss.node_reaction(a) {
        println!("Reaction at A: Rx = {:.3}, Ry = {:.3}", reaction.x, reaction.y);
    }

    Ok(())
}
