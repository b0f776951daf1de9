use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use truss2d::report::render_summary;
use truss2d::{point, Load, SolverSettings, Support, Truss};

/// Solve a planar truss and print its member forces and reactions.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Truss model as JSON; a built-in roof truss is used when omitted.
    model: Option<PathBuf>,
    /// Solver settings as JSON; missing fields keep their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Print the analysis as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

/// Six-node roof truss on a pin and a roller with a ridge load.
fn demo_truss() -> anyhow::Result<Truss> {
    let mut truss = Truss::new("roof");
    let left = truss.add_node(point(0.0, 0.0));
    let mid = truss.add_node(point(4.0, 0.0));
    let right = truss.add_node(point(8.0, 0.0));
    let left_rafter = truss.add_node(point(2.0, -2.0));
    let ridge = truss.add_node(point(4.0, -4.0));
    let right_rafter = truss.add_node(point(6.0, -2.0));

    for (start, end) in [
        (left, mid),
        (mid, right),
        (left, left_rafter),
        (left_rafter, ridge),
        (ridge, right_rafter),
        (right_rafter, right),
        (left_rafter, mid),
        (ridge, mid),
        (right_rafter, mid),
    ] {
        truss.add_member(start, end)?;
    }

    truss.set_support(left, Support::pin())?;
    truss.set_support(right, Support::roller())?;
    // The drawing frame grows downward, so 90 degrees points down.
    truss.set_load(ridge, Load::new(10.0, 90.0))?;
    Ok(truss)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings: SolverSettings = match &args.settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing settings in {}", path.display()))?
        }
        None => SolverSettings::default(),
    };

    let mut truss: Truss = match &args.model {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading model from {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing model in {}", path.display()))?
        }
        None => demo_truss()?,
    };
    info!(
        "solving '{}' with {} node(s) and {} member(s)",
        truss.name(),
        truss.node_count(),
        truss.member_count()
    );

    let analysis = truss
        .solve(&settings)
        .with_context(|| format!("analysing '{}'", truss.name()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", render_summary(&truss, &analysis, &settings));
    }
    Ok(())
}
