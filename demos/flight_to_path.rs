//! Builds an occupancy grid from a recorded flight and plans a path from the first to the last
//! pose.
//!
//! Usage: `flight_to_path <flight_path.csv> <lidar.csv> <out.csv> [cell_size] [tolerance] [radius]`
//!
//! Run with `RUST_LOG=debug` to see every stage.
use lidar_pathfinding::{
    GridMapper, MapperConfig, PathSearch, PoseTable, SearchConfig, SweepReading,
};
use lidar_pathfinding_io::{load_flight_path, load_lidar_sweeps, save_path};
use log::{error, info};
use std::env;
use std::error::Error;
use std::process::ExitCode;

fn run(args: &[String]) -> Result<bool, Box<dyn Error>> {
    let [flight, lidar, out, rest @ ..] = args else {
        return Err("expected <flight_path.csv> <lidar.csv> <out.csv>".into());
    };
    let mut mapper_config = MapperConfig::default();
    let mut search_config = SearchConfig::default();
    if let Some(cell_size) = rest.first() {
        mapper_config.cell_size = cell_size.parse()?;
    }
    if let Some(tolerance) = rest.get(1) {
        mapper_config.tolerance = tolerance.parse()?;
    }
    if let Some(radius) = rest.get(2) {
        search_config.clearance_radius = radius.parse()?;
    }

    let poses = PoseTable::from_poses(load_flight_path(flight)?)?;
    let sweeps: Vec<SweepReading> = load_lidar_sweeps(lidar)?
        .into_iter()
        .map(SweepReading::from)
        .collect();
    info!("Loaded {} poses and {} readings", poses.len(), sweeps.len());

    let mapper = GridMapper::new(mapper_config);
    let grid = mapper.map(&poses, &sweeps)?;
    let (start, end) = mapper.endpoints(&poses, &grid)?;
    println!("{}", grid);

    let mut search = PathSearch::new(&grid, search_config);
    let outcome = search.search(start, end)?;
    println!("{}", outcome);
    let Some(path) = outcome.into_path() else {
        return Ok(false);
    };
    let points: Vec<(f64, f64)> = path.to_world(&grid).into_iter().map(Into::into).collect();
    save_path(out, &points)?;
    info!("Wrote {} waypoints to {}", points.len(), out);
    Ok(true)
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
