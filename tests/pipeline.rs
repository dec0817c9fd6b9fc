/// End to end: synthetic flight files are parsed, mapped into a grid, searched and the path is
/// written back out in world coordinates.
use lidar_pathfinding::*;
use lidar_pathfinding_io::{read_flight_path, read_lidar_sweeps, read_path, write_path};
use std::fmt::Write;

const POSES: [(f64, f64); 5] = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];

/// Points on the walls of the room `[-1, 5] x [-1, 1]`, sampled every 5 cm.
fn room_walls() -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    for i in 0..=120 {
        let x = -1.0 + i as f64 * 0.05;
        points.push((x, -1.0));
        points.push((x, 1.0));
    }
    for i in 0..=40 {
        let y = -1.0 + i as f64 * 0.05;
        points.push((-1.0, y));
        points.push((5.0, y));
    }
    points
}

/// A wall across the room at `x = 2`.
fn partition() -> Vec<(f64, f64)> {
    (0..=40).map(|i| (2.0, -1.0 + i as f64 * 0.05)).collect()
}

fn flight_csv() -> String {
    let mut out = String::new();
    for (scan, (x, y)) in POSES.iter().enumerate() {
        writeln!(out, "{},1", scan).unwrap();
        writeln!(out, "{},{}", x, y).unwrap();
    }
    out
}

/// Every pose sees every target. Each frame also carries a reading below the noise floor.
fn lidar_csv(targets: &[(f64, f64)], extra_distance_mm: f64) -> String {
    let mut out = String::new();
    for (scan, (x0, y0)) in POSES.iter().enumerate() {
        writeln!(out, "{},{}", scan, targets.len() + 1).unwrap();
        for (x, y) in targets {
            let (dx, dy) = (x - x0, y - y0);
            let angle = (-dy).atan2(dx).to_degrees();
            let distance = dx.hypot(dy) * 1000.0;
            writeln!(out, "{},{}", angle, distance).unwrap();
        }
        writeln!(out, "45,{}", extra_distance_mm).unwrap();
    }
    out
}

fn load(targets: &[(f64, f64)]) -> (PoseTable, Vec<SweepReading>) {
    let poses = PoseTable::from_poses(read_flight_path(flight_csv().as_bytes()).unwrap()).unwrap();
    let sweeps = read_lidar_sweeps(lidar_csv(targets, 50.0).as_bytes())
        .unwrap()
        .into_iter()
        .map(SweepReading::from)
        .collect();
    (poses, sweeps)
}

#[test]
fn flight_through_empty_room() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (poses, sweeps) = load(&room_walls());
    assert_eq!(sweeps.len(), POSES.len() * (room_walls().len() + 1));

    let mapper = GridMapper::default();
    let grid = mapper.map(&poses, &sweeps).unwrap();
    assert!(grid.occupied_count() > 0);
    let (start, end) = mapper.endpoints(&poses, &grid).unwrap();

    let mut search = PathSearch::new(&grid, SearchConfig::default());
    let path = search.search(start, end).unwrap().into_path().unwrap();
    assert_eq!(path.cells.first(), Some(&start));
    assert_eq!(path.cells.last(), Some(&end));
    assert!(is_connected(&path.cells));

    let world: Vec<(f64, f64)> = path.to_world(&grid).into_iter().map(Into::into).collect();
    let mut buffer = Vec::new();
    write_path(&mut buffer, &world).unwrap();
    let exported = read_path(buffer.as_slice()).unwrap();
    assert_eq!(exported.len(), path.len());

    // Binning and its affine inverse agree to within two cell widths per axis
    let dx = 2.0 * grid.x_bins().cell_width();
    let dy = 2.0 * grid.y_bins().cell_width();
    let (first, last) = (exported[0], exported[exported.len() - 1]);
    assert!((first.0 - POSES[0].0).abs() <= dx && (first.1 - POSES[0].1).abs() <= dy);
    assert!((last.0 - POSES[4].0).abs() <= dx && (last.1 - POSES[4].1).abs() <= dy);
}

#[test]
fn world_round_trip_inside_the_map() {
    let (poses, sweeps) = load(&room_walls());
    let grid = GridMapper::default().map(&poses, &sweeps).unwrap();
    let (xb, yb) = (grid.x_bins(), grid.y_bins());
    let dx = 2.0 * xb.cell_width() + 1e-9;
    let dy = 2.0 * yb.cell_width() + 1e-9;
    let steps = 200;
    for i in 0..=steps {
        for j in 0..=steps {
            let p = WorldPoint::new(
                xb.offset + xb.span * i as f64 / steps as f64,
                yb.offset + yb.span * j as f64 / steps as f64,
            );
            let cell = grid.to_grid(p);
            assert!(grid.in_bounds(cell), "{:?} left the grid", p);
            let back = grid.to_world(cell);
            assert!((back.x - p.x).abs() <= dx, "{:?} came back as {:?}", p, back);
            assert!((back.y - p.y).abs() <= dy, "{:?} came back as {:?}", p, back);
        }
    }
}

#[test]
fn partition_blocks_the_flight() {
    let mut targets = room_walls();
    targets.extend(partition());
    let (poses, sweeps) = load(&targets);
    let mapper = GridMapper::default();
    let grid = mapper.map(&poses, &sweeps).unwrap();
    let (start, end) = mapper.endpoints(&poses, &grid).unwrap();
    let outcome = PathSearch::new(&grid, SearchConfig::default())
        .search(start, end)
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::NoPath { .. }));
}

#[test]
fn noise_only_sweeps_leave_no_obstacles() {
    let poses = PoseTable::from_poses(read_flight_path(flight_csv().as_bytes()).unwrap()).unwrap();
    let sweeps: Vec<SweepReading> = read_lidar_sweeps(lidar_csv(&[], 100.0).as_bytes())
        .unwrap()
        .into_iter()
        .map(SweepReading::from)
        .collect();
    assert_eq!(sweeps.len(), POSES.len());
    assert_eq!(
        GridMapper::default().map(&poses, &sweeps),
        Err(MapError::EmptyObstacleCloud)
    );
}

#[test]
fn tolerance_only_removes_obstacles() {
    let (poses, sweeps) = load(&room_walls());
    let counts: Vec<usize> = [0, 1, 2, 5, 10, 20, 1000]
        .into_iter()
        .map(|tolerance| {
            GridMapper::new(MapperConfig {
                tolerance,
                ..Default::default()
            })
            .map(&poses, &sweeps)
            .unwrap()
            .occupied_count()
        })
        .collect();
    assert!(counts.windows(2).all(|w| w[1] <= w[0]));
    assert!(counts[0] > 0);
    assert_eq!(counts[counts.len() - 1], 0);
}
