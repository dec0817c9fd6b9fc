use lidar_pathfinding::{GridCoord, OccupancyGrid, PathSearch, SearchConfig};

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have an 8-neighborhood and the agent is a single cell (clearance radius 0)

fn main() {
    let grid = OccupancyGrid::from_rows(&[
        [false, false, false],
        [false, true, false],
        [false, false, false],
    ]);
    println!("{}", grid);
    let mut search = PathSearch::new(
        &grid,
        SearchConfig {
            clearance_radius: 0,
            ..Default::default()
        },
    );
    let start = GridCoord::new(0, 0);
    let end = GridCoord::new(2, 2);
    match search.search(start, end) {
        Ok(outcome) => {
            println!("{}", outcome);
            if let Some(path) = outcome.path() {
                println!("Path:");
                for p in &path.cells {
                    println!("{:?}", p);
                }
            }
        }
        Err(e) => println!("Search refused: {}", e),
    }
}
