//! Drone poses, LIDAR sweep readings and their conversion into absolute obstacle points.
use log::debug;

use crate::coord::WorldPoint;
use crate::error::MapError;
use crate::FxIndexMap;

/// Position of the drone at the moment a scan was taken.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DronePose {
    pub scan: u32,
    pub position: WorldPoint,
}

impl From<(u32, f64, f64)> for DronePose {
    fn from((scan, x, y): (u32, f64, f64)) -> Self {
        DronePose {
            scan,
            position: WorldPoint::new(x, y),
        }
    }
}

/// A single polar range reading. The angle is in degrees, the distance in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepReading {
    pub scan: u32,
    pub angle_deg: f64,
    pub distance_mm: f64,
}

impl SweepReading {
    pub fn new(scan: u32, angle_deg: f64, distance_mm: f64) -> SweepReading {
        SweepReading {
            scan,
            angle_deg,
            distance_mm,
        }
    }

    /// Absolute position of the detected point as seen from `origin`. The Y axis points the
    /// opposite way to the sensor's angular convention, hence the subtraction.
    pub fn project(&self, origin: WorldPoint) -> WorldPoint {
        let range = self.distance_mm / 1000.0;
        let theta = self.angle_deg.to_radians();
        WorldPoint::new(origin.x + range * theta.cos(), origin.y - range * theta.sin())
    }
}

impl From<(u32, f64, f64)> for SweepReading {
    fn from((scan, angle_deg, distance_mm): (u32, f64, f64)) -> Self {
        SweepReading::new(scan, angle_deg, distance_mm)
    }
}

/// An obstacle detection in world coordinates, tagged with the scan that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstaclePoint {
    pub scan: u32,
    pub position: WorldPoint,
}

/// Drone poses keyed by scan id, kept in acquisition order. Scan ids must be strictly increasing.
#[derive(Clone, Debug, Default)]
pub struct PoseTable {
    poses: FxIndexMap<u32, WorldPoint>,
}

impl PoseTable {
    /// Builds the table, rejecting empty input and ids that do not strictly increase.
    pub fn from_poses<I>(poses: I) -> Result<PoseTable, MapError>
    where
        I: IntoIterator,
        I::Item: Into<DronePose>,
    {
        let mut table = FxIndexMap::default();
        let mut previous: Option<u32> = None;
        for pose in poses {
            let pose: DronePose = pose.into();
            if let Some(previous) = previous {
                if pose.scan <= previous {
                    return Err(MapError::NonIncreasingScan {
                        previous,
                        scan: pose.scan,
                    });
                }
            }
            previous = Some(pose.scan);
            table.insert(pose.scan, pose.position);
        }
        if table.is_empty() {
            return Err(MapError::EmptyPoses);
        }
        Ok(PoseTable { poses: table })
    }

    pub fn get(&self, scan: u32) -> Option<WorldPoint> {
        self.poses.get(&scan).copied()
    }

    /// Pose of the earliest scan.
    pub fn first(&self) -> Option<DronePose> {
        self.poses
            .first()
            .map(|(&scan, &position)| DronePose { scan, position })
    }

    /// Pose of the latest scan.
    pub fn last(&self) -> Option<DronePose> {
        self.poses
            .last()
            .map(|(&scan, &position)| DronePose { scan, position })
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DronePose> + '_ {
        self.poses
            .iter()
            .map(|(&scan, &position)| DronePose { scan, position })
    }
}

/// Joins every reading to the pose of its scan and projects it into world coordinates. Readings
/// at or below `noise_floor_mm`, or that do not project to a finite point, are dropped. Every
/// reading must reference a known scan, filtered or not.
pub fn build_obstacle_cloud(
    poses: &PoseTable,
    sweeps: &[SweepReading],
    noise_floor_mm: f64,
) -> Result<Vec<ObstaclePoint>, MapError> {
    if poses.is_empty() {
        return Err(MapError::EmptyPoses);
    }
    if sweeps.is_empty() {
        return Err(MapError::EmptySweeps);
    }
    let mut cloud = Vec::with_capacity(sweeps.len());
    for reading in sweeps {
        let origin = poses
            .get(reading.scan)
            .ok_or(MapError::UnknownScan { scan: reading.scan })?;
        if reading.distance_mm > noise_floor_mm {
            let position = reading.project(origin);
            if position.x.is_finite() && position.y.is_finite() {
                cloud.push(ObstaclePoint {
                    scan: reading.scan,
                    position,
                });
            }
        }
    }
    debug!(
        "{} of {} readings survive the {} mm noise floor",
        cloud.len(),
        sweeps.len(),
        noise_floor_mm
    );
    if cloud.is_empty() {
        return Err(MapError::EmptyObstacleCloud);
    }
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn poses() -> PoseTable {
        PoseTable::from_poses([(0, 0.0, 0.0), (1, 1.0, 2.0)]).unwrap()
    }

    #[test]
    fn projection_follows_sensor_convention() {
        let origin = WorldPoint::new(1.0, 2.0);
        let east = SweepReading::new(1, 0.0, 1500.0).project(origin);
        assert_relative_eq!(east.x, 2.5);
        assert_relative_eq!(east.y, 2.0);
        // 90 degrees points towards negative Y
        let quarter = SweepReading::new(1, 90.0, 1000.0).project(origin);
        assert_relative_eq!(quarter.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn noise_floor_is_exclusive() {
        let sweeps = [
            SweepReading::new(0, 0.0, 100.0),
            SweepReading::new(0, 0.0, 100.5),
            SweepReading::new(1, 180.0, 50.0),
        ];
        let cloud = build_obstacle_cloud(&poses(), &sweeps, 100.0).unwrap();
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud[0].scan, 0);
    }

    #[test]
    fn all_readings_filtered() {
        let sweeps = [
            SweepReading::new(0, 10.0, 100.0),
            SweepReading::new(1, 20.0, 3.0),
        ];
        assert_eq!(
            build_obstacle_cloud(&poses(), &sweeps, 100.0),
            Err(MapError::EmptyObstacleCloud)
        );
    }

    #[test]
    fn unknown_scan_is_rejected() {
        // Filtered readings are still checked
        let sweeps = [
            SweepReading::new(0, 10.0, 500.0),
            SweepReading::new(7, 20.0, 3.0),
        ];
        assert_eq!(
            build_obstacle_cloud(&poses(), &sweeps, 100.0),
            Err(MapError::UnknownScan { scan: 7 })
        );
    }

    #[test]
    fn pose_order_is_validated() {
        assert_eq!(
            PoseTable::from_poses(Vec::<DronePose>::new()).unwrap_err(),
            MapError::EmptyPoses
        );
        assert_eq!(
            PoseTable::from_poses([(3, 0.0, 0.0), (3, 1.0, 1.0)]).unwrap_err(),
            MapError::NonIncreasingScan {
                previous: 3,
                scan: 3
            }
        );
        let table = PoseTable::from_poses([(2, 0.0, 0.0), (5, 1.0, 1.0), (9, 4.0, 3.0)]).unwrap();
        assert_eq!(table.first().map(|p| p.scan), Some(2));
        assert_eq!(table.last().map(|p| p.position), Some(WorldPoint::new(4.0, 3.0)));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn empty_sweeps() {
        assert_eq!(
            build_obstacle_cloud(&poses(), &[], 100.0),
            Err(MapError::EmptySweeps)
        );
    }
}
