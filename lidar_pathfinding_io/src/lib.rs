//! Readers for the two text formats produced during a survey flight and a writer for planned
//! paths. Everything is returned as plain tuples so the mapping crate stays free of I/O.
//!
//! - Flight path: records span two lines, a header line whose first field is the scan id and an
//!   `x,y` line with the drone position.
//! - LIDAR sweeps: a header line `scan_id,count` followed by `count` lines of `angle,distance`,
//!   angle in degrees and distance in millimetres.
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: missing {field}")]
    MissingField { line: u64, field: &'static str },
    #[error("line {line}: could not parse {field} from {value:?}")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("scan {scan} announces {expected} readings but the file ends after {found}")]
    Truncated {
        scan: u32,
        expected: usize,
        found: usize,
    },
    #[error("scan {scan} has no position line")]
    OddPoseRecord { scan: u32 },
}

/// A 2D point as written to and read from path files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

fn reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn field<T: FromStr>(
    record: &StringRecord,
    ix: usize,
    name: &'static str,
) -> Result<T, LoadError> {
    let line = line_of(record);
    let value = record
        .get(ix)
        .ok_or(LoadError::MissingField { line, field: name })?;
    value.parse::<T>().map_err(|_| LoadError::Parse {
        line,
        field: name,
        value: value.to_owned(),
    })
}

/// Parses a flight path into `(scan, x, y)` tuples in file order.
pub fn read_flight_path<R: io::Read>(rdr: R) -> Result<Vec<(u32, f64, f64)>, LoadError> {
    let mut poses = Vec::new();
    let mut pending: Option<u32> = None;
    for result in reader(rdr).records() {
        let record = result?;
        match pending.take() {
            None => pending = Some(field(&record, 0, "scan id")?),
            Some(scan) => {
                let x = field(&record, 0, "x")?;
                let y = field(&record, 1, "y")?;
                poses.push((scan, x, y));
            }
        }
    }
    if let Some(scan) = pending {
        return Err(LoadError::OddPoseRecord { scan });
    }
    debug!("Read {} poses", poses.len());
    Ok(poses)
}

/// Parses framed sweeps into `(scan, angle_deg, distance_mm)` tuples in file order.
pub fn read_lidar_sweeps<R: io::Read>(rdr: R) -> Result<Vec<(u32, f64, f64)>, LoadError> {
    let mut readings = Vec::new();
    // (scan, announced, seen so far)
    let mut frame: Option<(u32, usize, usize)> = None;
    for result in reader(rdr).records() {
        let record = result?;
        match frame {
            Some((scan, expected, found)) if found < expected => {
                let angle = field(&record, 0, "angle")?;
                let distance = field(&record, 1, "distance")?;
                readings.push((scan, angle, distance));
                frame = Some((scan, expected, found + 1));
            }
            _ => {
                let scan = field(&record, 0, "scan id")?;
                let expected = field(&record, 1, "reading count")?;
                frame = Some((scan, expected, 0));
            }
        }
    }
    if let Some((scan, expected, found)) = frame {
        if found < expected {
            return Err(LoadError::Truncated {
                scan,
                expected,
                found,
            });
        }
    }
    debug!("Read {} sweep readings", readings.len());
    Ok(readings)
}

/// Writes one `x,y` line per point.
pub fn write_path<W: io::Write>(wtr: W, points: &[(f64, f64)]) -> Result<(), LoadError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(wtr);
    for &(x, y) in points {
        writer.serialize(PointRecord { x, y })?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a path written by [write_path].
pub fn read_path<R: io::Read>(rdr: R) -> Result<Vec<(f64, f64)>, LoadError> {
    reader(rdr)
        .deserialize::<PointRecord>()
        .map(|r| r.map(|p| (p.x, p.y)).map_err(LoadError::from))
        .collect()
}

pub fn load_flight_path<P: AsRef<Path>>(path: P) -> Result<Vec<(u32, f64, f64)>, LoadError> {
    read_flight_path(BufReader::new(File::open(path)?))
}

pub fn load_lidar_sweeps<P: AsRef<Path>>(path: P) -> Result<Vec<(u32, f64, f64)>, LoadError> {
    read_lidar_sweeps(BufReader::new(File::open(path)?))
}

pub fn save_path<P: AsRef<Path>>(path: P, points: &[(f64, f64)]) -> Result<(), LoadError> {
    write_path(BufWriter::new(File::create(path)?), points)
}
