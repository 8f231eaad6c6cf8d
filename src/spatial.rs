use serde::{Deserialize, Serialize};

/// SRID of a WGS-84 longitude/latitude point.
pub const SRID_WGS84_2D: i64 = 4326;
/// SRID of a WGS-84 longitude/latitude/height point.
pub const SRID_WGS84_3D: i64 = 4979;
/// SRID of a two-dimensional cartesian point.
pub const SRID_CARTESIAN_2D: i64 = 7203;
/// SRID of a three-dimensional cartesian point.
pub const SRID_CARTESIAN_3D: i64 = 9157;

/// A point in some coordinate system, tagged with a spatial reference
/// identifier.
///
/// The codec only carries two- and three-dimensional points; anything else
/// is rejected at pack time. Construction is unrestricted so that callers
/// can build a point before deciding how to ship it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    srid: i64,
    coordinates: Vec<f64>,
}

impl Point {
    pub fn new(srid: i64, coordinates: Vec<f64>) -> Point {
        Point { srid, coordinates }
    }

    /// A 2D cartesian point.
    pub fn cartesian(x: f64, y: f64) -> Point {
        Point::new(SRID_CARTESIAN_2D, vec![x, y])
    }

    /// A 3D cartesian point.
    pub fn cartesian_3d(x: f64, y: f64, z: f64) -> Point {
        Point::new(SRID_CARTESIAN_3D, vec![x, y, z])
    }

    /// A WGS-84 longitude/latitude point.
    pub fn wgs84(longitude: f64, latitude: f64) -> Point {
        Point::new(SRID_WGS84_2D, vec![longitude, latitude])
    }

    /// A WGS-84 longitude/latitude/height point.
    pub fn wgs84_3d(longitude: f64, latitude: f64, height: f64) -> Point {
        Point::new(SRID_WGS84_3D, vec![longitude, latitude, height])
    }

    pub fn srid(&self) -> i64 {
        self.srid
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn dimensions(&self) -> usize {
        self.coordinates.len()
    }

    pub fn x(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    pub fn y(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }

    pub fn z(&self) -> Option<f64> {
        self.coordinates.get(2).copied()
    }
}
