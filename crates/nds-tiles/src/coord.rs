//! Fixed-point coordinates and the Morton (Z-order) codec.
//!
//! WGS84 degrees map onto a signed fixed-point grid where the full
//! longitude range covers 360° in 32 bits and the full latitude range
//! covers 180° in 31 bits. Interleaving the two integer components
//! yields a 63-bit Morton code whose most significant bits are, at every
//! level simultaneously, the number of the tile containing the point.

use geo::Coord;

/// Easternmost representable longitude (+180°).
pub const MAX_LONGITUDE: i32 = i32::MAX;
/// Westernmost representable longitude (-180°).
pub const MIN_LONGITUDE: i32 = i32::MIN;
/// Northernmost representable latitude (+90°).
pub const MAX_LATITUDE: i32 = i32::MAX / 2;
/// Southernmost representable latitude (-90°).
pub const MIN_LATITUDE: i32 = i32::MIN / 2;

/// Width of the longitude range in fixed-point units (2^32 - 1).
pub const LONGITUDE_RANGE: i64 = MAX_LONGITUDE as i64 - MIN_LONGITUDE as i64;
/// Width of the latitude range in fixed-point units (2^31 - 1).
pub const LATITUDE_RANGE: i64 = MAX_LATITUDE as i64 - MIN_LATITUDE as i64;

/// A WGS84 position in signed fixed-point units.
///
/// The latitude magnitude at the poles is exactly half the longitude
/// magnitude at the antimeridian, so latitude effectively uses 31 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdsCoordinate {
    pub longitude: i32,
    pub latitude: i32,
}

impl NdsCoordinate {
    /// Creates a coordinate from raw fixed-point components.
    ///
    /// The latitude is expected to stay within [`MIN_LATITUDE`],
    /// [`MAX_LATITUDE`]; values outside that band have no geographic
    /// meaning.
    pub fn new(longitude: i32, latitude: i32) -> Self {
        debug_assert!((MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude));
        Self {
            longitude,
            latitude,
        }
    }

    /// Converts from WGS84 degrees (`x` = longitude, `y` = latitude).
    ///
    /// Inputs are clamped into [-180, 180] x [-90, 90] first, so the
    /// conversion is total.
    pub fn from_wgs84(c: Coord) -> Self {
        let lon = c.x.clamp(-180.0, 180.0);
        let lat = c.y.clamp(-90.0, 90.0);
        Self {
            longitude: (lon / 360.0 * LONGITUDE_RANGE as f64).floor() as i32,
            latitude: (lat / 180.0 * LATITUDE_RANGE as f64).floor() as i32,
        }
    }

    /// Converts back to WGS84 degrees.
    pub fn to_wgs84(self) -> Coord {
        Coord {
            x: self.longitude as f64 / LONGITUDE_RANGE as f64 * 360.0,
            y: self.latitude as f64 / LATITUDE_RANGE as f64 * 180.0,
        }
    }

    /// Computes the 63-bit Morton code of this coordinate.
    ///
    /// Longitude bits 0..=30 occupy the even code positions 0..=60 and
    /// the longitude sign bit sits alone at position 62: level 0 splits
    /// the globe into east/west hemispheres with a single bit, and each
    /// finer level contributes one bit per axis. Latitude bits 0..=30
    /// occupy the odd positions 1..=61.
    pub fn morton_code(&self) -> u64 {
        let lon = self.longitude as u32;
        let lat = self.latitude as u32;
        let mut code = 0u64;
        for pos in 0..31 {
            if lon & (1 << pos) != 0 {
                code |= 1 << (2 * pos);
            }
            if lat & (1 << pos) != 0 {
                code |= 1 << (2 * pos + 1);
            }
        }
        if self.longitude < 0 {
            code |= 1 << 62;
        }
        code
    }

    /// Reconstructs a coordinate from a Morton code.
    ///
    /// Exact inverse of [`morton_code`](Self::morton_code); the 31-bit
    /// latitude is sign-extended from bit 30.
    pub fn from_morton(code: u64) -> Self {
        let mut lon = 0u32;
        let mut lat = 0u32;
        for pos in 0..31 {
            if code & (1 << (2 * pos)) != 0 {
                lon |= 1 << pos;
            }
            if code & (1 << (2 * pos + 1)) != 0 {
                lat |= 1 << pos;
            }
        }
        if code & (1 << 62) != 0 {
            lon |= 1 << 31;
        }
        if lat & (1 << 30) != 0 {
            lat |= 1 << 31;
        }
        Self {
            longitude: lon as i32,
            latitude: lat as i32,
        }
    }

    /// Component-wise arithmetic mean (not geodesic).
    pub fn midpoint(&self, other: &NdsCoordinate) -> NdsCoordinate {
        NdsCoordinate {
            longitude: ((self.longitude as i64 + other.longitude as i64) / 2) as i32,
            latitude: ((self.latitude as i64 + other.latitude as i64) / 2) as i32,
        }
    }

    /// Translates by a fixed-point delta, clamping at the coordinate
    /// range boundaries rather than wrapping.
    pub fn offset(&self, delta_longitude: i32, delta_latitude: i32) -> NdsCoordinate {
        let lon = (self.longitude as i64 + delta_longitude as i64)
            .clamp(MIN_LONGITUDE as i64, MAX_LONGITUDE as i64);
        let lat = (self.latitude as i64 + delta_latitude as i64)
            .clamp(MIN_LATITUDE as i64, MAX_LATITUDE as i64);
        NdsCoordinate {
            longitude: lon as i32,
            latitude: lat as i32,
        }
    }
}
