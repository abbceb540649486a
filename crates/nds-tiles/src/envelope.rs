//! Axis-aligned envelope of a point set and the master-tile search.

use geo::Coord;
use tracing::debug;

use crate::coord::NdsCoordinate;
use crate::error::{NdsError, Result};
use crate::tile::{NdsTile, MAX_LEVEL};

/// Min/max reduction over fixed-point coordinates.
///
/// The reduction is purely componentwise, so a point set straddling the
/// antimeridian produces an envelope spanning most of the globe rather
/// than the short way around; [`NdsEnvelope::master_tile`] then fails
/// with [`NdsError::UnresolvableMasterTile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdsEnvelope {
    north: i32,
    east: i32,
    south: i32,
    west: i32,
}

impl NdsEnvelope {
    /// The degenerate envelope of a single point.
    pub fn new(point: NdsCoordinate) -> Self {
        Self {
            north: point.latitude,
            east: point.longitude,
            south: point.latitude,
            west: point.longitude,
        }
    }

    /// Envelope of a non-empty point set.
    pub fn from_points(points: &[NdsCoordinate]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or(NdsError::InvalidPolygon)?;
        let mut env = Self::new(*first);
        for p in rest {
            env.expand(*p);
        }
        Ok(env)
    }

    /// Envelope of a non-empty WGS84 point set.
    pub fn from_wgs84(points: &[Coord]) -> Result<Self> {
        let fixed: Vec<NdsCoordinate> = points
            .iter()
            .map(|&c| NdsCoordinate::from_wgs84(c))
            .collect();
        Self::from_points(&fixed)
    }

    /// Grows the envelope to include `point`.
    pub fn expand(&mut self, point: NdsCoordinate) {
        self.north = self.north.max(point.latitude);
        self.east = self.east.max(point.longitude);
        self.south = self.south.min(point.latitude);
        self.west = self.west.min(point.longitude);
    }

    pub fn south_west(&self) -> NdsCoordinate {
        NdsCoordinate::new(self.west, self.south)
    }

    pub fn south_east(&self) -> NdsCoordinate {
        NdsCoordinate::new(self.east, self.south)
    }

    pub fn north_east(&self) -> NdsCoordinate {
        NdsCoordinate::new(self.east, self.north)
    }

    pub fn north_west(&self) -> NdsCoordinate {
        NdsCoordinate::new(self.west, self.north)
    }

    /// The corners in SW, SE, NE, NW order.
    pub fn corners(&self) -> [NdsCoordinate; 4] {
        [
            self.south_west(),
            self.south_east(),
            self.north_east(),
            self.north_west(),
        ]
    }

    /// The deepest tile above `max_level` containing the whole
    /// envelope.
    ///
    /// Descends through levels `0..max_level` (capped at the scheme's
    /// level range) while all four corners share a tile number and
    /// keeps the last level where they did. Fails when the corners
    /// already diverge at level 0, which happens exactly when the
    /// envelope spans the antimeridian, or when `max_level` is 0.
    pub fn master_tile(&self, max_level: u8) -> Result<NdsTile> {
        let mut master: Option<NdsTile> = None;
        for level in 0..max_level.min(MAX_LEVEL + 1) {
            let tiles = self
                .corners()
                .map(|c| NdsTile::from_coordinate(level, c).map(|t| t.number()));
            let [first, rest @ ..] = tiles;
            let first = first?;
            let mut all_equal = true;
            for n in rest {
                all_equal &= n? == first;
            }
            if !all_equal {
                break;
            }
            master = Some(NdsTile::new(level, first)?);
        }
        let tile = master.ok_or(NdsError::UnresolvableMasterTile)?;
        debug!(
            level = tile.level(),
            number = tile.number(),
            "resolved master tile"
        );
        Ok(tile)
    }
}
