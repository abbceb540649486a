//! Tile addressing for the quadtree partition of the globe.
//!
//! A tile is identified by its level (0..=15) and its tile number; the
//! tile number equals the `2 * level + 1` most significant bits of the
//! Morton code of the tile's south-west corner. Level and number pack
//! into a single 32-bit id for interchange.

use geo::Coord;

use crate::bbox::NdsBBox;
use crate::coord::{NdsCoordinate, LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::error::{NdsError, Result};

/// The finest tile level of the scheme.
pub const MAX_LEVEL: u8 = 15;

/// One cell of the quadtree partition, at `level` with `number` in
/// `0..2^(2 * level + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdsTile {
    level: u8,
    number: u32,
}

impl NdsTile {
    /// Creates a tile from an explicit level and tile number.
    pub fn new(level: u8, number: u32) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(NdsError::InvalidLevel(level));
        }
        let max = (1u32 << (2 * level as u32 + 1)) - 1;
        if number > max {
            return Err(NdsError::InvalidTileNumber { level, number, max });
        }
        Ok(Self { level, number })
    }

    /// Decodes a packed tile id.
    ///
    /// The level marker is the highest set bit at position `16 + level`;
    /// for level 15 that is bit 31, so every id with the top bit set
    /// decodes to level 15. Ids without any marker bit are rejected, as
    /// are ids whose remaining bits exceed the tile-number range of the
    /// decoded level.
    pub fn from_packed(id: u32) -> Result<Self> {
        let level = (0..=MAX_LEVEL)
            .rev()
            .find(|&lvl| id & (1u32 << (16 + lvl as u32)) != 0)
            .ok_or(NdsError::InvalidTileId(id))?;
        Self::new(level, id ^ (1u32 << (16 + level as u32)))
    }

    /// The tile at `level` containing the given coordinate.
    ///
    /// The tile number is the coordinate's Morton code truncated to the
    /// top `2 * level + 1` bits (south-west-corner convention).
    pub fn from_coordinate(level: u8, coord: NdsCoordinate) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(NdsError::InvalidLevel(level));
        }
        let number = (coord.morton_code() >> morton_shift(level)) as u32;
        Ok(Self { level, number })
    }

    /// The tile at `level` containing a WGS84 position.
    pub fn from_wgs84(level: u8, c: Coord) -> Result<Self> {
        Self::from_coordinate(level, NdsCoordinate::from_wgs84(c))
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The packed 32-bit id: the tile number with the level marker bit
    /// set at position `16 + level`.
    pub fn packed_id(&self) -> u32 {
        self.number | (1u32 << (16 + self.level as u32))
    }

    /// True iff the coordinate's Morton code truncated to this tile's
    /// level equals the tile number.
    pub fn contains(&self, coord: NdsCoordinate) -> bool {
        self.number == (coord.morton_code() >> morton_shift(self.level)) as u32
    }

    fn south_west_morton(&self) -> u64 {
        (self.number as u64) << morton_shift(self.level)
    }

    /// The tile's bounding box in fixed-point units.
    ///
    /// Level 0 is the east/west hemisphere split; for finer levels the
    /// south-west corner comes out of the Morton code and the north/east
    /// edges add one tile span, with a one-unit correction on negative
    /// components for the fixed-point rounding of the range midpoint.
    pub fn bounding_box(&self) -> NdsBBox {
        if self.level == 0 {
            return if self.number == 0 {
                NdsBBox::EAST_HEMISPHERE
            } else {
                NdsBBox::WEST_HEMISPHERE
            };
        }
        let sw = NdsCoordinate::from_morton(self.south_west_morton());
        let north = span_north(sw.latitude, self.level);
        let east = span_east(sw.longitude, self.level);
        NdsBBox::new(north, east, sw.latitude, sw.longitude)
    }

    /// The tile's center coordinate.
    pub fn center(&self) -> NdsCoordinate {
        if self.level == 0 {
            return if self.number == 0 {
                NdsCoordinate::new(crate::coord::MAX_LONGITUDE / 2, 0)
            } else {
                NdsCoordinate::new(crate::coord::MIN_LONGITUDE / 2, 0)
            };
        }
        // same construction as the bounding box, one level finer
        let sw = NdsCoordinate::from_morton(self.south_west_morton());
        NdsCoordinate::new(span_east(sw.longitude, self.level + 1), span_north(sw.latitude, self.level + 1))
    }

    /// The four corners in SW, SE, NE, NW order.
    pub fn corners(&self) -> [NdsCoordinate; 4] {
        let bb = self.bounding_box();
        [
            bb.south_west(),
            bb.south_east(),
            bb.north_east(),
            bb.north_west(),
        ]
    }

    /// Child tile numbers one level finer, in SW, SE, NE, NW order.
    ///
    /// The quadrant bits are (bit 0 = X parity, bit 1 = Y parity), so SE
    /// and NW are out of numeric sequence. Interoperability depends on
    /// this exact ordering.
    pub fn child_numbers(&self) -> [u32; 4] {
        let base = self.number << 2;
        [base, base + 1, base + 3, base + 2]
    }

    pub fn child_number_south_west(&self) -> u32 {
        self.number << 2
    }

    pub fn child_number_south_east(&self) -> u32 {
        (self.number << 2) + 1
    }

    pub fn child_number_north_east(&self) -> u32 {
        (self.number << 2) + 3
    }

    pub fn child_number_north_west(&self) -> u32 {
        (self.number << 2) + 2
    }

    /// Planar grid index of this tile, with `x` in `0..2^(level + 1)`
    /// (west to east) and `y` in `0..2^level` (south to north).
    pub fn tile_xy(&self) -> (u32, u32) {
        let tile_size_x = 360.0 / (1u64 << (self.level as u32 + 1)) as f64;
        let tile_size_y = 180.0 / (1u64 << self.level as u32) as f64;
        let center = self.center().to_wgs84();
        // back off to the south-west corner, then index into the grid
        let lon = center.x - 0.5 * tile_size_x;
        let lat = center.y - 0.5 * tile_size_y;
        let x = ((lon + 180.0) / tile_size_x).round() as u32;
        let y = ((lat + 90.0) / tile_size_y).round() as u32;
        (x, y)
    }

    /// The tile at `level` with planar grid index `(x, y)`.
    pub fn from_tile_xy(level: u8, x: u32, y: u32) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(NdsError::InvalidLevel(level));
        }
        let tile_size_x = 360.0 / (1u64 << (level as u32 + 1)) as f64;
        let tile_size_y = 180.0 / (1u64 << level as u32) as f64;
        let lon = x as f64 * tile_size_x + 0.5 * tile_size_x - 180.0;
        let lat = y as f64 * tile_size_y + 0.5 * tile_size_y - 90.0;
        Self::from_wgs84(level, Coord { x: lon, y: lat })
    }

    /// Quadkey of this tile (one base-4 digit per level, MSB first).
    pub fn quadkey(&self) -> String {
        let (x, y) = self.tile_xy();
        quadkey_from_xy(self.level, x, y)
    }

    /// GeoJSON `Polygon` feature of the tile's bounding box.
    pub fn to_geojson(&self) -> String {
        self.bounding_box().to_geojson()
    }
}

/// Bits to drop from a Morton code to keep the tile number at `level`.
fn morton_shift(level: u8) -> u32 {
    32 + (MAX_LEVEL - level) as u32 * 2
}

fn span_north(south: i32, level: u8) -> i32 {
    (south as i64 + (LATITUDE_RANGE >> level) + i64::from(south < 0)) as i32
}

fn span_east(west: i32, level: u8) -> i32 {
    (west as i64 + (LONGITUDE_RANGE >> (level as u32 + 1)) + i64::from(west < 0)) as i32
}

/// Quadkey for a planar grid index: digits `'0' + 2 * y_bit + x_bit`
/// for bit positions `level + 1` down to 1, MSB first.
///
/// This is pure bit arithmetic on the grid index, so it also accepts
/// levels beyond [`MAX_LEVEL`] (up to 30).
pub fn quadkey_from_xy(level: u8, x: u32, y: u32) -> String {
    debug_assert!(level <= 30);
    let mut quadkey = String::with_capacity(level as usize + 1);
    for i in (1..=level as u32 + 1).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = b'0';
        if x & mask != 0 {
            digit += 1;
        }
        if y & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }
    quadkey
}

/// Inverse of [`quadkey_from_xy`]; rejects digits outside `'0'..='3'`
/// and keys too long for a 32-bit grid index.
pub fn xy_from_quadkey(quadkey: &str) -> Result<(u32, u32)> {
    let len = quadkey.len();
    if len == 0 || len > 31 {
        return Err(NdsError::InvalidQuadkey(quadkey.to_owned()));
    }
    let mut x = 0u32;
    let mut y = 0u32;
    for (idx, ch) in quadkey.chars().enumerate() {
        let mask = 1u32 << (len - 1 - idx);
        match ch {
            '0' => {}
            '1' => x |= mask,
            '2' => y |= mask,
            '3' => {
                x |= mask;
                y |= mask;
            }
            _ => return Err(NdsError::InvalidQuadkey(quadkey.to_owned())),
        }
    }
    Ok((x, y))
}
