//! # nds-tiles
//!
//! Quadtree tile addressing on the WGS84 globe.
//!
//! The scheme splits the world into an east and a west hemisphere tile
//! at level 0 and quarters every tile per level down to level 15.
//! Coordinates are 32-bit fixed-point; interleaving their bits yields a
//! Morton code whose prefix is the tile number, so tile lookup is pure
//! integer arithmetic.
//!
//! ## Features
//!
//! - **Coordinate codec**: WGS84 degrees to fixed-point and back, plus
//!   the Morton code of any coordinate
//! - **Tile addresses**: packed 32-bit tile ids, bounding boxes, child
//!   numbering, quadkeys, planar tile-XY indexing
//! - **Master tiles**: deepest single tile covering a point set
//! - **Polygon coverage**: all tiles of a level covered by a closed
//!   polygon, via boundary rasterization and interior flood fill
//!
//! ## Example
//!
//! ```
//! use nds_tiles::prelude::*;
//! use geo::Coord;
//!
//! // the level-13 tile over Barcelona
//! let tile = NdsTile::from_packed(539636700)?;
//! assert_eq!(tile.level(), 13);
//! assert_eq!(tile.number(), 2765788);
//!
//! // the same tile by position
//! let by_pos = NdsTile::from_wgs84(13, Coord { x: 2.0765, y: 41.3661 })?;
//! assert_eq!(by_pos, tile);
//! # Ok::<(), nds_tiles::NdsError>(())
//! ```

pub mod bbox;
pub mod coord;
pub mod envelope;
pub mod error;
pub mod raster;
pub mod tile;

// Re-exports for convenience
pub mod prelude {
    pub use crate::bbox::{NdsBBox, Wgs84BBox};
    pub use crate::coord::NdsCoordinate;
    pub use crate::envelope::NdsEnvelope;
    pub use crate::error::{NdsError, Result};
    pub use crate::raster::{
        fill_interior, refine_polygon, tile_coverage, tile_numbers_on_level,
        unique_tile_numbers_on_level, Refinement, RowBuckets,
    };
    pub use crate::tile::{quadkey_from_xy, xy_from_quadkey, NdsTile, MAX_LEVEL};
}

pub use prelude::*;

#[cfg(test)]
pub(crate) mod test_data {
    use geo::Coord;

    /// Rough outline of Germany, closed, 17 vertices.
    pub fn germany_outline() -> Vec<Coord> {
        [
            (10.5, 45.9),
            (13.0, 45.9),
            (14.0, 49.0),
            (12.0, 50.0),
            (15.0, 51.0),
            (15.0, 54.0),
            (13.5, 54.5),
            (11.0, 54.0),
            (10.0, 55.0),
            (8.5, 55.0),
            (9.0, 54.0),
            (7.0, 53.5),
            (6.0, 52.0),
            (6.1, 50.0),
            (8.0, 49.0),
            (7.5, 47.5),
            (10.5, 45.9),
        ]
        .into_iter()
        .map(|(x, y)| Coord { x, y })
        .collect()
    }
}
