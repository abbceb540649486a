//! Axis-aligned tile bounding boxes, in fixed-point units and degrees.

use geojson::{Feature, GeoJson, Geometry, Value};

use crate::coord::{NdsCoordinate, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

/// A tile bounding box in fixed-point units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdsBBox {
    pub north: i32,
    pub east: i32,
    pub south: i32,
    pub west: i32,
}

impl NdsBBox {
    /// The level-0 tile 0: [0°, 180°] x [-90°, 90°].
    pub const EAST_HEMISPHERE: NdsBBox = NdsBBox {
        north: MAX_LATITUDE,
        east: MAX_LONGITUDE,
        south: MIN_LATITUDE,
        west: 0,
    };

    /// The level-0 tile 1: [-180°, 0°] x [-90°, 90°].
    pub const WEST_HEMISPHERE: NdsBBox = NdsBBox {
        north: MAX_LATITUDE,
        east: 0,
        south: MIN_LATITUDE,
        west: MIN_LONGITUDE,
    };

    pub fn new(north: i32, east: i32, south: i32, west: i32) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
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

    pub fn center(&self) -> NdsCoordinate {
        self.south_west().midpoint(&self.north_east())
    }

    pub fn to_wgs84(&self) -> Wgs84BBox {
        let sw = self.south_west().to_wgs84();
        let ne = self.north_east().to_wgs84();
        Wgs84BBox {
            north: ne.y,
            east: ne.x,
            south: sw.y,
            west: sw.x,
        }
    }

    /// Serializes to a GeoJSON `Polygon` feature in degrees.
    pub fn to_geojson(&self) -> String {
        self.to_wgs84().to_geojson()
    }
}

/// A bounding box in WGS84 degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wgs84BBox {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Wgs84BBox {
    /// Serializes to a GeoJSON `Polygon` feature with a closed ring in
    /// SW, SE, NE, NW, SW order and `[longitude, latitude]` pairs.
    pub fn to_geojson(&self) -> String {
        let ring = vec![
            vec![self.west, self.south],
            vec![self.east, self.south],
            vec![self.east, self.north],
            vec![self.west, self.north],
            vec![self.west, self.south],
        ];
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        GeoJson::Feature(feature).to_string()
    }
}
