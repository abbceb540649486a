//! Rasterizes a closed polygon onto the tile grid of a level.
//!
//! The pipeline has four stages, each usable on its own: edge
//! refinement ([`refine_polygon`]), boundary tile extraction
//! ([`unique_tile_numbers_on_level`]), bucketing into scanline rows
//! ([`RowBuckets`]), and interior fill ([`fill_interior`]).
//! [`tile_coverage`] composes them.

mod grid;

use std::collections::BTreeMap;

use geo::Coord;
use tracing::debug;

use crate::error::{NdsError, Result};
use crate::tile::NdsTile;

use grid::FillGrid;

/// Edge subsampling strategy for [`refine_polygon`].
///
/// Boundary tiles are only detected at sampled vertices, so edges much
/// longer than a tile must be subsampled or the outline gets gaps the
/// interior fill cannot recover from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refinement {
    /// Use the polygon vertices as-is.
    Off,
    /// A fixed number of extra samples per edge.
    Fixed(u32),
    /// Enough samples that the longest edge steps in increments of 0.4
    /// tile widths at the target level.
    Adaptive,
}

/// Tile indices bucketed by grid row: `y` to the sorted, deduplicated
/// `x` values present in that row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowBuckets {
    rows: BTreeMap<u32, Vec<u32>>,
}

impl RowBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets tile numbers of one level by their grid row.
    pub fn from_tile_numbers(level: u8, numbers: &[u32]) -> Result<Self> {
        let mut buckets = Self::new();
        for &number in numbers {
            let (x, y) = NdsTile::new(level, number)?.tile_xy();
            buckets.insert(x, y);
        }
        Ok(buckets)
    }

    /// Inserts a grid cell, keeping each row sorted and duplicate-free.
    pub fn insert(&mut self, x: u32, y: u32) {
        let row = self.rows.entry(y).or_default();
        if let Err(pos) = row.binary_search(&x) {
            row.insert(pos, x);
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.rows
            .get(&y)
            .is_some_and(|row| row.binary_search(&x).is_ok())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// `(min_x, max_x, min_y, max_y)` over all cells, `None` when empty.
    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let min_y = *self.rows.keys().next()?;
        let max_y = *self.rows.keys().next_back()?;
        let mut min_x = u32::MAX;
        let mut max_x = 0;
        for row in self.rows.values() {
            // rows are sorted and never empty
            min_x = min_x.min(row[0]);
            max_x = max_x.max(row[row.len() - 1]);
        }
        Some((min_x, max_x, min_y, max_y))
    }

    /// All cells as `(y, x)` pairs, rows ascending, x ascending within a
    /// row.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rows
            .iter()
            .flat_map(|(&y, row)| row.iter().map(move |&x| (y, x)))
    }

    /// Converts the bucketed cells back to tile numbers of `level`, in
    /// `(y, x)` order.
    pub fn tile_numbers(&self, level: u8) -> Result<Vec<u32>> {
        self.cells()
            .map(|(y, x)| NdsTile::from_tile_xy(level, x, y).map(|t| t.number()))
            .collect()
    }
}

/// Rejects polygons with fewer than two distinct vertices.
fn validate_polygon(polygon: &[Coord]) -> Result<()> {
    let mut distinct: Option<Coord> = None;
    for &p in polygon {
        match distinct {
            None => distinct = Some(p),
            Some(q) if p != q => return Ok(()),
            Some(_) => {}
        }
    }
    Err(NdsError::InvalidPolygon)
}

/// Subsamples the edges of a closed polygon.
///
/// Every edge between consecutive vertices gains `samples` evenly
/// interpolated points; the closing vertex is carried over unchanged, so
/// the output has `(n - 1) * (samples + 1) + 1` vertices. With
/// [`Refinement::Adaptive`] the sample count is derived from the longest
/// edge relative to the tile width of `level`.
pub fn refine_polygon(level: u8, polygon: &[Coord], refinement: Refinement) -> Result<Vec<Coord>> {
    validate_polygon(polygon)?;
    let samples = match refinement {
        Refinement::Off | Refinement::Fixed(0) => return Ok(polygon.to_vec()),
        Refinement::Fixed(n) => n,
        Refinement::Adaptive => {
            let tile_size_x = 360.0 / (1u64 << (level as u32 + 1)) as f64;
            let max_edge = polygon
                .windows(2)
                .map(|w| (w[1] - w[0]).x.hypot((w[1] - w[0]).y))
                .fold(0.0f64, f64::max);
            let target = 0.4 * tile_size_x;
            let samples = if max_edge <= target {
                1
            } else {
                (max_edge / target).ceil() as u32
            };
            debug!(level, samples, "adaptive polygon refinement");
            samples
        }
    };
    let edges = polygon.len() - 1;
    let mut refined = Vec::with_capacity(edges * (samples as usize + 1) + 1);
    for w in polygon.windows(2) {
        let (p0, p1) = (w[0], w[1]);
        for j in 0..=samples {
            let t = f64::from(j) / f64::from(samples + 1);
            refined.push(Coord {
                x: p0.x + (p1.x - p0.x) * t,
                y: p0.y + (p1.y - p0.y) * t,
            });
        }
    }
    refined.push(polygon[polygon.len() - 1]);
    Ok(refined)
}

/// Tile number of `level` under each vertex, in vertex order.
pub fn tile_numbers_on_level(level: u8, polygon: &[Coord]) -> Result<Vec<u32>> {
    polygon
        .iter()
        .map(|&p| NdsTile::from_wgs84(level, p).map(|t| t.number()))
        .collect()
}

/// Like [`tile_numbers_on_level`] but deduplicated, keeping first-seen
/// order.
pub fn unique_tile_numbers_on_level(level: u8, polygon: &[Coord]) -> Result<Vec<u32>> {
    let mut numbers = tile_numbers_on_level(level, polygon)?;
    let mut seen = std::collections::HashSet::with_capacity(numbers.len());
    numbers.retain(|&n| seen.insert(n));
    Ok(numbers)
}

/// Fills the interior of a bucketed boundary outline.
///
/// Rasterizes the buckets onto a dense grid over their bounding
/// rectangle, flood-fills from an interior seed and repairs thin gaps.
/// When no interior seed can be found the outline comes back with only
/// the gap repair applied, which also makes the operation a fixpoint on
/// already-filled input.
pub fn fill_interior(buckets: &RowBuckets) -> RowBuckets {
    let Some(mut grid) = FillGrid::from_buckets(buckets) else {
        return RowBuckets::new();
    };
    grid.flood_fill();
    grid.repair_holes();
    grid.into_buckets()
}

/// All tiles of `level` covered by a closed polygon.
///
/// Refines the outline, collects the boundary tiles and fills the
/// interior. The result is ordered by grid row, then column.
pub fn tile_coverage(level: u8, polygon: &[Coord], refinement: Refinement) -> Result<Vec<NdsTile>> {
    let refined = refine_polygon(level, polygon, refinement)?;
    let boundary = unique_tile_numbers_on_level(level, &refined)?;
    debug!(level, tiles = boundary.len(), "polygon boundary rasterized");
    let covered = fill_interior(&RowBuckets::from_tile_numbers(level, &boundary)?);
    covered
        .tile_numbers(level)?
        .into_iter()
        .map(|n| NdsTile::new(level, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::germany_outline;

    fn triangle() -> Vec<Coord> {
        vec![
            Coord { x: 10.5, y: 45.9 },
            Coord { x: 13.0, y: 50.3 },
            Coord { x: 15.0, y: 47.0 },
            Coord { x: 10.5, y: 45.9 },
        ]
    }

    #[test]
    fn test_refinement_off_returns_input() {
        let tri = triangle();
        assert_eq!(refine_polygon(9, &tri, Refinement::Off).unwrap(), tri);
        assert_eq!(refine_polygon(9, &tri, Refinement::Fixed(0)).unwrap(), tri);
    }

    #[test]
    fn test_fixed_refinement_point_count() {
        let refined = refine_polygon(5, &germany_outline(), Refinement::Fixed(3)).unwrap();
        assert_eq!(refined.len(), 16 * 4 + 1);
        // original vertices survive at stride boundaries
        assert_eq!(refined[0], germany_outline()[0]);
        assert_eq!(refined[4], germany_outline()[1]);
        assert_eq!(refined[64], germany_outline()[16]);
    }

    #[test]
    fn test_adaptive_refinement_point_count() {
        // longest Germany edge is ~3.36 degrees, 0.4 tile widths at
        // level 11 is ~0.035 degrees, so 97 samples per edge
        let refined = refine_polygon(11, &germany_outline(), Refinement::Adaptive).unwrap();
        assert_eq!(refined.len(), 16 * 98 + 1);
    }

    #[test]
    fn test_degenerate_polygons_are_rejected() {
        assert_eq!(
            refine_polygon(9, &[], Refinement::Adaptive),
            Err(NdsError::InvalidPolygon)
        );
        let p = Coord { x: 10.0, y: 50.0 };
        assert_eq!(
            tile_coverage(9, &[p, p, p], Refinement::Adaptive),
            Err(NdsError::InvalidPolygon)
        );
    }

    #[test]
    fn test_row_buckets_round_trip() {
        let numbers = [2765788u32, 2765789, 2765790];
        let buckets = RowBuckets::from_tile_numbers(13, &numbers).unwrap();
        let mut back = buckets.tile_numbers(13).unwrap();
        back.sort_unstable();
        assert_eq!(back, numbers);
    }

    #[test]
    fn test_triangle_coverage() {
        let tiles = tile_coverage(9, &triangle(), Refinement::Adaptive).unwrap();
        assert_eq!(tiles.len(), 94);
        let boundary =
            unique_tile_numbers_on_level(9, &refine_polygon(9, &triangle(), Refinement::Adaptive).unwrap())
                .unwrap();
        assert_eq!(boundary.len(), 47);
        for n in boundary {
            assert!(tiles.iter().any(|t| t.number() == n));
        }
    }

    #[test]
    fn test_germany_coverage_and_fixpoint() {
        let level = 11;
        let refined = refine_polygon(level, &germany_outline(), Refinement::Adaptive).unwrap();
        let boundary = unique_tile_numbers_on_level(level, &refined).unwrap();
        assert_eq!(boundary.len(), 465);

        let filled = fill_interior(&RowBuckets::from_tile_numbers(level, &boundary).unwrap());
        assert_eq!(filled.cell_count(), 7615);

        // filling again must not change anything
        assert_eq!(fill_interior(&filled), filled);

        let tiles = tile_coverage(level, &germany_outline(), Refinement::Adaptive).unwrap();
        assert_eq!(tiles.len(), 7615);
    }

    /// Covered tiles must be exactly the boundary tiles plus the cells
    /// sealed off from the outside of the bounding rectangle; nothing
    /// outside the outline may leak in and no enclosed cell may be
    /// missed.
    fn assert_coverage_partition(level: u8, polygon: &[Coord]) {
        use std::collections::HashSet;
        use std::collections::VecDeque;

        let refined = refine_polygon(level, polygon, Refinement::Adaptive).unwrap();
        let boundary = unique_tile_numbers_on_level(level, &refined).unwrap();
        let boundary_xy: HashSet<(i64, i64)> = boundary
            .iter()
            .map(|&n| {
                let (x, y) = NdsTile::new(level, n).unwrap().tile_xy();
                (x as i64, y as i64)
            })
            .collect();
        let covered_xy: HashSet<(i64, i64)> = tile_coverage(level, polygon, Refinement::Adaptive)
            .unwrap()
            .iter()
            .map(|t| {
                let (x, y) = t.tile_xy();
                (x as i64, y as i64)
            })
            .collect();

        let (min_x, max_x, min_y, max_y) = RowBuckets::from_tile_numbers(level, &boundary)
            .unwrap()
            .bounds()
            .unwrap();
        let (min_x, max_x) = (min_x as i64, max_x as i64);
        let (min_y, max_y) = (min_y as i64, max_y as i64);

        // flood the outside, one padding ring around the rectangle
        let mut outside: HashSet<(i64, i64)> = HashSet::new();
        let mut queue = VecDeque::from([(min_x - 1, min_y - 1)]);
        while let Some((x, y)) = queue.pop_front() {
            if x < min_x - 1 || x > max_x + 1 || y < min_y - 1 || y > max_y + 1 {
                continue;
            }
            if boundary_xy.contains(&(x, y)) || !outside.insert((x, y)) {
                continue;
            }
            queue.extend([(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]);
        }

        for cell in &boundary_xy {
            assert!(covered_xy.contains(cell), "boundary cell {cell:?} missing");
        }
        for cell in &covered_xy {
            assert!(
                boundary_xy.contains(cell) || !outside.contains(cell),
                "covered cell {cell:?} is neither boundary nor enclosed"
            );
        }
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                if !boundary_xy.contains(&(x, y)) && !outside.contains(&(x, y)) {
                    assert!(
                        covered_xy.contains(&(x, y)),
                        "enclosed cell ({x}, {y}) missing from coverage"
                    );
                }
            }
        }
    }

    #[test]
    fn test_triangle_coverage_partition() {
        assert_coverage_partition(9, &triangle());
    }

    #[test]
    fn test_germany_coverage_partition() {
        assert_coverage_partition(11, &germany_outline());
    }

    #[test]
    fn test_coverage_tiles_contain_polygon_vertices() {
        let tiles = tile_coverage(9, &triangle(), Refinement::Adaptive).unwrap();
        for v in triangle() {
            let t = NdsTile::from_wgs84(9, v).unwrap();
            assert!(tiles.contains(&t));
        }
    }

    #[test]
    fn test_fill_interior_of_empty_buckets() {
        assert!(fill_interior(&RowBuckets::new()).is_empty());
    }
}
