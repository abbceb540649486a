//! Dense scanline grid backing the interior fill.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::RowBuckets;

pub(crate) const BACKGROUND: u8 = 0;
pub(crate) const FILL: u8 = 1;

/// Dense cell grid over the bounding rectangle of a tile set.
///
/// Cells are addressed `(x, y)` with `x` west-to-east and `y`
/// south-to-north; `min_x`/`min_y` anchor the grid back into the global
/// tile-XY plane.
pub(crate) struct FillGrid {
    cells: Vec<u8>,
    dim_x: usize,
    dim_y: usize,
    min_x: u32,
    min_y: u32,
}

impl FillGrid {
    /// Rasterizes bucketed tile indices into a dense grid; `None` for an
    /// empty bucket set.
    pub(crate) fn from_buckets(buckets: &RowBuckets) -> Option<Self> {
        let (min_x, max_x, min_y, max_y) = buckets.bounds()?;
        let dim_x = (max_x - min_x + 1) as usize;
        let dim_y = (max_y - min_y + 1) as usize;
        let mut grid = Self {
            cells: vec![BACKGROUND; dim_x * dim_y],
            dim_x,
            dim_y,
            min_x,
            min_y,
        };
        for (y, x) in buckets.cells() {
            grid.set((x - min_x) as usize, (y - min_y) as usize, FILL);
        }
        Some(grid)
    }

    fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[x * self.dim_y + y]
    }

    fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[x * self.dim_y + y] = value;
    }

    /// Finds a cell strictly inside the boundary outline, walking up the
    /// middle column past the first boundary crossing and then probing
    /// row parity to the east.
    ///
    /// Returns `None` when the column never re-enters background (the
    /// grid is already filled) or when no row has odd crossing parity
    /// (the outline encloses no interior on the probed column).
    pub(crate) fn interior_seed(&self) -> Option<(usize, usize)> {
        let x = self.dim_x / 2;
        let mut y = 0;
        while y < self.dim_y && self.get(x, y) == BACKGROUND {
            y += 1;
        }
        while y < self.dim_y && self.get(x, y) != BACKGROUND {
            y += 1;
        }
        for row in y..self.dim_y {
            let mut crossings = 0u32;
            for col in x..self.dim_x {
                if self.get(col, row - 1) != self.get(col, row) {
                    crossings += u32::from(self.get(col, row));
                }
            }
            if crossings % 2 == 1 {
                return Some((x, row));
            }
        }
        None
    }

    /// Four-way breadth-first fill from the interior seed.
    ///
    /// Without a seed the grid is left as-is; hole repair still runs and
    /// the result degrades to the boundary outline.
    pub(crate) fn flood_fill(&mut self) {
        let Some(seed) = self.interior_seed() else {
            debug!("no interior seed found, skipping flood fill");
            return;
        };
        trace!(x = seed.0, y = seed.1, "flood fill seed");
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        while let Some((x, y)) = queue.pop_front() {
            if self.get(x, y) != BACKGROUND {
                continue;
            }
            self.set(x, y, FILL);
            if x + 1 < self.dim_x {
                queue.push_back((x + 1, y));
            }
            if y + 1 < self.dim_y {
                queue.push_back((x, y + 1));
            }
            if x > 0 {
                queue.push_back((x - 1, y));
            }
            if y > 0 {
                queue.push_back((x, y - 1));
            }
        }
    }

    /// Closes the thin gaps the breadth-first fill can leave behind.
    ///
    /// Two scans: background runs along x whose cells all have filled
    /// north and south neighbors, then runs along y whose cells all have
    /// filled east and west neighbors. A run only fills once it is
    /// terminated by a filled cell on the same line.
    pub(crate) fn repair_holes(&mut self) {
        if self.dim_x < 3 || self.dim_y < 3 {
            return;
        }
        // runs along x at fixed y
        for y in 1..self.dim_y - 1 {
            let mut run_start = 0;
            let mut in_run = false;
            for x in 1..self.dim_x - 1 {
                let cell = self.get(x, y);
                let south = self.get(x, y - 1);
                let north = self.get(x, y + 1);
                let mut run_stop = None;
                if south != BACKGROUND && north != BACKGROUND {
                    if cell == BACKGROUND && self.get(x - 1, y) != BACKGROUND {
                        run_start = x;
                        in_run = true;
                    } else if in_run && cell != BACKGROUND {
                        run_stop = Some(x);
                    }
                } else if in_run && (north != BACKGROUND || south != BACKGROUND) && cell != BACKGROUND
                {
                    run_stop = Some(x);
                } else {
                    in_run = false;
                }
                if let (true, Some(stop)) = (in_run, run_stop) {
                    trace!(y, run_start, stop, "repairing gap along x");
                    for fx in run_start..stop {
                        self.set(fx, y, FILL);
                    }
                    in_run = false;
                }
            }
        }
        // runs along y at fixed x
        for x in 1..self.dim_x - 1 {
            let mut run_start = 0;
            let mut in_run = false;
            for y in 1..self.dim_y - 1 {
                let cell = self.get(x, y);
                let west = self.get(x - 1, y);
                let east = self.get(x + 1, y);
                let mut run_stop = None;
                if east != BACKGROUND && west != BACKGROUND {
                    if cell == BACKGROUND && self.get(x, y - 1) != BACKGROUND {
                        run_start = y;
                        in_run = true;
                    } else if in_run && cell != BACKGROUND {
                        run_stop = Some(y);
                    }
                } else if in_run && (east != BACKGROUND || west != BACKGROUND) && cell != BACKGROUND
                {
                    run_stop = Some(y);
                } else {
                    in_run = false;
                }
                if let (true, Some(stop)) = (in_run, run_stop) {
                    trace!(x, run_start, stop, "repairing gap along y");
                    for fy in run_start..stop {
                        self.set(x, fy, FILL);
                    }
                    in_run = false;
                }
            }
        }
    }

    /// Collects all non-background cells back into row buckets, in
    /// global tile-XY coordinates.
    pub(crate) fn into_buckets(self) -> RowBuckets {
        let mut buckets = RowBuckets::new();
        for y in 0..self.dim_y {
            for x in 0..self.dim_x {
                if self.get(x, y) != BACKGROUND {
                    buckets.insert(x as u32 + self.min_x, y as u32 + self.min_y);
                }
            }
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(cells: &[(u32, u32)]) -> FillGrid {
        let mut buckets = RowBuckets::new();
        for &(x, y) in cells {
            buckets.insert(x, y);
        }
        FillGrid::from_buckets(&buckets).unwrap()
    }

    fn ring() -> Vec<(u32, u32)> {
        let mut cells = Vec::new();
        for i in 0..5 {
            cells.push((i, 0));
            cells.push((i, 4));
            cells.push((0, i));
            cells.push((4, i));
        }
        cells
    }

    #[test]
    fn test_empty_buckets_have_no_grid() {
        assert!(FillGrid::from_buckets(&RowBuckets::new()).is_none());
    }

    fn diamond() -> Vec<(u32, u32)> {
        vec![
            (2, 0),
            (1, 1),
            (3, 1),
            (0, 2),
            (4, 2),
            (1, 3),
            (3, 3),
            (2, 4),
        ]
    }

    #[test]
    fn test_interior_seed_inside_diamond() {
        let grid = grid_of(&diamond());
        assert_eq!(grid.interior_seed(), Some((2, 1)));
    }

    #[test]
    fn test_flood_fill_closes_diamond_interior() {
        let mut grid = grid_of(&diamond());
        grid.flood_fill();
        let filled = grid.into_buckets();
        assert_eq!(filled.cell_count(), 13);
        for (x, y) in [(1, 2), (2, 1), (2, 2), (2, 3), (3, 2)] {
            assert!(filled.contains(x, y));
        }
    }

    #[test]
    fn test_no_seed_on_filled_grid() {
        let mut cells = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                cells.push((x, y));
            }
        }
        let grid = grid_of(&cells);
        assert_eq!(grid.interior_seed(), None);
    }

    #[test]
    fn test_flood_fill_without_seed_is_noop() {
        // a symmetric ring defeats the parity probe; the fill must not
        // touch the grid instead of scanning out of range
        let mut grid = grid_of(&ring());
        assert_eq!(grid.interior_seed(), None);
        grid.flood_fill();
        assert_eq!(grid.into_buckets().cell_count(), 16);
    }

    #[test]
    fn test_repair_fills_gap_along_y() {
        // two full columns with a broken middle column: (2,1) and (2,2)
        // are background but walled in east and west
        let mut cells: Vec<(u32, u32)> = Vec::new();
        for y in 0..5 {
            cells.push((1, y));
            cells.push((3, y));
        }
        cells.extend([(2, 0), (2, 3), (2, 4)]);
        let mut grid = grid_of(&cells);
        grid.repair_holes();
        let filled = grid.into_buckets();
        assert_eq!(filled.cell_count(), 15);
        assert!(filled.contains(2, 1));
        assert!(filled.contains(2, 2));
    }

    #[test]
    fn test_repair_fills_gap_along_x() {
        let mut cells: Vec<(u32, u32)> = Vec::new();
        for x in 0..5 {
            cells.push((x, 1));
            cells.push((x, 3));
        }
        cells.extend([(0, 2), (3, 2), (4, 2)]);
        let mut grid = grid_of(&cells);
        grid.repair_holes();
        let filled = grid.into_buckets();
        assert!(filled.contains(1, 2));
        assert!(filled.contains(2, 2));
    }

    #[test]
    fn test_repair_leaves_wide_holes_alone() {
        let mut grid = grid_of(&ring());
        grid.repair_holes();
        assert_eq!(grid.into_buckets().cell_count(), 16);
    }
}
