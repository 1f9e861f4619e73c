use std::collections::VecDeque;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::grid::{Grid, GridLocation, neighbors4};

/// `true` marks a flooded cell. Same shape as the elevation grid it came from.
pub type FloodMap = Grid<bool>;

/// Multi-source BFS over cells at or below `water_height`.
///
/// A source above the water produces nothing. Every source must lie inside
/// `heights`; the first that does not fails the whole call.
/// The flood map doubles as the visited set, so each cell is queued at most once.
pub fn compute_flood(
    heights: &Grid<f64>,
    sources: &[GridLocation],
    water_height: f64,
) -> Result<FloodMap> {
    let (rows, cols) = (heights.rows, heights.cols);

    if let Some(&bad) = sources.iter().find(|s| !heights.contains(**s)) {
        return Err(Error::SourceOutOfBounds {
            source_loc: bad,
            rows,
            cols,
        });
    }

    let mut flooded: FloodMap = Grid::new(rows, cols);
    let mut queue = VecDeque::new();

    for &src in sources {
        let i = heights.idx(src.row as usize, src.col as usize);
        if heights.data[i] <= water_height && !flooded.data[i] {
            flooded.data[i] = true;
            queue.push_back(src);
        }
    }

    while let Some(cur) = queue.pop_front() {
        for n in neighbors4(cur, rows, cols) {
            let i = heights.idx(n.row as usize, n.col as usize);
            if heights.data[i] <= water_height && !flooded.data[i] {
                flooded.data[i] = true;
                queue.push_back(n);
            }
        }
    }

    log::debug!(
        "flood at {water_height}: {} of {} cells",
        flooded_count(&flooded),
        rows * cols
    );
    Ok(flooded)
}

/// Flood the same terrain at several water heights in parallel.
/// Output order follows `water_heights`.
pub fn compute_flood_levels(
    heights: &Grid<f64>,
    sources: &[GridLocation],
    water_heights: &[f64],
) -> Result<Vec<FloodMap>> {
    water_heights
        .par_iter()
        .map(|&h| compute_flood(heights, sources, h))
        .collect()
}

pub fn flooded_count(map: &FloodMap) -> usize {
    map.data.iter().filter(|&&f| f).count()
}

/// Row-major bitmask, 8 cells per byte, least significant bit first.
pub fn pack_bits(map: &FloodMap) -> Vec<u8> {
    let mut out = vec![0u8; map.data.len().div_ceil(8)];
    for (i, _) in map.data.iter().enumerate().filter(|(_, f)| **f) {
        out[i / 8] |= 1 << (i % 8);
    }
    out
}
