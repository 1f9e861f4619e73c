pub mod config;
pub mod error;
pub mod flood;
pub mod grid;
pub mod terrain;

use std::time::Instant;

use serde::Serialize;

pub use error::{Error, Result};
pub use flood::{FloodMap, compute_flood, compute_flood_levels};
pub use grid::{Grid, GridLocation};
pub use terrain::Terrain;

/// One flooded water level.
#[derive(Serialize)]
pub struct Level {
    pub water_height: f64,
    pub flooded_cells: usize,
    pub map: FloodMap,
}

#[derive(Serialize)]
pub struct FloodReport {
    pub rows: usize,
    pub cols: usize,
    pub levels: Vec<Level>,
}

#[derive(Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Flood `terrain` at every height in `water_heights`.
pub fn run(terrain: &Terrain, water_heights: &[f64]) -> Result<(FloodReport, Vec<Timing>)> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    let t = Instant::now();
    let maps = compute_flood_levels(&terrain.heights, &terrain.sources, water_heights)?;
    timings.push(Timing {
        name: "flood",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let t = Instant::now();
    let levels: Vec<Level> = water_heights
        .iter()
        .zip(maps)
        .map(|(&water_height, map)| Level {
            water_height,
            flooded_cells: flood::flooded_count(&map),
            map,
        })
        .collect();
    timings.push(Timing {
        name: "count",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    let report = FloodReport {
        rows: terrain.heights.rows,
        cols: terrain.heights.cols,
        levels,
    };
    Ok((report, timings))
}
