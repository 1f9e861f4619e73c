use std::path::PathBuf;

/// Defaults shared by the CLI and the server; each can be overridden per run.
#[derive(Clone, Debug)]
pub struct Params {
    /// Directory searched for `.terrain` files.
    pub terrain_dir: PathBuf,
    /// Water heights flooded when none are given.
    pub water_heights: Vec<f64>,
    /// Upper bound on levels per request, keeps server work bounded.
    pub max_levels: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            terrain_dir: PathBuf::from("terrains"),
            water_heights: vec![0.0],
            max_levels: 64,
        }
    }
}

impl Params {
    /// Parse a comma separated list like `0,1.5,3`.
    pub fn parse_heights(list: &str) -> Option<Vec<f64>> {
        list.split(',')
            .map(|s| s.trim().parse().ok())
            .collect()
    }
}
