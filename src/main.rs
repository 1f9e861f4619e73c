use std::path::PathBuf;

use anyhow::Context;
use risingtides::config::Params;
use risingtides::terrain;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let defaults = Params::default();

    let terrain_dir: PathBuf = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or(defaults.terrain_dir);

    let Some(name) = args.get(1) else {
        println!("Available terrain files:");
        for chunk in terrain::available_terrains(&terrain_dir)?.chunks(5) {
            println!("{}", chunk.join(" "));
        }
        return Ok(());
    };

    let water_heights = match args.get(2) {
        Some(list) => Params::parse_heights(list)
            .with_context(|| format!("bad water height list {list:?}"))?,
        None => defaults.water_heights,
    };
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let terrain = terrain::load_terrain(&terrain_dir, name)?;
    log::info!(
        "Flooding {}x{} terrain {name:?} from {} sources at {} levels",
        terrain.heights.rows,
        terrain.heights.cols,
        terrain.sources.len(),
        water_heights.len()
    );

    let (report, timings) = risingtides::run(&terrain, &water_heights)?;

    for t in &timings {
        log::info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let total = report.rows * report.cols;
    for level in &report.levels {
        println!(
            "water {:>10.3}: {:>8} / {} cells flooded",
            level.water_height, level.flooded_cells, total
        );
    }

    let path = out_dir.join("flood.json");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), &report)?;
    log::info!("Saved {}", path.display());

    Ok(())
}
