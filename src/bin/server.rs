use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get, routing::post};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use risingtides::config::Params;
use risingtides::flood::pack_bits;
use risingtides::{Error, Grid, GridLocation, Level, Terrain, terrain};

#[derive(Deserialize)]
struct FloodRequest {
    /// Name of a terrain in the terrain directory.
    terrain: Option<String>,
    // Inline terrain, used when `terrain` is absent
    heights: Option<Vec<Vec<f64>>>,
    sources: Option<Vec<GridLocation>>,
    water_height: Option<f64>,
    water_heights: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct FloodResponse {
    rows: usize,
    cols: usize,
    levels: Vec<LevelEntry>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct LevelEntry {
    water_height: f64,
    flooded_cells: usize,
    /// Row-major bitmask, LSB first.
    mask: String,
}

impl From<&Level> for LevelEntry {
    fn from(l: &Level) -> Self {
        LevelEntry {
            water_height: l.water_height,
            flooded_cells: l.flooded_cells,
            mask: base64::engine::general_purpose::STANDARD.encode(pack_bits(&l.map)),
        }
    }
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Debug)]
enum ApiError {
    Flood(Error),
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Flood(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Flood(Error::Io { .. }) => StatusCode::NOT_FOUND,
            ApiError::Flood(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            ApiError::Flood(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
        };
        log::warn!("request failed: {msg}");
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

fn resolve_terrain(req: FloodRequest, params: &Params) -> Result<(Terrain, Vec<f64>), ApiError> {
    let water_heights = match (req.water_heights, req.water_height) {
        (Some(list), _) => list,
        (None, Some(h)) => vec![h],
        (None, None) => params.water_heights.clone(),
    };
    if water_heights.is_empty() || water_heights.len() > params.max_levels {
        return Err(ApiError::BadRequest(format!(
            "expected 1 to {} water heights, got {}",
            params.max_levels,
            water_heights.len()
        )));
    }

    let terrain = match (req.terrain, req.heights) {
        (Some(name), _) => {
            if name.contains(['/', '\\']) || name.starts_with('.') {
                return Err(ApiError::BadRequest(format!("invalid terrain name {name:?}")));
            }
            terrain::load_terrain(&params.terrain_dir, &name)?
        }
        (None, Some(rows)) => Terrain {
            heights: Grid::from_rows(rows)?,
            sources: req.sources.unwrap_or_default(),
        },
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either terrain or heights is required".into(),
            ));
        }
    };
    Ok((terrain, water_heights))
}

fn flood_response(req: FloodRequest, params: &Params) -> Result<FloodResponse, ApiError> {
    let (terrain, water_heights) = resolve_terrain(req, params)?;
    let (report, timings) = risingtides::run(&terrain, &water_heights)?;

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(FloodResponse {
        rows: report.rows,
        cols: report.cols,
        levels: report.levels.iter().map(LevelEntry::from).collect(),
        timings: timing_entries,
    })
}

async fn flood_handler(Json(req): Json<FloodRequest>) -> Result<Json<FloodResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || flood_response(req, &Params::default()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(response))
}

async fn terrains_handler() -> Result<Json<Vec<String>>, ApiError> {
    let dir = Params::default().terrain_dir;
    Ok(Json(terrain::available_terrains(&dir)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Router::new()
        .route("/api/flood", post(flood_handler))
        .route("/api/terrains", get(terrains_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("risingtides server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(heights: Vec<Vec<f64>>) -> FloodRequest {
        FloodRequest {
            terrain: None,
            heights: Some(heights),
            sources: Some(vec![GridLocation::new(0, 0)]),
            water_height: None,
            water_heights: None,
        }
    }

    #[test]
    fn test_inline_terrain_uses_default_level() {
        let (t, levels) = resolve_terrain(inline(vec![vec![0.0, 1.0]]), &Params::default()).unwrap();
        assert_eq!(levels, vec![0.0]);
        assert_eq!(t.sources, vec![GridLocation::new(0, 0)]);
    }

    #[test]
    fn test_ragged_inline_terrain_rejected() {
        let res = resolve_terrain(inline(vec![vec![0.0, 1.0], vec![2.0]]), &Params::default());
        assert!(matches!(res, Err(ApiError::Flood(Error::NotRectangular { .. }))));
    }

    #[test]
    fn test_path_like_terrain_name_rejected() {
        let mut req = inline(vec![vec![0.0]]);
        req.terrain = Some("../secret".into());
        assert!(matches!(
            resolve_terrain(req, &Params::default()),
            Err(ApiError::BadRequest(_))
        ));
    }

    fn unpack(mask: &str, cells: usize) -> Vec<bool> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(mask).unwrap();
        (0..cells).map(|i| bytes[i / 8] & (1 << (i % 8)) != 0).collect()
    }

    #[test]
    fn test_flood_response_mask_decodes_to_flood_map() {
        let mut req = inline(vec![
            vec![0.0, 0.0, 5.0],
            vec![0.0, 5.0, 5.0],
            vec![5.0, 5.0, 5.0],
        ]);
        req.water_heights = Some(vec![0.0, 5.0]);
        let resp = flood_response(req, &Params::default()).unwrap();

        assert_eq!((resp.rows, resp.cols), (3, 3));
        assert_eq!(resp.levels.len(), 2);
        assert_eq!(resp.levels[0].flooded_cells, 3);
        assert_eq!(
            unpack(&resp.levels[0].mask, 9),
            vec![true, true, false, true, false, false, false, false, false]
        );
        assert_eq!(resp.levels[1].water_height, 5.0);
        assert_eq!(unpack(&resp.levels[1].mask, 9), vec![true; 9]);
    }

    #[test]
    fn test_missing_terrain_is_not_found() {
        let params = Params {
            terrain_dir: std::env::temp_dir().join("risingtides-no-such-dir"),
            ..Params::default()
        };
        let mut req = inline(vec![vec![0.0]]);
        req.terrain = Some("atlantis".into());
        let err = flood_response(req, &params).err().unwrap();
        assert!(matches!(err, ApiError::Flood(Error::Io { .. })));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_out_of_bounds_inline_source_is_bad_request() {
        let mut req = inline(vec![vec![0.0, 1.0]]);
        req.sources = Some(vec![GridLocation::new(0, 2)]);
        let err = flood_response(req, &Params::default()).err().unwrap();
        assert!(matches!(err, ApiError::Flood(Error::SourceOutOfBounds { .. })));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_level_count_bounded() {
        let mut req = inline(vec![vec![0.0]]);
        req.water_heights = Some(vec![]);
        assert!(matches!(
            resolve_terrain(req, &Params::default()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
