#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod model;

use geom::{
    MeshError, PatternTexture, RasterError, RoadMesh, RoadMeshDiagnostics, generate_road_mesh,
    generate_segment_mesh, rasterize_patterns,
};
use model::{CrossSection, Path};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[derive(Debug, thiserror::Error)]
pub enum RoadError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Mesh, decal texture and diagnostics of one generation pass.
#[derive(Debug, Clone)]
pub struct RoadOutput {
    pub mesh: RoadMesh,
    pub texture: PatternTexture,
    pub diagnostics: RoadMeshDiagnostics,
}

/// Builds the two-profile preview of `cross_section` together with its texture.
pub fn generate_segment(cross_section: &CrossSection) -> Result<RoadOutput, RoadError> {
    let (mesh, diagnostics) = generate_segment_mesh(cross_section)?;
    let texture = rasterize_patterns(cross_section.resolution, &cross_section.patterns)?;
    Ok(RoadOutput {
        mesh,
        texture,
        diagnostics,
    })
}

/// Builds the closed road around `path` together with the texture of `cross_section`.
pub fn generate_road(path: &Path, cross_section: &CrossSection) -> Result<RoadOutput, RoadError> {
    let (mesh, diagnostics) = generate_road_mesh(path, cross_section)?;
    let texture = rasterize_patterns(cross_section.resolution, &cross_section.patterns)?;
    Ok(RoadOutput {
        mesh,
        texture,
        diagnostics,
    })
}

#[derive(Debug, Serialize)]
struct MeshExport<'a> {
    #[serde(flatten)]
    mesh: &'a RoadMesh,
    summary: String,
    warnings: &'a [String],
}

fn export_mesh(mesh: &RoadMesh, diagnostics: &RoadMeshDiagnostics) -> Result<JsValue, JsValue> {
    let export = MeshExport {
        mesh,
        summary: diagnostics.summary(),
        warnings: &diagnostics.warnings,
    };
    serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
}

fn js_error(err: &impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

/// Segment preview mesh for a cross-section given as a JS object.
#[wasm_bindgen]
pub fn segment_mesh(section: JsValue) -> Result<JsValue, JsValue> {
    let section: CrossSection = serde_wasm_bindgen::from_value(section).map_err(|err| js_error(&err))?;
    let (mesh, diagnostics) = generate_segment_mesh(&section).map_err(|err| js_error(&err))?;
    export_mesh(&mesh, &diagnostics)
}

/// Closed road mesh. Cached samples in `path` are recomputed before meshing.
#[wasm_bindgen]
pub fn road_mesh(path: JsValue, section: JsValue) -> Result<JsValue, JsValue> {
    let mut path: Path = serde_wasm_bindgen::from_value(path).map_err(|err| js_error(&err))?;
    let section: CrossSection = serde_wasm_bindgen::from_value(section).map_err(|err| js_error(&err))?;
    path.refresh();
    let (mesh, diagnostics) = generate_road_mesh(&path, &section).map_err(|err| js_error(&err))?;
    export_mesh(&mesh, &diagnostics)
}

/// RGBA8 bytes of the cross-section's pattern texture, row-major.
#[wasm_bindgen]
pub fn pattern_texture(section: JsValue) -> Result<Vec<u8>, JsValue> {
    let section: CrossSection = serde_wasm_bindgen::from_value(section).map_err(|err| js_error(&err))?;
    let texture = rasterize_patterns(section.resolution, &section.patterns).map_err(|err| js_error(&err))?;
    Ok(texture.to_rgba8())
}
