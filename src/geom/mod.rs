mod core;
mod curve;
mod diagnostics;
mod mesh;
mod metrics;
mod profile;
mod raster;

pub use core::{Point3, Tolerance, Transform, Vec2, Vec3};
pub use curve::{CubicBezier3, Curve3, approximate_cubic_length, cubic, quadratic};
pub use diagnostics::RoadMeshDiagnostics;
pub use mesh::{
    GeomContext, MeshError, RoadMesh, generate_road_mesh, generate_road_mesh_with_context,
    generate_segment_mesh, generate_segment_mesh_with_context, validate_cross_section,
};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use profile::{
    Profile, ProfileSequence, build_template, profile_rotation, road_profiles, transform_profile,
};
pub use raster::{
    FilterMode, PatternTexture, RasterError, WrapMode, rasterize_patterns,
    rasterize_patterns_with_context,
};

#[cfg(test)]
mod tests;
