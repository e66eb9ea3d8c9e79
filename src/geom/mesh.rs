use serde::Serialize;

use super::core::{Point3, Tolerance, Transform, Vec3};
use super::diagnostics::RoadMeshDiagnostics;
use super::metrics::{GeomMetrics, TimingBucket};
use super::profile::{Profile, build_template, road_profiles};
use crate::model::{CrossSection, Module, Path, Rgba};

/// Triangle mesh with per-vertex color and UV, as parallel buffers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RoadMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub colors: Vec<Rgba>,
    pub uvs: Vec<[f64; 2]>,
}

impl RoadMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position or UV contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p.iter().all(|c| c.is_finite()))
            || self.uvs.iter().any(|uv| !uv.iter().all(|c| c.is_finite()))
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.colors.len() == n && self.uvs.len() == n
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("cross-section has no modules")]
    NoModules,
    #[error("segment length must be positive and finite, got {0}")]
    InvalidLength(f64),
    #[error("module {index} width must be positive and finite, got {width}")]
    InvalidWidth { index: usize, width: f64 },
    #[error("module {index} height must be finite")]
    NonFiniteHeight { index: usize },
    #[error("road needs at least 2 anchors, got {count}")]
    TooFewAnchors { count: usize },
    #[error("mesh would need {count} vertices, more than a u32 index buffer can address")]
    TooManyVertices { count: usize },
}

/// Settings and instrumentation shared by the `_with_context` generators.
#[derive(Debug, Clone)]
pub struct GeomContext {
    pub tolerance: Tolerance,
    pub metrics: GeomMetrics,
}

impl GeomContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Tolerance::default_geom(),
            metrics: GeomMetrics::default(),
        }
    }
}

impl Default for GeomContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks the cross-section invariants mesh generation relies on.
pub fn validate_cross_section(cross_section: &CrossSection) -> Result<(), MeshError> {
    if cross_section.modules.is_empty() {
        return Err(MeshError::NoModules);
    }
    let length = cross_section.length;
    if !length.is_finite() || length <= 0.0 {
        return Err(MeshError::InvalidLength(length));
    }
    for (index, module) in cross_section.modules.iter().enumerate() {
        if !module.width.is_finite() || module.width <= 0.0 {
            return Err(MeshError::InvalidWidth {
                index,
                width: module.width,
            });
        }
        if !module.height.is_finite() {
            return Err(MeshError::NonFiniteHeight { index });
        }
    }
    Ok(())
}

/// Preview of one cross-section repeat: two profiles `length` apart along +Z.
pub fn generate_segment_mesh(
    cross_section: &CrossSection,
) -> Result<(RoadMesh, RoadMeshDiagnostics), MeshError> {
    let mut ctx = GeomContext::new();
    generate_segment_mesh_with_context(cross_section, &mut ctx)
}

pub fn generate_segment_mesh_with_context(
    cross_section: &CrossSection,
    ctx: &mut GeomContext,
) -> Result<(RoadMesh, RoadMeshDiagnostics), MeshError> {
    validate_cross_section(cross_section)?;
    ctx.metrics.begin();

    let (template, profiles) = ctx.metrics.time(TimingBucket::Profiles, || {
        let template = build_template(cross_section)?;
        let far = template.transformed(Transform::translate(Vec3::new(
            0.0,
            0.0,
            cross_section.length,
        )));
        Ok::<_, MeshError>((template.clone(), vec![template, far]))
    })?;

    let (mesh, mut diagnostics) = assemble(&template, &profiles, cross_section, false, ctx)?;
    diagnostics.timing = ctx.metrics.end();
    log::debug!("segment mesh: {}", diagnostics.summary());
    Ok((mesh, diagnostics))
}

/// Sweeps `cross_section` around the closed `path`, one profile per sample.
pub fn generate_road_mesh(
    path: &Path,
    cross_section: &CrossSection,
) -> Result<(RoadMesh, RoadMeshDiagnostics), MeshError> {
    let mut ctx = GeomContext::new();
    generate_road_mesh_with_context(path, cross_section, &mut ctx)
}

pub fn generate_road_mesh_with_context(
    path: &Path,
    cross_section: &CrossSection,
    ctx: &mut GeomContext,
) -> Result<(RoadMesh, RoadMeshDiagnostics), MeshError> {
    validate_cross_section(cross_section)?;
    if path.len() < 2 {
        return Err(MeshError::TooFewAnchors { count: path.len() });
    }
    ctx.metrics.begin();

    let tolerance = ctx.tolerance;
    let (template, sequence) = ctx.metrics.time(TimingBucket::Profiles, || {
        let template = build_template(cross_section)?;
        let sequence = road_profiles(&template, path, tolerance);
        Ok::<_, MeshError>((template, sequence))
    })?;

    let (mesh, mut diagnostics) = assemble(&template, &sequence.profiles, cross_section, true, ctx)?;
    diagnostics.sample_count = sequence.profiles.len();
    diagnostics.fallback_orientation_count = sequence.fallback_count;
    if sequence.fallback_count > 0 {
        diagnostics.add_warning(format!(
            "{} profiles reused the previous orientation (coincident samples)",
            sequence.fallback_count
        ));
    }
    diagnostics.timing = ctx.metrics.end();
    log::debug!("road mesh: {}", diagnostics.summary());
    Ok((mesh, diagnostics))
}

fn assemble(
    template: &Profile,
    profiles: &[Profile],
    cross_section: &CrossSection,
    closed: bool,
    ctx: &mut GeomContext,
) -> Result<(RoadMesh, RoadMeshDiagnostics), MeshError> {
    let per_profile = 2 * template.edge_count();
    let vertex_count = per_profile * profiles.len();
    if u32::try_from(vertex_count).is_err() {
        return Err(MeshError::TooManyVertices {
            count: vertex_count,
        });
    }

    let positions = ctx
        .metrics
        .time(TimingBucket::Vertices, || build_vertices(profiles));
    let indices = ctx.metrics.time(TimingBucket::Triangles, || {
        build_triangles(profiles.len(), per_profile, closed)
    });
    let colors = ctx.metrics.time(TimingBucket::Colors, || {
        build_colors(&cross_section.modules, profiles.len())
    });
    let uvs = ctx.metrics.time(TimingBucket::Uvs, || {
        build_uvs(template, profiles, cross_section.length)
    });

    let mesh = RoadMesh {
        positions,
        indices,
        colors,
        uvs,
    };
    let diagnostics = RoadMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        profile_count: profiles.len(),
        degenerate_triangle_count: count_degenerate_triangles(&mesh, ctx.tolerance),
        ..RoadMeshDiagnostics::default()
    };
    Ok((mesh, diagnostics))
}

/// One vertex pair per profile edge: vertices `2e` and `2e + 1` are the
/// endpoints of edge `e`, so interior points appear twice.
fn build_vertices(profiles: &[Profile]) -> Vec<[f64; 3]> {
    profiles
        .iter()
        .flat_map(|profile| {
            profile
                .points
                .windows(2)
                .flat_map(|edge| [edge[0].to_array(), edge[1].to_array()])
        })
        .collect()
}

/// Two triangles per column between consecutive profiles. A closed strip also
/// joins the last profile back to the first.
fn build_triangles(profile_count: usize, per_profile: usize, closed: bool) -> Vec<u32> {
    if profile_count < 2 || per_profile < 2 {
        return Vec::new();
    }
    let pairs = if closed { profile_count } else { profile_count - 1 };
    let columns = per_profile - 1;

    let mut indices = Vec::with_capacity(pairs * columns * 6);
    for i in 0..pairs {
        let row = (i * per_profile) as u32;
        let next_row = (((i + 1) % profile_count) * per_profile) as u32;
        for j in 0..columns as u32 {
            let (a, b, c, d) = (row + j, next_row + j, next_row + j + 1, row + j + 1);
            indices.extend_from_slice(&[a, b, c, c, d, a]);
        }
    }
    indices
}

/// Color of every template edge, left to right.
///
/// A top edge takes its module's color. A riser between two modules takes the
/// left module's color when the height drops, otherwise the right module's.
fn edge_colors(modules: &[Module]) -> Vec<Rgba> {
    let (Some(first), Some(last)) = (modules.first(), modules.last()) else {
        return Vec::new();
    };
    let mut colors = Vec::with_capacity(modules.len() * 2 + 1);
    colors.push(first.base_color);
    for (k, module) in modules.iter().enumerate() {
        if k > 0 {
            let left = &modules[k - 1];
            colors.push(if module.height < left.height {
                left.base_color
            } else {
                module.base_color
            });
        }
        colors.push(module.base_color);
    }
    colors.push(last.base_color);
    colors
}

fn build_colors(modules: &[Module], profile_count: usize) -> Vec<Rgba> {
    let per_edge = edge_colors(modules);
    let mut colors = Vec::with_capacity(per_edge.len() * 2 * profile_count);
    for _ in 0..profile_count {
        for &color in &per_edge {
            colors.push(color);
            colors.push(color);
        }
    }
    colors
}

/// Cumulative `|dx| + |dy|` at each template point.
fn template_arc(template: &Profile) -> Vec<f64> {
    let mut arc = Vec::with_capacity(template.len());
    let mut total = 0.0;
    arc.push(total);
    for edge in template.points.windows(2) {
        total += (edge[1].x - edge[0].x).abs() + (edge[1].y - edge[0].y).abs();
        arc.push(total);
    }
    arc
}

/// U runs across the road by arc length over the stair-step; V is the distance
/// travelled by the middle template point divided by the texture repeat length.
fn build_uvs(template: &Profile, profiles: &[Profile], length: f64) -> Vec<[f64; 2]> {
    let arc = template_arc(template);
    let total = arc.last().copied().unwrap_or(0.0);
    let u_of = |index: usize| if total > 0.0 { arc[index] / total } else { 0.0 };
    let mid = template.len() / 2;

    let mut uvs = Vec::with_capacity(profiles.len() * 2 * template.edge_count());
    let mut travelled = 0.0;
    let mut previous_mid: Option<Point3> = None;
    for profile in profiles {
        let Some(&current_mid) = profile.points.get(mid) else {
            continue;
        };
        if let Some(previous_mid) = previous_mid {
            travelled += previous_mid.distance_to(current_mid);
        }
        previous_mid = Some(current_mid);

        let v = travelled / length;
        for e in 0..template.edge_count() {
            uvs.push([u_of(e), v]);
            uvs.push([u_of(e + 1), v]);
        }
    }
    uvs
}

fn count_degenerate_triangles(mesh: &RoadMesh, tol: Tolerance) -> usize {
    mesh.indices
        .chunks_exact(3)
        .filter(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Point3::from(mesh.positions[i as usize]));
            b.sub_point(a).cross(c.sub_point(a)).length() <= tol.eps
        })
        .count()
}
