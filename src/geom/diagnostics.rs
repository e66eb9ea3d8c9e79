//! Diagnostics returned alongside every generated road mesh.
//!
//! ```ignore
//! let (mesh, diagnostics) = generate_road_mesh(&path, &section)?;
//! log::debug!("road mesh: {}", diagnostics.summary());
//! if !diagnostics.is_clean() {
//!     for warning in &diagnostics.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//! }
//! ```

use std::fmt;

use super::metrics::GeomTimingReport;

/// Counts and warnings collected while sweeping a cross-section along a path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RoadMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    /// Number of profiles placed (one per path sample, two for a segment preview).
    pub profile_count: usize,

    /// Number of path samples the mesh was built from. Zero for a segment preview.
    pub sample_count: usize,

    /// Profiles whose aim direction was degenerate (coincident samples) and
    /// that reused the previous profile's rotation instead.
    pub fallback_orientation_count: usize,

    /// Zero-area triangles in the index buffer.
    ///
    /// Riser columns of zero-height steps and the seams between duplicated
    /// vertices always produce some; they are kept so the index layout stays
    /// regular.
    pub degenerate_triangle_count: usize,

    /// Only populated with the `mesh_metrics` feature on non-WASM targets.
    pub timing: Option<GeomTimingReport>,

    pub warnings: Vec<String>,
}

impl RoadMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no orientation fallback was needed and nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fallback_orientation_count == 0 && self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short one-line form for logging: `"V:{vertices} T:{triangles} P:{profiles} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} P:{}",
            self.vertex_count, self.triangle_count, self.profile_count
        )];
        if self.sample_count > 0 {
            parts.push(format!("samples:{}", self.sample_count));
        }
        if self.fallback_orientation_count > 0 {
            parts.push(format!("fallback:{}", self.fallback_orientation_count));
        }
        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        parts.join(" ")
    }
}

impl fmt::Display for RoadMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Road Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Profiles: {}", self.profile_count)?;
        if self.sample_count > 0 {
            writeln!(f, "  Path samples: {}", self.sample_count)?;
        }
        if self.fallback_orientation_count > 0 {
            writeln!(
                f,
                "  Fallback orientations: {}",
                self.fallback_orientation_count
            )?;
        }
        if self.degenerate_triangle_count > 0 {
            writeln!(f, "  Degenerate triangles: {}", self.degenerate_triangle_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ns() / 1_000_000)?;
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")
    }
}
