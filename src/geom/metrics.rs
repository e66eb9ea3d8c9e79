//! Opt-in timing hooks for road generation.
//!
//! Timing is collected only when the `mesh_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to invoking the closure.
//!
//! ```ignore
//! use road_mesher::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let profiles = metrics.time(TimingBucket::Profiles, || build_profiles());
//! if let Some(report) = metrics.end() {
//!     println!("profiles: {} ns", report.profiles_ns);
//! }
//! ```

/// Phases of road mesh and texture generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Template construction and per-sample placement.
    Profiles,
    /// Vertex buffer assembly.
    Vertices,
    /// Index buffer assembly.
    Triangles,
    Colors,
    Uvs,
    /// Pattern texture rasterization.
    Raster,
}

/// Cumulative nanoseconds per [`TimingBucket`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub profiles_ns: u64,
    pub vertices_ns: u64,
    pub triangles_ns: u64,
    pub colors_ns: u64,
    pub uvs_ns: u64,
    pub raster_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.profiles_ns
            .saturating_add(self.vertices_ns)
            .saturating_add(self.triangles_ns)
            .saturating_add(self.colors_ns)
            .saturating_add(self.uvs_ns)
            .saturating_add(self.raster_ns)
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Profiles => &mut self.profiles_ns,
            TimingBucket::Vertices => &mut self.vertices_ns,
            TimingBucket::Triangles => &mut self.triangles_ns,
            TimingBucket::Colors => &mut self.colors_ns,
            TimingBucket::Uvs => &mut self.uvs_ns,
            TimingBucket::Raster => &mut self.raster_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating at `u64::MAX`.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing generation phases.
///
/// Call [`begin`](Self::begin) to reset, wrap phases with
/// [`time`](Self::time), and read the result with [`end`](Self::end).
#[derive(Debug, Default, Clone)]
pub struct GeomMetrics {
    #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` when metrics are compiled out.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, charging its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
