//! Cross-section profiles: the stair-step template in the XY plane and its
//! placements along a path.
//!
//! The template is centred on X = 0 with heights on +Y and faces +Z. A placed
//! profile is the template rotated so +Z follows the local path direction,
//! then translated onto the sample.

use super::core::{Point3, Tolerance, Transform, Vec3};
use super::mesh::MeshError;
use crate::model::{CrossSection, Path};

/// An ordered polyline across the road, left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub points: Vec<Point3>,
}

impl Profile {
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of segments between consecutive points.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self::new(
            self.points
                .iter()
                .map(|&p| transform.apply_point(p))
                .collect(),
        )
    }
}

/// Profiles placed along a path, one per sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSequence {
    pub profiles: Vec<Profile>,
    /// Samples whose aim direction was degenerate and reused the previous rotation.
    pub fallback_count: usize,
}

/// Builds the stair-step template of `cross_section`.
///
/// Produces `(0,0)`, both top corners of every module, and `(W,0)`, then shifts
/// everything left by `W/2` so the road is centred.
pub fn build_template(cross_section: &CrossSection) -> Result<Profile, MeshError> {
    if cross_section.modules.is_empty() {
        return Err(MeshError::NoModules);
    }

    let mut points = Vec::with_capacity(cross_section.modules.len() * 2 + 2);
    points.push(Point3::ORIGIN);
    let mut x = 0.0;
    for module in &cross_section.modules {
        points.push(Point3::new(x, module.height, 0.0));
        x += module.width;
        points.push(Point3::new(x, module.height, 0.0));
    }
    points.push(Point3::new(x, 0.0, 0.0));

    let half = x / 2.0;
    for p in &mut points {
        p.x -= half;
    }
    Ok(Profile::new(points))
}

/// Rotation that turns the template's +Z toward the path direction at `anchor`.
///
/// The direction is `aim - anchor`, or `anchor - aim` when `reverse` is set
/// (used for the last sample, which looks back at its predecessor). Returns
/// `None` when the two points coincide within `tol`.
#[must_use]
pub fn profile_rotation(
    anchor: Point3,
    aim: Point3,
    reverse: bool,
    tol: Tolerance,
) -> Option<Transform> {
    let direction: Vec3 = if reverse {
        anchor.sub_point(aim)
    } else {
        aim.sub_point(anchor)
    };
    if !direction.is_finite() || direction.length_squared() <= tol.eps_squared() {
        return None;
    }
    Transform::from_to_rotation(Vec3::Z, direction, tol)
}

/// Rotates `template` about the origin and then moves it onto `anchor`.
#[must_use]
pub fn transform_profile(template: &Profile, anchor: Point3, rotation: Transform) -> Profile {
    let placement = Transform::translate(anchor.to_vec3()).compose(rotation);
    template.transformed(placement)
}

/// Places the template at every sample of `path`.
///
/// Sample `k` aims at sample `k + 1`; the final sample aims back at `N - 2`
/// with the direction reversed. Degenerate directions reuse the previous
/// rotation (identity for the first sample) and are counted.
#[must_use]
pub fn road_profiles(template: &Profile, path: &Path, tol: Tolerance) -> ProfileSequence {
    let samples: Vec<Point3> = path.samples().collect();
    placed_profiles(template, &samples, tol)
}

pub(crate) fn placed_profiles(
    template: &Profile,
    samples: &[Point3],
    tol: Tolerance,
) -> ProfileSequence {
    let count = samples.len();
    let mut sequence = ProfileSequence {
        profiles: Vec::with_capacity(count),
        fallback_count: 0,
    };
    let mut previous = Transform::identity();

    for (k, &sample) in samples.iter().enumerate() {
        let rotation = if k + 1 < count {
            profile_rotation(sample, samples[k + 1], false, tol)
        } else if count >= 2 {
            profile_rotation(sample, samples[count - 2], true, tol)
        } else {
            None
        };

        let rotation = match rotation {
            Some(rotation) => rotation,
            None => {
                sequence.fallback_count += 1;
                previous
            }
        };
        previous = rotation;
        sequence
            .profiles
            .push(transform_profile(template, sample, rotation));
    }

    if sequence.fallback_count > 0 {
        log::warn!(
            "road_profiles: {} of {} samples had no usable direction",
            sequence.fallback_count,
            count
        );
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Module, Rgba};

    fn section(modules: &[(f64, f64)]) -> CrossSection {
        CrossSection::new(
            4.0,
            modules
                .iter()
                .map(|&(w, h)| Module::new("m", w, h, Rgba::WHITE))
                .collect(),
        )
    }

    #[test]
    fn template_is_centred_stair_step() {
        let template = build_template(&section(&[(1.0, 0.2), (3.0, 0.0), (1.0, 0.2)])).unwrap();
        let xs: Vec<f64> = template.points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = template.points.iter().map(|p| p.y).collect();
        assert_eq!(xs, vec![-2.5, -2.5, -1.5, -1.5, 1.5, 1.5, 2.5, 2.5]);
        assert_eq!(ys, vec![0.0, 0.2, 0.2, 0.0, 0.0, 0.2, 0.2, 0.0]);
        assert!(template.points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn empty_section_is_rejected() {
        assert!(matches!(
            build_template(&CrossSection::default()),
            Err(MeshError::NoModules)
        ));
    }

    #[test]
    fn rotation_faces_aim() {
        let tol = Tolerance::default_geom();
        let rotation = profile_rotation(Point3::ORIGIN, Point3::new(5.0, 0.0, 0.0), false, tol).unwrap();
        let forward = rotation.apply_vec(Vec3::Z);
        assert!((forward - Vec3::X).length() < 1e-9);
        // horizontal travel keeps the profile upright
        assert!((rotation.apply_vec(Vec3::Y) - Vec3::Y).length() < 1e-9);
    }

    #[test]
    fn reversed_rotation_looks_away_from_aim() {
        let tol = Tolerance::default_geom();
        let rotation = profile_rotation(Point3::new(2.0, 0.0, 0.0), Point3::ORIGIN, true, tol).unwrap();
        assert!((rotation.apply_vec(Vec3::Z) - Vec3::X).length() < 1e-9);
    }

    #[test]
    fn coincident_points_have_no_rotation() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(profile_rotation(p, p, false, Tolerance::default_geom()).is_none());
    }

    #[test]
    fn transform_places_template_on_anchor() {
        let template = build_template(&section(&[(2.0, 0.0)])).unwrap();
        let anchor = Point3::new(3.0, 1.0, -2.0);
        let placed = transform_profile(&template, anchor, Transform::identity());
        assert_eq!(placed.points[0], Point3::new(2.0, 1.0, -2.0));
        assert_eq!(placed.points[3], Point3::new(4.0, 1.0, -2.0));
    }

    #[test]
    fn duplicate_samples_fall_back_to_previous_rotation() {
        let template = build_template(&section(&[(2.0, 0.0)])).unwrap();
        let samples = [
            Point3::ORIGIN,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let sequence = placed_profiles(&template, &samples, Tolerance::default_geom());
        assert_eq!(sequence.profiles.len(), 4);
        assert_eq!(sequence.fallback_count, 1);
        // the fallback profile keeps facing +X, so its width runs along Z
        let fallback = &sequence.profiles[1];
        assert!((fallback.points[0].x - 1.0).abs() < 1e-9);
        assert!((fallback.points[0].z.abs() - 1.0).abs() < 1e-9);
    }
}
