use crate::geom::{
    GeomContext, MeshError, Point3, Tolerance, build_template, generate_road_mesh,
    generate_road_mesh_with_context, generate_segment_mesh,
};
use crate::model::{CrossSection, Module, Path, Rgba};

const CURB: Rgba = Rgba::rgb(0.8, 0.8, 0.8);
const ASPHALT: Rgba = Rgba::rgb(0.2, 0.2, 0.2);

fn three_lane_section() -> CrossSection {
    CrossSection::new(
        8.0,
        vec![
            Module::new("curb_l", 1.0, 0.2, CURB),
            Module::new("road", 6.0, 0.0, ASPHALT),
            Module::new("curb_r", 1.0, 0.2, CURB),
        ],
    )
}

fn loop_path() -> Path {
    Path::from_points(
        1.0,
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(40.0, 0.0, 0.0),
            Point3::new(40.0, 0.0, 40.0),
            Point3::new(0.0, 0.0, 40.0),
        ],
    )
}

#[test]
fn segment_preview_counts() {
    let section = three_lane_section();
    let (mesh, diagnostics) = generate_segment_mesh(&section).unwrap();
    let m = build_template(&section).unwrap().len();
    assert_eq!(m, 8);

    let per_profile = 2 * m - 2;
    assert_eq!(mesh.vertex_count(), 2 * per_profile);
    assert_eq!(mesh.triangle_count(), (2 * m - 3) * 2);
    assert_eq!(mesh.triangle_count(), 26);
    assert_eq!(diagnostics.profile_count, 2);
    assert!(mesh.validate().is_ok());
}

#[test]
fn raised_median_preview_counts() {
    let section = CrossSection::new(
        4.0,
        vec![
            Module::new("shoulder_l", 1.0, 0.0, ASPHALT),
            Module::new("median", 2.0, 1.0, CURB),
            Module::new("shoulder_r", 1.0, 0.0, ASPHALT),
        ],
    );
    let template = build_template(&section).unwrap();
    let m = template.len();
    assert_eq!(template.points[0].x, -template.points[m - 1].x);

    let (mesh, diagnostics) = generate_segment_mesh(&section).unwrap();
    assert_eq!(diagnostics.profile_count, 2);
    assert_eq!(mesh.vertex_count(), 2 * (2 * m - 2));
    assert_eq!(mesh.triangle_count(), (2 * m - 3) * 2);
    assert_eq!(mesh.positions[2 * m - 2][2], 4.0);
    assert!(mesh.validate().is_ok());
}

#[test]
fn segment_preview_uvs_span_texture() {
    let section = three_lane_section();
    let (mesh, _) = generate_segment_mesh(&section).unwrap();
    let per_profile = mesh.vertex_count() / 2;

    assert_eq!(mesh.uvs[0], [0.0, 0.0]);
    assert_eq!(mesh.uvs[per_profile - 1], [1.0, 0.0]);
    assert!((mesh.uvs[per_profile][1] - 1.0).abs() < 1e-12);
    assert!(mesh.uvs.iter().all(|uv| (0.0..=1.0).contains(&uv[0])));
    // U never decreases across a profile
    assert!(mesh.uvs[..per_profile].windows(2).all(|w| w[1][0] >= w[0][0]));
}

#[test]
fn segment_preview_colors_follow_modules() {
    let section = three_lane_section();
    let (mesh, _) = generate_segment_mesh(&section).unwrap();
    // edges: riser, curb top, riser down, road top, riser up, curb top, riser
    let expected = [CURB, CURB, CURB, ASPHALT, CURB, CURB, CURB];
    for (e, color) in expected.iter().enumerate() {
        assert_eq!(mesh.colors[2 * e], *color);
        assert_eq!(mesh.colors[2 * e + 1], *color);
    }
}

#[test]
fn duplicated_vertices_share_positions() {
    let section = three_lane_section();
    let (mesh, _) = generate_segment_mesh(&section).unwrap();
    let per_profile = mesh.vertex_count() / 2;
    for e in 0..per_profile / 2 - 1 {
        assert_eq!(mesh.positions[2 * e + 1], mesh.positions[2 * e + 2]);
    }
}

#[test]
fn closed_road_counts() {
    let section = three_lane_section();
    let path = loop_path();
    let (mesh, diagnostics) = generate_road_mesh(&path, &section).unwrap();

    let m = build_template(&section).unwrap().len();
    let samples = path.sample_count();
    assert_eq!(diagnostics.sample_count, samples);
    assert_eq!(mesh.vertex_count(), samples * (2 * m - 2));
    assert_eq!(mesh.triangle_count(), samples * (2 * m - 3) * 2);
    assert_eq!(mesh.colors.len(), mesh.vertex_count());
    assert_eq!(mesh.uvs.len(), mesh.vertex_count());
    assert!(mesh.validate().is_ok());
    assert_eq!(diagnostics.fallback_orientation_count, 0);
}

#[test]
fn two_sample_road_still_closes() {
    let section = CrossSection::new(4.0, vec![Module::new("road", 3.0, 0.0, ASPHALT)]);
    let path = Path::from_points(1.0, [Point3::ORIGIN, Point3::new(0.5, 0.0, 0.0)]);
    assert_eq!(path.sample_count(), 2);

    let (mesh, diagnostics) = generate_road_mesh(&path, &section).unwrap();
    let m = build_template(&section).unwrap().len();
    assert_eq!(diagnostics.sample_count, 2);
    assert_eq!(mesh.vertex_count(), 2 * (2 * m - 2));
    assert_eq!(mesh.triangle_count(), 2 * (2 * m - 3) * 2);
    assert!(mesh.validate().is_ok());
}

#[test]
fn road_v_grows_along_path() {
    let section = three_lane_section();
    let (mesh, _) = generate_road_mesh(&loop_path(), &section).unwrap();
    let per_profile = 2 * build_template(&section).unwrap().len() - 2;
    let vs: Vec<f64> = mesh.uvs.iter().step_by(per_profile).map(|uv| uv[1]).collect();
    assert_eq!(vs[0], 0.0);
    assert!(vs.windows(2).all(|w| w[1] >= w[0]));
    assert!(vs[vs.len() - 1] > 1.0);
}

#[test]
fn context_carries_tolerance() {
    let mut ctx = GeomContext {
        tolerance: Tolerance::LOOSE,
        ..GeomContext::default()
    };
    let (mesh, diagnostics) =
        generate_road_mesh_with_context(&loop_path(), &three_lane_section(), &mut ctx).unwrap();
    assert_eq!(diagnostics.vertex_count, mesh.vertex_count());
    assert_eq!(diagnostics.triangle_count, mesh.triangle_count());
}

#[test]
fn invalid_inputs_fail_fast() {
    assert_eq!(
        generate_segment_mesh(&CrossSection::default()).unwrap_err(),
        MeshError::NoModules
    );
    let mut section = three_lane_section();
    section.length = f64::NAN;
    assert!(matches!(
        generate_segment_mesh(&section),
        Err(MeshError::InvalidLength(_))
    ));
    assert_eq!(
        generate_road_mesh(&Path::default(), &three_lane_section()).unwrap_err(),
        MeshError::TooFewAnchors { count: 0 }
    );
}
