use road_mesher::geom::{Point3, Vec2, generate_road_mesh};
use road_mesher::model::{CrossSection, Module, Path, Pattern, Rgba, TextureResolution};
use road_mesher::{RoadError, generate_road, generate_segment};

fn highway() -> CrossSection {
    let mut section = CrossSection::new(
        6.0,
        vec![
            Module::new("sidewalk_l", 2.0, 0.25, Rgba::GRAY),
            Module::new("lane_l", 3.5, 0.0, Rgba::rgb(0.15, 0.15, 0.15)),
        ],
    );
    section.mirror_modules();
    section.with_patterns(
        TextureResolution::new(128, 64),
        vec![
            Pattern::fill(
                "centre_line",
                Vec2::new(0.02, 0.5),
                Vec2::ONE,
                Vec2::new(0.5, 0.5),
                Rgba::WHITE,
            ),
            Pattern::fill(
                "edge_line",
                Vec2::new(0.02, 1.0),
                Vec2::ONE,
                Vec2::new(0.3, 0.5),
                Rgba::rgb(1.0, 0.9, 0.0),
            )
            .with_symmetry(true, false),
        ],
    )
}

fn oval() -> Path {
    Path::from_points(
        0.5,
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(60.0, 0.0, 0.0),
            Point3::new(80.0, 5.0, 30.0),
            Point3::new(60.0, 0.0, 60.0),
            Point3::new(0.0, 0.0, 60.0),
            Point3::new(-20.0, -5.0, 30.0),
        ],
    )
}

#[test]
fn mirrored_section_is_symmetric() {
    let section = highway();
    let names: Vec<&str> = section.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["sidewalk_l", "lane_l", "lane_r", "sidewalk_r"]);
    assert!((section.total_width() - 11.0).abs() < 1e-12);
    assert!(section.validate().is_ok());
}

#[test]
fn segment_bundle_has_mesh_and_texture() {
    let output = generate_segment(&highway()).expect("segment");
    assert!(output.mesh.validate().is_ok());
    assert_eq!(output.texture.width, 128);
    assert_eq!(output.texture.height, 64);
    assert_eq!(output.texture.to_rgba8().len(), 128 * 64 * 4);
    assert_eq!(output.diagnostics.profile_count, 2);
}

#[test]
fn road_bundle_is_consistent() {
    let section = highway();
    let path = oval();
    let output = generate_road(&path, &section).expect("road");

    let per_profile = 2 * (2 * section.modules.len() + 2) - 2;
    assert_eq!(output.mesh.vertex_count(), path.sample_count() * per_profile);
    assert_eq!(output.diagnostics.vertex_count, output.mesh.vertex_count());
    assert!(output.mesh.validate().is_ok());
    assert!(output.mesh.uvs.iter().all(|uv| (0.0..=1.0).contains(&uv[0])));
}

#[test]
fn editing_path_changes_mesh() {
    let section = highway();
    let mut path = oval();
    let (before, _) = generate_road_mesh(&path, &section).expect("road");
    path.move_anchor(2, Point3::new(100.0, 5.0, 30.0));
    let (after, _) = generate_road_mesh(&path, &section).expect("road");
    assert_ne!(before.positions, after.positions);
}

#[test]
fn bad_texture_is_reported() {
    let mut section = highway();
    section.resolution = TextureResolution::new(0, 0);
    assert!(matches!(
        generate_segment(&section),
        Err(RoadError::Raster(_))
    ));
    section.modules.clear();
    assert!(matches!(generate_segment(&section), Err(RoadError::Mesh(_))));
}
