//! Integration tests for cursor unprojection
//!
//! Round trips through the camera transforms and known camera setups.

use approx::assert_abs_diff_eq;
use pickbox_math::prelude::*;

fn camera_at(position: Vec3) -> PerspectiveCamera {
    PerspectiveCamera::new(position, Vec3::NEG_Z)
}

#[test]
fn test_near_point_reprojects_to_cursor_ndc() {
    let viewport = Viewport::new(800, 600).unwrap();
    let transforms = camera_at(Vec3::new(0.0, 10.0, 30.0))
        .transforms(viewport.aspect())
        .unwrap();
    let unprojector = Unprojector::new(viewport, &transforms).unwrap();

    for x in (1..800).step_by(97) {
        for y in (1..600).step_by(83) {
            let cursor = ScreenPoint::new(x, y);
            let pick = unprojector.unproject(cursor).unwrap().unwrap();

            let (ndc_x, ndc_y) = viewport.to_ndc(cursor);
            let ndc = transforms.world_to_ndc(pick.origin()).unwrap();

            assert_abs_diff_eq!(ndc.x, ndc_x, epsilon = 1e-3);
            assert_abs_diff_eq!(ndc.y, ndc_y, epsilon = 1e-3);
            assert_abs_diff_eq!(ndc.z, -1.0, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_points_along_the_ray_share_the_cursor_ndc() {
    let viewport = Viewport::new(1024, 768).unwrap();
    let transforms = camera_at(Vec3::new(3.0, -2.0, 12.0))
        .transforms(viewport.aspect())
        .unwrap();

    let cursor = ScreenPoint::new(700, 200);
    let pick = unproject(cursor, viewport, &transforms).unwrap().unwrap();
    let (ndc_x, ndc_y) = viewport.to_ndc(cursor);

    for t in [1.0, 5.0, 50.0] {
        let ndc = transforms.world_to_ndc(pick.ray.at(t)).unwrap();
        assert_abs_diff_eq!(ndc.x, ndc_x, epsilon = 1e-3);
        assert_abs_diff_eq!(ndc.y, ndc_y, epsilon = 1e-3);
    }
}

#[test]
fn test_center_ray_follows_camera_position() {
    let viewport = Viewport::new(640, 480).unwrap();

    for position in [Vec3::ZERO, Vec3::new(-7.0, 2.5, 40.0), Vec3::new(100.0, 0.0, -3.0)] {
        let transforms = camera_at(position).transforms(viewport.aspect()).unwrap();
        let pick = unproject(ScreenPoint::new(320, 240), viewport, &transforms)
            .unwrap()
            .unwrap();

        assert_abs_diff_eq!(pick.origin().x, position.x, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.origin().y, position.y, epsilon = 1e-3);
        assert_abs_diff_eq!(pick.direction().z, -1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_boundary_cursors_produce_no_ray() {
    let viewport = Viewport::new(800, 600).unwrap();
    let transforms = camera_at(Vec3::new(0.0, 10.0, 30.0))
        .transforms(viewport.aspect())
        .unwrap();

    assert_eq!(unproject(ScreenPoint::new(800, 0), viewport, &transforms), Ok(None));
    assert_eq!(unproject(ScreenPoint::new(0, -1), viewport, &transforms), Ok(None));
    assert_eq!(unproject(ScreenPoint::new(-5, 300), viewport, &transforms), Ok(None));
    assert!(unproject(ScreenPoint::new(799, 599), viewport, &transforms).unwrap().is_some());
}

#[test]
fn test_custom_pick_length() {
    let viewport = Viewport::new(800, 600).unwrap();
    let transforms = camera_at(Vec3::ZERO).transforms(viewport.aspect()).unwrap();
    let pick = Unprojector::new(viewport, &transforms)
        .unwrap()
        .with_max_length(25.0)
        .unproject(ScreenPoint::new(400, 300))
        .unwrap()
        .unwrap();

    assert_abs_diff_eq!(pick.length(), 25.0, epsilon = 1e-3);
    assert_abs_diff_eq!(pick.end.z, pick.origin().z - 25.0, epsilon = 1e-3);
}
