//! Light-Space Ortho Fit Tests
//!
//! Tests for:
//! - Footprint policy: max(extentX, extentZ, 10) * 1.2
//! - Depth range policy: [0.1, 2 * (range + 10)]
//! - Eye placement along the negated light direction
//! - Minimum footprint for empty and tiny scenes
//! - Degenerate light direction fallback
//! - Matrix construction (bounds center lands in the frustum)

use glam::{Vec3, Vec4};

use umbra::graph::light_fit::{fit_directional, FIT_MARGIN, MIN_FOOTPRINT, SHADOW_NEAR};
use umbra::scene::bounds::Aabb;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Footprint Policy Tests
// ============================================================================

#[test]
fn unit_scene_uses_minimum_footprint() {
    // One renderer with 1x1x1 bounds at the origin, light straight down:
    // the minimum footprint dominates and the range is 10 * 1.2 = 12.
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);

    assert!(
        approx(fit.half_extent, 12.0),
        "unit scene range should be 12, got {}",
        fit.half_extent
    );
}

#[test]
fn wide_scene_uses_xz_extent() {
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(50.0, 1.0, 20.0));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);

    assert!(
        approx(fit.half_extent, 50.0 * FIT_MARGIN),
        "range should track the larger XZ extent: expected {}, got {}",
        50.0 * FIT_MARGIN,
        fit.half_extent
    );
}

#[test]
fn tall_scene_ignores_y_extent() {
    // Height does not grow the footprint; only X and Z do.
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(1.0, 500.0, 1.0));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);

    assert!(
        approx(fit.half_extent, MIN_FOOTPRINT * FIT_MARGIN),
        "tall thin scene should clamp to the minimum footprint, got {}",
        fit.half_extent
    );
}

#[test]
fn empty_scene_fits_minimum_at_origin() {
    let fit = fit_directional(&Aabb::EMPTY, Vec3::NEG_Y);

    assert!(
        approx(fit.half_extent, 12.0),
        "empty scene range should be 12, got {}",
        fit.half_extent
    );
    assert_eq!(fit.target, Vec3::ZERO, "empty scene must center at origin");
}

// ============================================================================
// Depth Range / Eye Placement Tests
// ============================================================================

#[test]
fn depth_range_follows_offset() {
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);

    assert!(
        approx(fit.near, SHADOW_NEAR),
        "near plane should be {SHADOW_NEAR}, got {}",
        fit.near
    );
    assert!(
        approx(fit.far, 2.0 * (12.0 + 10.0)),
        "far plane should be 44, got {}",
        fit.far
    );
}

#[test]
fn eye_backs_off_along_light_direction() {
    let center = Vec3::new(5.0, 1.0, -3.0);
    let bounds = Aabb::from_center_half_extents(center, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);

    // range 12, offset 22: eye sits 22 units against the light direction.
    let expected = center + Vec3::Y * 22.0;
    assert!(
        fit.eye.distance(expected) < EPSILON,
        "eye should be {expected:?}, got {:?}",
        fit.eye
    );
    assert_eq!(fit.target, center);
}

#[test]
fn diagonal_light_direction_is_normalized() {
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::new(0.0, -10.0, 0.0));

    // A longer direction vector must not push the eye further away.
    assert!(
        approx(fit.eye.y, 22.0),
        "eye offset must use the normalized direction, got {}",
        fit.eye.y
    );
}

#[test]
fn zero_direction_falls_back_to_down() {
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::ZERO);

    assert!(
        fit.eye.y > 0.0,
        "degenerate direction should fall back to straight down (eye above), got {:?}",
        fit.eye
    );
}

// ============================================================================
// Matrix Construction Tests
// ============================================================================

#[test]
fn bounds_center_projects_into_frustum() {
    let center = Vec3::new(2.0, 0.5, -1.0);
    let bounds = Aabb::from_center_half_extents(center, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::new(-1.0, -1.0, 0.0));
    let matrix = fit.matrix();

    let clip = matrix * Vec4::new(center.x, center.y, center.z, 1.0);
    let ndc = clip / clip.w;
    assert!(
        ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0,
        "bounds center must land inside the XY frustum, got ({}, {})",
        ndc.x,
        ndc.y
    );
    assert!(
        ndc.z > 0.0 && ndc.z < 1.0,
        "bounds center depth must be inside (0, 1), got {}",
        ndc.z
    );
}

#[test]
fn straight_down_light_produces_finite_matrix() {
    // dir.y == -1 exercises the up-vector flip.
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let matrix = fit_directional(&bounds, Vec3::NEG_Y).matrix();

    assert!(
        matrix.is_finite(),
        "straight-down light must yield a finite matrix, got {matrix:?}"
    );
}

#[test]
fn frustum_edge_maps_to_clip_edge() {
    let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    let fit = fit_directional(&bounds, Vec3::NEG_Y);
    let matrix = fit.matrix();

    // With the up-flip to +X, light-space axes align with world X/Z; a point
    // at the footprint edge must project to |ndc| = 1 on one axis.
    let edge = matrix * Vec4::new(fit.half_extent, 0.0, 0.0, 1.0);
    let ndc = edge / edge.w;
    assert!(
        approx(ndc.x.abs().max(ndc.y.abs()), 1.0),
        "footprint edge should project onto the clip edge, got ({}, {})",
        ndc.x,
        ndc.y
    );
}
