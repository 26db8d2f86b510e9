//! Bounding Box Tests
//!
//! Tests for:
//! - Empty-bounds sentinel behavior
//! - Union aggregation (containment over N boxes, N = 0 included)
//! - Containment predicate
//! - Matrix transform (translation, rotation conservativeness)
//! - Bounding sphere derivation

use glam::{Mat4, Vec3};

use umbra::scene::bounds::Aabb;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn unit_box_at(center: Vec3) -> Aabb {
    Aabb::from_center_half_extents(center, Vec3::splat(0.5))
}

// ============================================================================
// Empty Sentinel Tests
// ============================================================================

#[test]
fn empty_is_empty() {
    assert!(Aabb::EMPTY.is_empty(), "EMPTY sentinel must report empty");
    assert!(
        Aabb::default().is_empty(),
        "default bounds must be the empty sentinel"
    );
}

#[test]
fn union_with_empty_is_identity() {
    let real = unit_box_at(Vec3::new(3.0, 0.0, -2.0));
    let from_left = Aabb::EMPTY.union(&real);
    let from_right = real.union(&Aabb::EMPTY);
    assert_eq!(from_left, real, "EMPTY ∪ b must equal b");
    assert_eq!(from_right, real, "b ∪ EMPTY must equal b");
}

#[test]
fn zero_boxes_aggregate_to_empty() {
    let boxes: [Aabb; 0] = [];
    let total = boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));
    assert!(total.is_empty(), "aggregating zero boxes must stay empty");
}

// ============================================================================
// Union / Containment Tests
// ============================================================================

#[test]
fn union_contains_every_input() {
    let boxes = [
        unit_box_at(Vec3::ZERO),
        unit_box_at(Vec3::new(10.0, 0.0, 0.0)),
        unit_box_at(Vec3::new(-4.0, 7.0, 1.5)),
        Aabb::from_center_half_extents(Vec3::new(0.0, -3.0, 0.0), Vec3::new(2.0, 0.1, 8.0)),
    ];
    let total = boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));

    for (i, b) in boxes.iter().enumerate() {
        assert!(
            total.contains(b),
            "aggregate must contain input {i}: total={total:?} input={b:?}"
        );
    }
}

#[test]
fn contains_rejects_outlier() {
    let inner = unit_box_at(Vec3::ZERO);
    let outlier = unit_box_at(Vec3::new(5.0, 0.0, 0.0));
    assert!(
        !inner.contains(&outlier),
        "a unit box at the origin must not contain one at x=5"
    );
}

#[test]
fn every_box_contains_empty() {
    let b = unit_box_at(Vec3::ZERO);
    assert!(b.contains(&Aabb::EMPTY), "any box must contain EMPTY");
}

#[test]
fn from_min_max_normalizes_corners() {
    let b = Aabb::from_min_max(Vec3::new(1.0, -1.0, 2.0), Vec3::new(-1.0, 1.0, 0.0));
    assert_eq!(b.min, Vec3::new(-1.0, -1.0, 0.0));
    assert_eq!(b.max, Vec3::new(1.0, 1.0, 2.0));
}

// ============================================================================
// Transform Tests
// ============================================================================

#[test]
fn translation_moves_bounds() {
    let b = unit_box_at(Vec3::ZERO);
    let moved = b.transformed(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    assert!(
        approx(moved.center().x, 2.0),
        "translated center.x should be 2, got {}",
        moved.center().x
    );
    assert!(
        approx(moved.half_extents().x, 0.5),
        "translation must not change extents, got {}",
        moved.half_extents().x
    );
}

#[test]
fn rotation_produces_conservative_bounds() {
    let b = unit_box_at(Vec3::ZERO);
    let rotated = b.transformed(Mat4::from_rotation_y(45f32.to_radians()));
    // A unit cube rotated 45° around Y needs sqrt(2)/2 half extents in XZ.
    let expected = std::f32::consts::SQRT_2 / 2.0;
    assert!(
        approx(rotated.half_extents().x, expected),
        "rotated half extent should be {expected}, got {}",
        rotated.half_extents().x
    );
    assert!(
        rotated.contains(&b),
        "rotated bounds of a symmetric cube must still contain the original"
    );
}

#[test]
fn transforming_empty_stays_empty() {
    let moved = Aabb::EMPTY.transformed(Mat4::from_translation(Vec3::splat(100.0)));
    assert!(moved.is_empty(), "transforming EMPTY must stay empty");
}

// ============================================================================
// Bounding Sphere Tests
// ============================================================================

#[test]
fn bounding_sphere_of_unit_cube() {
    let (center, radius) = unit_box_at(Vec3::new(1.0, 2.0, 3.0)).bounding_sphere();
    assert_eq!(center, Vec3::new(1.0, 2.0, 3.0));
    // Half diagonal of a unit cube: sqrt(3 * 0.5^2)
    let expected = (3.0f32 * 0.25).sqrt();
    assert!(
        approx(radius, expected),
        "unit cube sphere radius should be {expected}, got {radius}"
    );
}

#[test]
fn bounding_sphere_of_empty_is_degenerate() {
    let (center, radius) = Aabb::EMPTY.bounding_sphere();
    assert_eq!(center, Vec3::ZERO, "empty sphere center must be the origin");
    assert_eq!(radius, 0.0, "empty sphere radius must be zero");
}
