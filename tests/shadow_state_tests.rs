//! Shadow Lifecycle Tests
//!
//! Tests for:
//! - Reallocation predicate truth table
//! - One allocation per distinct resolution (repeated requests are free)
//! - Reallocation on resolution change
//! - Lightless frames rendering nothing and retaining published state
//! - Matrix refit when a light is present

use glam::{Mat4, Vec3};

use umbra::graph::light_fit::fit_directional;
use umbra::graph::passes::shadow::{needs_realloc, ShadowPlan, ShadowState};
use umbra::scene::Aabb;

fn unit_bounds() -> Aabb {
    Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
}

// ============================================================================
// Reallocation Predicate Tests
// ============================================================================

#[test]
fn no_live_target_needs_alloc() {
    assert!(needs_realloc(None, 512), "first request must allocate");
}

#[test]
fn matching_target_is_reused() {
    assert!(
        !needs_realloc(Some(512), 512),
        "a live target at the requested resolution must be reused"
    );
}

#[test]
fn mismatched_target_is_replaced() {
    assert!(needs_realloc(Some(512), 1024));
    assert!(needs_realloc(Some(1024), 512));
}

// ============================================================================
// Lifecycle Sequence Tests
// ============================================================================

#[test]
fn first_lit_frame_allocates_and_renders() {
    let mut state = ShadowState::new();
    let plan = state.advance(Some(Vec3::NEG_Y), &unit_bounds(), 1024);

    assert_eq!(
        plan,
        ShadowPlan {
            allocate: Some(1024),
            render: true,
        }
    );
    assert_eq!(state.resolution, Some(1024));
}

#[test]
fn repeated_resolution_allocates_exactly_once() {
    let mut state = ShadowState::new();
    let bounds = unit_bounds();

    let mut allocations = 0;
    for _ in 0..4 {
        let plan = state.advance(Some(Vec3::NEG_Y), &bounds, 512);
        assert!(plan.render, "every lit frame renders");
        if plan.allocate.is_some() {
            allocations += 1;
        }
    }

    assert_eq!(
        allocations, 1,
        "four frames at one resolution must allocate once, got {allocations}"
    );
}

#[test]
fn resolution_change_reallocates() {
    let mut state = ShadowState::new();
    let bounds = unit_bounds();

    assert_eq!(
        state.advance(Some(Vec3::NEG_Y), &bounds, 512).allocate,
        Some(512)
    );
    assert_eq!(
        state.advance(Some(Vec3::NEG_Y), &bounds, 1024).allocate,
        Some(1024),
        "growing the resolution must replace the target"
    );
    assert_eq!(
        state.advance(Some(Vec3::NEG_Y), &bounds, 512).allocate,
        Some(512),
        "returning to a previous resolution still replaces; only one target is ever live"
    );
}

// ============================================================================
// Lightless Frame Tests
// ============================================================================

#[test]
fn lightless_frame_is_a_no_op() {
    let mut state = ShadowState::new();
    let plan = state.advance(None, &unit_bounds(), 1024);

    assert_eq!(
        plan,
        ShadowPlan {
            allocate: None,
            render: false,
        }
    );
    assert_eq!(state.resolution, None, "no allocation without a light");
    assert_eq!(state.matrix, Mat4::IDENTITY, "matrix untouched");
}

#[test]
fn lightless_frames_retain_matrix_bit_identical() {
    let mut state = ShadowState::new();
    let bounds = unit_bounds();

    state.advance(Some(Vec3::new(-1.0, -1.0, 0.0)), &bounds, 1024);
    let published = state.matrix.to_cols_array();

    for frame in 0..5 {
        let plan = state.advance(None, &bounds, 1024);
        assert!(!plan.render, "lightless frame {frame} must not render");
        assert_eq!(
            state.matrix.to_cols_array(),
            published,
            "matrix must survive lightless frame {frame} bit-identical"
        );
    }
    assert_eq!(
        state.resolution,
        Some(1024),
        "the live target survives lightless frames"
    );
}

#[test]
fn light_return_refits_without_realloc() {
    let mut state = ShadowState::new();

    state.advance(Some(Vec3::NEG_Y), &unit_bounds(), 1024);
    let before = state.matrix.to_cols_array();
    state.advance(None, &unit_bounds(), 1024);

    let wider = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(40.0, 1.0, 1.0));
    let plan = state.advance(Some(Vec3::NEG_Y), &wider, 1024);

    assert!(plan.render);
    assert_eq!(plan.allocate, None, "same resolution, no realloc");
    assert_ne!(
        state.matrix.to_cols_array(),
        before,
        "wider bounds must refit the light frustum"
    );
}

#[test]
fn advance_publishes_the_pure_fit() {
    let mut state = ShadowState::new();
    let bounds = Aabb::from_center_half_extents(Vec3::new(3.0, 0.0, -2.0), Vec3::splat(4.0));
    let direction = Vec3::new(0.3, -1.0, 0.2);

    state.advance(Some(direction), &bounds, 1024);

    assert_eq!(
        state.matrix.to_cols_array(),
        fit_directional(&bounds, direction).matrix().to_cols_array(),
        "the published matrix is exactly the ortho fit for the frame inputs"
    );
}
