//! Lighting Parameter Resolution Tests
//!
//! Tests for:
//! - Default resolution with no override source (scenario: plain material)
//! - Partial overrides falling back per field
//! - Full override sets
//! - Capability-gated override selection on materials
//! - Shadow casting policy per queue/capability

use glam::Vec4;

use umbra::graph::resolve::LightingParameters;
use umbra::scene::material::{LightingOverrides, Material, MaterialCaps, RenderQueue};
use umbra::settings::LightingDefaults;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn no_overrides_resolves_to_defaults() {
    let resolved = LightingParameters::resolve(None, &LightingDefaults::default());

    assert!(
        approx(resolved.shadow_strength, 0.9),
        "default shadow_strength should be 0.9, got {}",
        resolved.shadow_strength
    );
    assert!(
        approx(resolved.shadow_bias, 0.005),
        "default shadow_bias should be 0.005, got {}",
        resolved.shadow_bias
    );
    assert_eq!(
        resolved.shadow_map_size, 1024,
        "default shadow_map_size should be 1024"
    );
    assert!(
        approx(resolved.ibl_intensity, 1.0),
        "default ibl_intensity should be 1.0, got {}",
        resolved.ibl_intensity
    );
    assert!(
        approx(resolved.anisotropy, 0.0),
        "default anisotropy should be 0.0, got {}",
        resolved.anisotropy
    );
}

#[test]
fn empty_override_block_resolves_to_defaults() {
    let overrides = LightingOverrides::default();
    let resolved = LightingParameters::resolve(Some(&overrides), &LightingDefaults::default());
    let baseline = LightingParameters::resolve(None, &LightingDefaults::default());
    assert_eq!(
        resolved, baseline,
        "an all-None override block must resolve exactly like no block"
    );
}

#[test]
fn partial_override_keeps_other_defaults() {
    let overrides = LightingOverrides {
        shadow_map_size: Some(512),
        anisotropy: Some(0.8),
        ..LightingOverrides::default()
    };
    let resolved = LightingParameters::resolve(Some(&overrides), &LightingDefaults::default());

    assert_eq!(resolved.shadow_map_size, 512, "overridden size must win");
    assert!(
        approx(resolved.anisotropy, 0.8),
        "overridden anisotropy must win, got {}",
        resolved.anisotropy
    );
    assert!(
        approx(resolved.shadow_strength, 0.9),
        "untouched fields must keep defaults, got {}",
        resolved.shadow_strength
    );
}

#[test]
fn full_override_ignores_defaults() {
    let overrides = LightingOverrides {
        shadow_strength: Some(0.25),
        shadow_bias: Some(0.01),
        shadow_map_size: Some(2048),
        ibl_intensity: Some(3.0),
        anisotropy: Some(1.0),
    };
    let defaults = LightingDefaults {
        shadow_strength: 0.0,
        shadow_bias: 0.0,
        shadow_map_size: 1,
        ibl_intensity: 0.0,
        anisotropy: 0.0,
    };
    let resolved = LightingParameters::resolve(Some(&overrides), &defaults);

    assert!(approx(resolved.shadow_strength, 0.25));
    assert!(approx(resolved.shadow_bias, 0.01));
    assert_eq!(resolved.shadow_map_size, 2048);
    assert!(approx(resolved.ibl_intensity, 3.0));
    assert!(approx(resolved.anisotropy, 1.0));
}

// ============================================================================
// Capability Selection Tests
// ============================================================================

#[test]
fn plain_material_is_no_override_source() {
    let material = Material::opaque(Vec4::ONE);
    assert!(
        material.lighting_overrides().is_none(),
        "a material without the capability must not offer overrides"
    );
}

#[test]
fn capable_material_offers_its_block() {
    let material = Material {
        caps: MaterialCaps::LIGHTING_OVERRIDES | MaterialCaps::CASTS_SHADOWS,
        lighting: LightingOverrides {
            shadow_map_size: Some(256),
            ..LightingOverrides::default()
        },
        ..Material::default()
    };

    let block = material
        .lighting_overrides()
        .expect("capable material must offer its block");
    assert_eq!(block.shadow_map_size, Some(256));
}

#[test]
fn capability_flag_alone_decides() {
    // Same data, no flag: the block is ignored.
    let material = Material {
        caps: MaterialCaps::CASTS_SHADOWS,
        lighting: LightingOverrides {
            shadow_map_size: Some(256),
            ..LightingOverrides::default()
        },
        ..Material::default()
    };
    assert!(
        material.lighting_overrides().is_none(),
        "override data without the capability flag must be ignored"
    );
}

// ============================================================================
// Shadow Casting Policy Tests
// ============================================================================

#[test]
fn opaque_default_casts_shadows() {
    let material = Material::opaque(Vec4::ONE);
    assert!(material.casts_shadows(), "default opaque material casts");
}

#[test]
fn transparent_never_casts() {
    let material = Material::transparent(Vec4::new(1.0, 1.0, 1.0, 0.5));
    assert_eq!(material.queue, RenderQueue::Transparent);
    assert!(
        !material.casts_shadows(),
        "transparent materials must not cast shadows"
    );
}

#[test]
fn opaque_without_cast_flag_does_not_cast() {
    let material = Material {
        caps: MaterialCaps::empty(),
        ..Material::opaque(Vec4::ONE)
    };
    assert!(
        !material.casts_shadows(),
        "clearing the cast capability must exclude the material"
    );
}
